//! API integration tests
//!
//! These run against a live server with its database migrated and two
//! seeded accounts: `librarian` (with the mark-returned capability) and
//! `reader` (without), both with password `password`.
//!
//! Run with: cargo test -- --ignored

use chrono::{Duration, Local};
use reqwest::Client;
use serde_json::{json, Value};

const BASE_URL: &str = "http://localhost:8080/api/v1";

/// Helper to log in and get a bearer token
async fn get_token(client: &Client, username: &str, password: &str) -> String {
    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({
            "username": username,
            "password": password
        }))
        .send()
        .await
        .expect("Failed to send login request");

    let body: Value = response
        .json()
        .await
        .expect("Failed to parse login response");
    body["token"]
        .as_str()
        .expect("No token in response")
        .to_string()
}

/// Helper to create a book, returning its id
async fn create_book(client: &Client, token: &str, title: &str) -> i64 {
    let response = client
        .post(format!("{}/books", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({
            "title": title,
            "summary": "A test entry",
            "isbn": "9780000000001"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.expect("Failed to parse response");
    body["id"].as_i64().expect("No book ID")
}

/// Helper to create a copy of a book, returning its UUID
async fn create_instance(client: &Client, token: &str, book_id: i64, body: Value) -> String {
    let response = client
        .post(format!("{}/books/{}/instances", BASE_URL, book_id))
        .header("Authorization", format!("Bearer {}", token))
        .json(&body)
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.expect("Failed to parse response");
    body["id"].as_str().expect("No instance ID").to_string()
}

#[tokio::test]
#[ignore]
async fn test_health_check() {
    let client = Client::new();

    let response = client
        .get(format!("{}/health", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
#[ignore]
async fn test_login() {
    let client = Client::new();

    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({
            "username": "librarian",
            "password": "password"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["token"].is_string());
    assert_eq!(body["token_type"], "Bearer");
    assert_eq!(body["user"]["can_mark_returned"], true);
}

#[tokio::test]
#[ignore]
async fn test_login_invalid_credentials() {
    let client = Client::new();

    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({
            "username": "librarian",
            "password": "wrong"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 401);
}

#[tokio::test]
#[ignore]
async fn test_home_visit_counter() {
    let client = Client::new();

    let response = client
        .get(format!("{}/", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());
    let cookie = response
        .headers()
        .get("set-cookie")
        .expect("No session cookie on first visit")
        .to_str()
        .unwrap()
        .split(';')
        .next()
        .unwrap()
        .to_string();

    let body: Value = response.json().await.expect("Failed to parse response");
    let first_visits = body["num_visits"].as_i64().expect("No visit counter");
    assert!(body["num_books"].is_number());
    assert!(body["num_instances"].is_number());
    assert!(body["num_instances_available"].is_number());
    assert!(body["num_authors"].is_number());

    // Same session again: the counter moves by one
    let response = client
        .get(format!("{}/", BASE_URL))
        .header("Cookie", &cookie)
        .send()
        .await
        .expect("Failed to send request");

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["num_visits"].as_i64().unwrap(), first_visits + 1);
}

#[tokio::test]
#[ignore]
async fn test_book_list_default_page_size() {
    let client = Client::new();

    let response = client
        .get(format!("{}/books", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["per_page"], 5);
    assert!(body["items"].as_array().unwrap().len() <= 5);
    assert!(body["total"].is_number());
}

#[tokio::test]
#[ignore]
async fn test_author_list_ordering() {
    let client = Client::new();
    let token = get_token(&client, "librarian", "password").await;

    for (first, last) in [("Wilhelm", "Zweig"), ("Anna", "Aalto")] {
        let response = client
            .post(format!("{}/authors", BASE_URL))
            .header("Authorization", format!("Bearer {}", token))
            .json(&json!({ "first_name": first, "last_name": last }))
            .send()
            .await
            .expect("Failed to send request");
        assert_eq!(response.status(), 201);
    }

    let response = client
        .get(format!("{}/authors?per_page=100", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    let body: Value = response.json().await.expect("Failed to parse response");
    let names: Vec<(String, String)> = body["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|a| {
            (
                a["last_name"].as_str().unwrap().to_string(),
                a["first_name"].as_str().unwrap().to_string(),
            )
        })
        .collect();

    let mut sorted = names.clone();
    sorted.sort();
    assert_eq!(names, sorted);
}

#[tokio::test]
#[ignore]
async fn test_renewal_window_boundaries() {
    // Client that does not follow the post-renewal redirect
    let client = Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap();
    let token = get_token(&client, "librarian", "password").await;

    let book_id = create_book(&client, &token, "Renewal Fixture").await;
    let instance_id = create_instance(
        &client,
        &token,
        book_id,
        json!({ "imprint": "Test Press, 2020", "status": "o" }),
    )
    .await;

    let today = Local::now().date_naive();
    let renew_url = format!("{}/book/{}/renew", BASE_URL, instance_id);

    // Yesterday is rejected
    let response = client
        .post(&renew_url)
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({ "renewal_date": (today - Duration::days(1)).to_string() }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 400);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["errors"][0]["code"], "renewal_in_past");

    // 29 days out is rejected
    let response = client
        .post(&renew_url)
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({ "renewal_date": (today + Duration::days(29)).to_string() }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 400);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["errors"][0]["code"], "renewal_too_far_ahead");

    // 28 days out is the last accepted date; redirects to the borrowed list
    let due = today + Duration::days(28);
    let response = client
        .post(&renew_url)
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({ "renewal_date": due.to_string() }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 303);

    // The due date stuck
    let response = client
        .get(format!("{}/books/{}/instances", BASE_URL, book_id))
        .send()
        .await
        .expect("Failed to send request");
    let body: Value = response.json().await.expect("Failed to parse response");
    let instance = body
        .as_array()
        .unwrap()
        .iter()
        .find(|i| i["id"] == instance_id.as_str())
        .expect("Instance missing from book");
    assert_eq!(instance["due_back"], due.to_string());
}

#[tokio::test]
#[ignore]
async fn test_renewal_form_prefill() {
    let client = Client::new();
    let token = get_token(&client, "librarian", "password").await;

    let book_id = create_book(&client, &token, "Prefill Fixture").await;
    let instance_id = create_instance(
        &client,
        &token,
        book_id,
        json!({ "imprint": "Test Press, 2020", "status": "o" }),
    )
    .await;

    let response = client
        .get(format!("{}/book/{}/renew", BASE_URL, instance_id))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());
    let body: Value = response.json().await.expect("Failed to parse response");
    let proposed = (Local::now().date_naive() + Duration::days(21)).to_string();
    assert_eq!(body["renewal_date"], proposed);
    assert_eq!(body["instance"]["id"], instance_id.as_str());
}

#[tokio::test]
#[ignore]
async fn test_renewal_requires_capability() {
    let client = Client::new();

    // Unauthenticated callers are rejected before seeing the form
    let response = client
        .get(format!(
            "{}/book/00000000-0000-0000-0000-000000000000/renew",
            BASE_URL
        ))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 401);

    // Authenticated callers without the capability are rejected too
    let token = get_token(&client, "reader", "password").await;
    let response = client
        .get(format!(
            "{}/book/00000000-0000-0000-0000-000000000000/renew",
            BASE_URL
        ))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 403);
}

#[tokio::test]
#[ignore]
async fn test_mybooks_shows_only_own_loans() {
    let client = Client::new();
    let librarian_token = get_token(&client, "librarian", "password").await;
    let reader_token = get_token(&client, "reader", "password").await;

    let response = client
        .get(format!("{}/auth/me", BASE_URL))
        .header("Authorization", format!("Bearer {}", reader_token))
        .send()
        .await
        .expect("Failed to send request");
    let body: Value = response.json().await.expect("Failed to parse response");
    let reader_id = body["id"].as_i64().expect("No user ID");

    let book_id = create_book(&client, &librarian_token, "Loan Fixture").await;
    let instance_id = create_instance(
        &client,
        &librarian_token,
        book_id,
        json!({ "imprint": "Test Press, 2020", "status": "o", "borrower_id": reader_id }),
    )
    .await;

    // The borrower sees the loan
    let response = client
        .get(format!("{}/mybooks?per_page=100", BASE_URL))
        .header("Authorization", format!("Bearer {}", reader_token))
        .send()
        .await
        .expect("Failed to send request");
    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["items"]
        .as_array()
        .unwrap()
        .iter()
        .any(|i| i["id"] == instance_id.as_str()));

    // Another user does not
    let response = client
        .get(format!("{}/mybooks?per_page=100", BASE_URL))
        .header("Authorization", format!("Bearer {}", librarian_token))
        .send()
        .await
        .expect("Failed to send request");
    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(!body["items"]
        .as_array()
        .unwrap()
        .iter()
        .any(|i| i["id"] == instance_id.as_str()));
}

#[tokio::test]
#[ignore]
async fn test_delete_author_keeps_books() {
    let client = Client::new();
    let token = get_token(&client, "librarian", "password").await;

    let response = client
        .post(format!("{}/authors", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({ "first_name": "Ephemeral", "last_name": "Author" }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.expect("Failed to parse response");
    let author_id = body["id"].as_i64().expect("No author ID");

    let response = client
        .post(format!("{}/books", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({
            "title": "Orphan Fixture",
            "summary": "A test entry",
            "isbn": "9780000000002",
            "author_id": author_id
        }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.expect("Failed to parse response");
    let book_id = body["id"].as_i64().expect("No book ID");

    let response = client
        .delete(format!("{}/authors/{}", BASE_URL, author_id))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 204);

    // The book survives with its author reference cleared
    let response = client
        .get(format!("{}/books/{}", BASE_URL, book_id))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());
    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["author_id"].is_null());
    assert!(body["author"].is_null());
}

#[tokio::test]
#[ignore]
async fn test_return_instance() {
    let client = Client::new();
    let token = get_token(&client, "librarian", "password").await;

    let book_id = create_book(&client, &token, "Return Fixture").await;
    let instance_id = create_instance(
        &client,
        &token,
        book_id,
        json!({ "imprint": "Test Press, 2020", "status": "o" }),
    )
    .await;

    let return_url = format!("{}/bookinstances/{}/return", BASE_URL, instance_id);

    let response = client
        .post(&return_url)
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "returned");
    assert_eq!(body["instance"]["status"], "a");
    assert!(body["instance"]["borrower_id"].is_null());
    assert!(body["instance"]["due_back"].is_null());

    // Returning a copy that is not on loan is a conflict
    let response = client
        .post(&return_url)
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 409);
}
