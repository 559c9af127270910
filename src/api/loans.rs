//! Loan endpoints: borrowed lists and the librarian renewal workflow

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    Json,
};
use chrono::{Local, NaiveDate};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    error::AppResult,
    models::{
        book_instance::{proposed_renewal_date, BookInstance, LoanDetails, RenewBookInstance},
        PageQuery,
    },
};

use super::{AuthenticatedUser, PaginatedResponse};

const LOANS_PER_PAGE: i64 = 10;

/// A field-level validation error on the renewal form
#[derive(Serialize, ToSchema)]
pub struct FormFieldError {
    /// Form field the error applies to
    pub field: String,
    /// Machine-readable error code
    pub code: String,
    /// Human-readable message
    pub message: String,
}

/// Renewal form state, returned by the GET step and re-presented with
/// errors when a submission is rejected
#[derive(Serialize, ToSchema)]
pub struct RenewalFormResponse {
    /// The copy being renewed
    pub instance: LoanDetails,
    /// Proposed (GET) or submitted (rejected POST) renewal date
    pub renewal_date: NaiveDate,
    /// Field errors; empty on the GET step
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<FormFieldError>,
}

/// Return response with the updated copy
#[derive(Serialize, ToSchema)]
pub struct ReturnResponse {
    /// Return status
    pub status: String,
    /// The copy, back on the shelf
    pub instance: BookInstance,
}

fn form_errors(errors: &validator::ValidationErrors) -> Vec<FormFieldError> {
    errors
        .field_errors()
        .iter()
        .flat_map(|(field, field_errors)| {
            field_errors.iter().map(move |e| FormFieldError {
                field: field.to_string(),
                code: e.code.to_string(),
                message: e
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| e.code.to_string()),
            })
        })
        .collect()
}

/// List the copies on loan to the authenticated user, due-soonest first
#[utoipa::path(
    get,
    path = "/mybooks",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(PageQuery),
    responses(
        (status = 200, description = "The caller's loans", body = PaginatedResponse<LoanDetails>),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn my_loans(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(query): Query<PageQuery>,
) -> AppResult<Json<PaginatedResponse<LoanDetails>>> {
    let (page, per_page) = query.resolve(LOANS_PER_PAGE);

    let (items, total) = state
        .services
        .circulation
        .loans_for_user(claims.user_id, page, per_page)
        .await?;

    Ok(Json(PaginatedResponse {
        items,
        total,
        page,
        per_page,
    }))
}

/// List all copies currently on loan, due-soonest first
#[utoipa::path(
    get,
    path = "/borrowed",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(PageQuery),
    responses(
        (status = 200, description = "All outstanding loans", body = PaginatedResponse<LoanDetails>),
        (status = 403, description = "Insufficient permissions")
    )
)]
pub async fn all_borrowed(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(query): Query<PageQuery>,
) -> AppResult<Json<PaginatedResponse<LoanDetails>>> {
    claims.require_mark_returned()?;

    let (page, per_page) = query.resolve(LOANS_PER_PAGE);

    let (items, total) = state
        .services
        .circulation
        .all_on_loan(page, per_page)
        .await?;

    Ok(Json(PaginatedResponse {
        items,
        total,
        page,
        per_page,
    }))
}

/// Renewal form for one copy, pre-filled with a date three weeks out
#[utoipa::path(
    get,
    path = "/book/{id}/renew",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Book instance ID")
    ),
    responses(
        (status = 200, description = "Renewal form state", body = RenewalFormResponse),
        (status = 403, description = "Insufficient permissions"),
        (status = 404, description = "Copy not found")
    )
)]
pub async fn renew_form(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<RenewalFormResponse>> {
    claims.require_mark_returned()?;

    let instance = state.services.circulation.loan_details(id).await?;

    Ok(Json(RenewalFormResponse {
        instance,
        renewal_date: proposed_renewal_date(Local::now().date_naive()),
        errors: Vec::new(),
    }))
}

/// Submit the renewal form. A valid date is written to the copy and the
/// caller is redirected to the all-borrowed list; an invalid one gets
/// the form back with field errors and nothing is written.
#[utoipa::path(
    post,
    path = "/book/{id}/renew",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Book instance ID")
    ),
    request_body = RenewBookInstance,
    responses(
        (status = 303, description = "Renewed; redirects to the all-borrowed list"),
        (status = 400, description = "Invalid renewal date", body = RenewalFormResponse),
        (status = 403, description = "Insufficient permissions"),
        (status = 404, description = "Copy not found")
    )
)]
pub async fn renew_submit(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(form): Json<RenewBookInstance>,
) -> AppResult<Response> {
    claims.require_mark_returned()?;

    let instance = state.services.circulation.loan_details(id).await?;

    if let Err(errors) = form.validate() {
        return Ok((
            StatusCode::BAD_REQUEST,
            Json(RenewalFormResponse {
                instance,
                renewal_date: form.renewal_date,
                errors: form_errors(&errors),
            }),
        )
            .into_response());
    }

    state
        .services
        .circulation
        .renew(id, form.renewal_date)
        .await?;

    Ok(Redirect::to("/api/v1/borrowed").into_response())
}

/// Mark a copy returned: status back to available, borrower and due
/// date cleared
#[utoipa::path(
    post,
    path = "/bookinstances/{id}/return",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Book instance ID")
    ),
    responses(
        (status = 200, description = "Copy returned", body = ReturnResponse),
        (status = 404, description = "Copy not found"),
        (status = 409, description = "Copy is not on loan")
    )
)]
pub async fn return_instance(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ReturnResponse>> {
    claims.require_mark_returned()?;

    let instance = state.services.circulation.mark_returned(id).await?;

    Ok(Json(ReturnResponse {
        status: "returned".to_string(),
        instance,
    }))
}
