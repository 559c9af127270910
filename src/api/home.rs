//! Home page summary endpoint

use axum::{
    extract::State,
    http::{header::SET_COOKIE, HeaderValue},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::error::{AppError, AppResult};

use super::VisitorSession;

/// Collection counts shown on the home page
#[derive(Debug, Serialize, ToSchema)]
pub struct SummaryCounts {
    /// Total number of books in the catalog
    pub num_books: i64,
    /// Total number of physical copies
    pub num_instances: i64,
    /// Copies currently on the shelf
    pub num_instances_available: i64,
    /// Total number of authors
    pub num_authors: i64,
}

/// Home page response
#[derive(Serialize, ToSchema)]
pub struct SummaryResponse {
    #[serde(flatten)]
    pub counts: SummaryCounts,
    /// Visits this session has made to the home page before this one
    pub num_visits: i64,
}

/// Home page: collection counts plus the per-session visit counter
#[utoipa::path(
    get,
    path = "/",
    tag = "home",
    responses(
        (status = 200, description = "Library summary", body = SummaryResponse)
    )
)]
pub async fn index(
    State(state): State<crate::AppState>,
    session: VisitorSession,
) -> AppResult<Response> {
    let counts = state.services.catalog.summary().await?;
    let num_visits = state.services.sessions.record_visit(&session.id).await?;

    let mut response = Json(SummaryResponse { counts, num_visits }).into_response();

    if session.is_new {
        let cookie = format!(
            "{}={}; Path=/; HttpOnly; Max-Age={}",
            state.config.sessions.cookie_name, session.id, state.config.sessions.ttl_seconds
        );
        let value = HeaderValue::from_str(&cookie)
            .map_err(|e| AppError::Internal(format!("Invalid session cookie: {}", e)))?;
        response.headers_mut().insert(SET_COOKIE, value);
    }

    Ok(response)
}
