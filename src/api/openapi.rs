//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{auth, authors, books, genres, health, home, loans};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Biblios API",
        version = "1.0.0",
        description = "Library Catalog REST API",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html"),
        contact(name = "Biblios Team", email = "contact@biblios.org")
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Home
        home::index,
        // Health
        health::health_check,
        health::readiness_check,
        // Auth
        auth::login,
        auth::me,
        // Authors
        authors::list_authors,
        authors::get_author,
        authors::create_author,
        authors::update_author,
        authors::delete_author,
        // Books
        books::list_books,
        books::get_book,
        books::create_book,
        books::update_book,
        books::delete_book,
        books::list_instances,
        books::create_instance,
        books::update_instance,
        books::delete_instance,
        // Genres and languages
        genres::list_genres,
        genres::create_genre,
        genres::delete_genre,
        genres::list_languages,
        genres::create_language,
        genres::delete_language,
        // Loans
        loans::my_loans,
        loans::all_borrowed,
        loans::renew_form,
        loans::renew_submit,
        loans::return_instance,
    ),
    components(
        schemas(
            // Home
            home::SummaryCounts,
            home::SummaryResponse,
            // Auth
            crate::models::user::LoginRequest,
            crate::models::user::LoginResponse,
            crate::models::user::UserInfo,
            // Authors
            crate::models::author::Author,
            crate::models::author::AuthorDetails,
            crate::models::author::CreateAuthor,
            crate::models::author::UpdateAuthor,
            // Books
            crate::models::book::Book,
            crate::models::book::BookSummary,
            crate::models::book::CreateBook,
            crate::models::book::UpdateBook,
            crate::models::book_instance::BookInstance,
            crate::models::book_instance::LoanStatus,
            crate::models::book_instance::CreateBookInstance,
            crate::models::book_instance::UpdateBookInstance,
            crate::models::book_instance::RenewBookInstance,
            // Genres and languages
            crate::models::genre::Genre,
            crate::models::genre::Language,
            crate::models::genre::CreateGenre,
            crate::models::genre::CreateLanguage,
            // Loans
            crate::models::book_instance::LoanDetails,
            loans::FormFieldError,
            loans::RenewalFormResponse,
            loans::ReturnResponse,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "home", description = "Library summary"),
        (name = "health", description = "Health check endpoints"),
        (name = "auth", description = "Authentication endpoints"),
        (name = "authors", description = "Author catalog"),
        (name = "books", description = "Book catalog and copies"),
        (name = "catalog", description = "Genres and languages"),
        (name = "loans", description = "Loans and renewals")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
