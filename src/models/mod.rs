//! Data models for Biblios

pub mod author;
pub mod book;
pub mod book_instance;
pub mod genre;
pub mod user;

use serde::Deserialize;
use utoipa::IntoParams;

// Re-export commonly used types
pub use author::Author;
pub use book::{Book, BookSummary};
pub use book_instance::{BookInstance, LoanDetails, LoanStatus};
pub use genre::{Genre, Language};
pub use user::User;

/// Common pagination query parameters
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct PageQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

impl PageQuery {
    /// Resolve page/per_page against a per-view default, clamped to sane bounds
    pub fn resolve(&self, default_per_page: i64) -> (i64, i64) {
        let page = self.page.unwrap_or(1).max(1);
        let per_page = self.per_page.unwrap_or(default_per_page).clamp(1, 100);
        (page, per_page)
    }
}
