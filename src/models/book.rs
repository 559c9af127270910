//! Book (catalog title) model and related types.
//!
//! A `Book` is the bibliographic record; physical loanable copies are
//! [`BookInstance`](super::book_instance::BookInstance) rows.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use super::author::Author;
use super::book_instance::BookInstance;
use super::genre::{Genre, Language};

/// Full book model (DB + API)
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Book {
    pub id: i32,
    pub title: String,
    pub subtitle: Option<String>,
    pub summary: String,
    pub isbn: String,
    /// Weak reference: cleared when the author is deleted
    pub author_id: Option<i32>,
    /// Weak reference: cleared when the language is deleted
    pub language_id: Option<i32>,
    // Relations (loaded separately)
    #[sqlx(skip)]
    #[serde(default)]
    pub author: Option<Author>,
    #[sqlx(skip)]
    #[serde(default)]
    pub language: Option<Language>,
    #[sqlx(skip)]
    #[serde(default)]
    pub genres: Vec<Genre>,
    #[sqlx(skip)]
    #[serde(default)]
    pub instances: Vec<BookInstance>,
}

/// Short book representation for lists
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct BookSummary {
    pub id: i32,
    pub title: String,
    /// "Lastname, Firstname" of the author, when set
    pub author: Option<String>,
}

/// Create book request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateBook {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[validate(length(max = 200))]
    pub subtitle: Option<String>,
    #[validate(length(max = 10000))]
    pub summary: String,
    /// 13-character ISBN, with room for hyphen-free 14-char legacy entries
    #[validate(length(min = 10, max = 14))]
    pub isbn: String,
    pub author_id: Option<i32>,
    pub language_id: Option<i32>,
    #[serde(default)]
    pub genre_ids: Vec<i32>,
}

/// Update book request. The genre set, when present, replaces the
/// existing one wholesale.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateBook {
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,
    #[validate(length(max = 200))]
    pub subtitle: Option<String>,
    #[validate(length(max = 10000))]
    pub summary: Option<String>,
    #[validate(length(min = 10, max = 14))]
    pub isbn: Option<String>,
    pub author_id: Option<i32>,
    pub language_id: Option<i32>,
    pub genre_ids: Option<Vec<i32>>,
}
