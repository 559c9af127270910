//! Books repository for database operations

use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::{
        author::Author,
        book::{Book, BookSummary, CreateBook, UpdateBook},
        book_instance::BookInstance,
        genre::{Genre, Language},
    },
};

#[derive(Clone)]
pub struct BooksRepository {
    pool: Pool<Postgres>,
}

impl BooksRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// List books ordered by title, with the author display name joined in
    pub async fn list(&self, page: i64, per_page: i64) -> AppResult<(Vec<BookSummary>, i64)> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM books")
            .fetch_one(&self.pool)
            .await?;

        let books = sqlx::query_as::<_, BookSummary>(
            r#"
            SELECT b.id, b.title,
                   a.last_name || ', ' || a.first_name AS author
            FROM books b
            LEFT JOIN authors a ON b.author_id = a.id
            ORDER BY b.title
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(per_page)
        .bind((page - 1) * per_page)
        .fetch_all(&self.pool)
        .await?;

        Ok((books, total))
    }

    /// List books of one author (for the author detail view)
    pub async fn list_by_author(&self, author_id: i32) -> AppResult<Vec<BookSummary>> {
        let books = sqlx::query_as::<_, BookSummary>(
            r#"
            SELECT b.id, b.title,
                   a.last_name || ', ' || a.first_name AS author
            FROM books b
            LEFT JOIN authors a ON b.author_id = a.id
            WHERE b.author_id = $1
            ORDER BY b.title
            "#,
        )
        .bind(author_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(books)
    }

    /// Get book by ID with author, language, genres and copies loaded
    pub async fn get_by_id(&self, id: i32) -> AppResult<Book> {
        let mut book = sqlx::query_as::<_, Book>("SELECT * FROM books WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))?;

        if let Some(author_id) = book.author_id {
            book.author = sqlx::query_as::<_, Author>("SELECT * FROM authors WHERE id = $1")
                .bind(author_id)
                .fetch_optional(&self.pool)
                .await?;
        }

        if let Some(language_id) = book.language_id {
            book.language = sqlx::query_as::<_, Language>("SELECT * FROM languages WHERE id = $1")
                .bind(language_id)
                .fetch_optional(&self.pool)
                .await?;
        }

        book.genres = sqlx::query_as::<_, Genre>(
            r#"
            SELECT g.id, g.name
            FROM genres g
            JOIN book_genres bg ON bg.genre_id = g.id
            WHERE bg.book_id = $1
            ORDER BY g.name
            "#,
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        book.instances = sqlx::query_as::<_, BookInstance>(
            "SELECT * FROM book_instances WHERE book_id = $1 ORDER BY due_back",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        Ok(book)
    }

    /// Create a new book and link its genres
    pub async fn create(&self, book: &CreateBook) -> AppResult<Book> {
        let id: i32 = sqlx::query_scalar(
            r#"
            INSERT INTO books (title, subtitle, summary, isbn, author_id, language_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id
            "#,
        )
        .bind(&book.title)
        .bind(&book.subtitle)
        .bind(&book.summary)
        .bind(&book.isbn)
        .bind(book.author_id)
        .bind(book.language_id)
        .fetch_one(&self.pool)
        .await?;

        self.replace_genres(id, &book.genre_ids).await?;

        self.get_by_id(id).await
    }

    /// Update an existing book. A genre set in the request replaces the
    /// stored one wholesale.
    pub async fn update(&self, id: i32, update: &UpdateBook) -> AppResult<Book> {
        let mut book = sqlx::query_as::<_, Book>("SELECT * FROM books WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))?;

        if let Some(ref title) = update.title {
            book.title = title.clone();
        }
        if let Some(ref subtitle) = update.subtitle {
            book.subtitle = Some(subtitle.clone());
        }
        if let Some(ref summary) = update.summary {
            book.summary = summary.clone();
        }
        if let Some(ref isbn) = update.isbn {
            book.isbn = isbn.clone();
        }
        if let Some(author_id) = update.author_id {
            book.author_id = Some(author_id);
        }
        if let Some(language_id) = update.language_id {
            book.language_id = Some(language_id);
        }

        sqlx::query(
            r#"
            UPDATE books
            SET title = $1, subtitle = $2, summary = $3, isbn = $4,
                author_id = $5, language_id = $6
            WHERE id = $7
            "#,
        )
        .bind(&book.title)
        .bind(&book.subtitle)
        .bind(&book.summary)
        .bind(&book.isbn)
        .bind(book.author_id)
        .bind(book.language_id)
        .bind(id)
        .execute(&self.pool)
        .await?;

        if let Some(ref genre_ids) = update.genre_ids {
            self.replace_genres(id, genre_ids).await?;
        }

        self.get_by_id(id).await
    }

    /// Delete a book. Copies keep their rows with `book_id` cleared;
    /// genre links are removed by the schema.
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Book with id {} not found", id)));
        }
        Ok(())
    }

    /// Count all books
    pub async fn count(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM books")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn replace_genres(&self, book_id: i32, genre_ids: &[i32]) -> AppResult<()> {
        sqlx::query("DELETE FROM book_genres WHERE book_id = $1")
            .bind(book_id)
            .execute(&self.pool)
            .await?;

        for genre_id in genre_ids {
            sqlx::query("INSERT INTO book_genres (book_id, genre_id) VALUES ($1, $2)")
                .bind(book_id)
                .bind(genre_id)
                .execute(&self.pool)
                .await?;
        }
        Ok(())
    }
}
