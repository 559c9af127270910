//! Catalog service: authors, books, genres, languages and copies

use uuid::Uuid;

use crate::{
    api::home::SummaryCounts,
    error::AppResult,
    models::{
        author::{Author, AuthorDetails, CreateAuthor, UpdateAuthor},
        book::{Book, BookSummary, CreateBook, UpdateBook},
        book_instance::{BookInstance, CreateBookInstance, UpdateBookInstance},
        genre::{CreateGenre, CreateLanguage, Genre, Language},
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct CatalogService {
    repository: Repository,
}

impl CatalogService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    // --- Authors ---

    pub async fn list_authors(&self, page: i64, per_page: i64) -> AppResult<(Vec<Author>, i64)> {
        self.repository.authors.list(page, per_page).await
    }

    /// Author detail with their books
    pub async fn get_author(&self, id: i32) -> AppResult<AuthorDetails> {
        let author = self.repository.authors.get_by_id(id).await?;
        let books = self.repository.books.list_by_author(id).await?;
        Ok(AuthorDetails { author, books })
    }

    pub async fn create_author(&self, author: &CreateAuthor) -> AppResult<Author> {
        self.repository.authors.create(author).await
    }

    pub async fn update_author(&self, id: i32, update: &UpdateAuthor) -> AppResult<Author> {
        self.repository.authors.update(id, update).await
    }

    pub async fn delete_author(&self, id: i32) -> AppResult<()> {
        self.repository.authors.delete(id).await
    }

    // --- Books ---

    pub async fn list_books(&self, page: i64, per_page: i64) -> AppResult<(Vec<BookSummary>, i64)> {
        self.repository.books.list(page, per_page).await
    }

    pub async fn get_book(&self, id: i32) -> AppResult<Book> {
        self.repository.books.get_by_id(id).await
    }

    pub async fn create_book(&self, book: &CreateBook) -> AppResult<Book> {
        let created = self.repository.books.create(book).await?;
        tracing::info!("Created book {} ({})", created.id, created.title);
        Ok(created)
    }

    pub async fn update_book(&self, id: i32, update: &UpdateBook) -> AppResult<Book> {
        self.repository.books.update(id, update).await
    }

    pub async fn delete_book(&self, id: i32) -> AppResult<()> {
        self.repository.books.delete(id).await
    }

    // --- Copies ---

    pub async fn list_instances(&self, book_id: i32) -> AppResult<Vec<BookInstance>> {
        // Verify book exists
        self.repository.books.get_by_id(book_id).await?;
        self.repository.instances.list_for_book(book_id).await
    }

    pub async fn create_instance(
        &self,
        book_id: i32,
        instance: &CreateBookInstance,
    ) -> AppResult<BookInstance> {
        // Verify book exists
        self.repository.books.get_by_id(book_id).await?;
        self.repository.instances.create(book_id, instance).await
    }

    pub async fn update_instance(
        &self,
        id: Uuid,
        update: &UpdateBookInstance,
    ) -> AppResult<BookInstance> {
        self.repository.instances.update(id, update).await
    }

    pub async fn delete_instance(&self, id: Uuid) -> AppResult<()> {
        self.repository.instances.delete(id).await
    }

    // --- Genres and languages ---

    pub async fn list_genres(&self) -> AppResult<Vec<Genre>> {
        self.repository.genres.list_genres().await
    }

    pub async fn create_genre(&self, genre: &CreateGenre) -> AppResult<Genre> {
        self.repository.genres.create_genre(genre).await
    }

    pub async fn delete_genre(&self, id: i32) -> AppResult<()> {
        self.repository.genres.delete_genre(id).await
    }

    pub async fn list_languages(&self) -> AppResult<Vec<Language>> {
        self.repository.genres.list_languages().await
    }

    pub async fn create_language(&self, language: &CreateLanguage) -> AppResult<Language> {
        self.repository.genres.create_language(language).await
    }

    pub async fn delete_language(&self, id: i32) -> AppResult<()> {
        self.repository.genres.delete_language(id).await
    }

    /// Verify the database connection is usable
    pub async fn ping(&self) -> AppResult<()> {
        sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&self.repository.pool)
            .await?;
        Ok(())
    }

    // --- Summary ---

    /// Collection counts for the home page
    pub async fn summary(&self) -> AppResult<SummaryCounts> {
        let num_books = self.repository.books.count().await?;
        let num_instances = self.repository.instances.count().await?;
        let num_instances_available = self.repository.instances.count_available().await?;
        let num_authors = self.repository.authors.count().await?;

        Ok(SummaryCounts {
            num_books,
            num_instances,
            num_instances_available,
            num_authors,
        })
    }
}
