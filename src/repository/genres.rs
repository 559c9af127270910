//! Genres and languages repository (lookup tables)

use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::genre::{CreateGenre, CreateLanguage, Genre, Language},
};

fn map_unique_violation(e: sqlx::Error, message: &str) -> AppError {
    match e {
        sqlx::Error::Database(ref db) if db.is_unique_violation() => {
            AppError::Conflict(message.to_string())
        }
        other => AppError::from(other),
    }
}

#[derive(Clone)]
pub struct GenresRepository {
    pool: Pool<Postgres>,
}

impl GenresRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// List all genres by name
    pub async fn list_genres(&self) -> AppResult<Vec<Genre>> {
        let genres = sqlx::query_as::<_, Genre>("SELECT * FROM genres ORDER BY name")
            .fetch_all(&self.pool)
            .await?;
        Ok(genres)
    }

    /// Create a new genre. Names are unique.
    pub async fn create_genre(&self, genre: &CreateGenre) -> AppResult<Genre> {
        sqlx::query_as::<_, Genre>("INSERT INTO genres (name) VALUES ($1) RETURNING *")
            .bind(&genre.name)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_unique_violation(e, "A genre with this name already exists"))
    }

    /// Delete a genre and its book links
    pub async fn delete_genre(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM genres WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Genre with id {} not found", id)));
        }
        Ok(())
    }

    /// List all languages by name
    pub async fn list_languages(&self) -> AppResult<Vec<Language>> {
        let languages = sqlx::query_as::<_, Language>("SELECT * FROM languages ORDER BY name")
            .fetch_all(&self.pool)
            .await?;
        Ok(languages)
    }

    /// Create a new language. Names are unique.
    pub async fn create_language(&self, language: &CreateLanguage) -> AppResult<Language> {
        sqlx::query_as::<_, Language>("INSERT INTO languages (name) VALUES ($1) RETURNING *")
            .bind(&language.name)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_unique_violation(e, "A language with this name already exists"))
    }

    /// Delete a language. Books keep their rows with `language_id`
    /// cleared by the schema (ON DELETE SET NULL).
    pub async fn delete_language(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM languages WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "Language with id {} not found",
                id
            )));
        }
        Ok(())
    }
}
