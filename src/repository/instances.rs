//! Book instances repository: copy CRUD and loan queries

use chrono::{Local, NaiveDate};
use sqlx::{Pool, Postgres, Row};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::book_instance::{
        BookInstance, CreateBookInstance, LoanDetails, LoanStatus, UpdateBookInstance,
    },
};

#[derive(Clone)]
pub struct InstancesRepository {
    pool: Pool<Postgres>,
}

impl InstancesRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get a copy by its UUID
    pub async fn get_by_id(&self, id: Uuid) -> AppResult<BookInstance> {
        sqlx::query_as::<_, BookInstance>("SELECT * FROM book_instances WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book instance {} not found", id)))
    }

    /// List the copies of a book, due-soonest first
    pub async fn list_for_book(&self, book_id: i32) -> AppResult<Vec<BookInstance>> {
        let instances = sqlx::query_as::<_, BookInstance>(
            "SELECT * FROM book_instances WHERE book_id = $1 ORDER BY due_back",
        )
        .bind(book_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(instances)
    }

    /// Create a copy of a book. The library-wide UUID is minted here,
    /// at row creation time.
    pub async fn create(
        &self,
        book_id: i32,
        instance: &CreateBookInstance,
    ) -> AppResult<BookInstance> {
        let id = Uuid::new_v4();
        let status = instance.status.unwrap_or_default();

        let created = sqlx::query_as::<_, BookInstance>(
            r#"
            INSERT INTO book_instances (id, book_id, imprint, borrower_id, due_back, status)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(book_id)
        .bind(&instance.imprint)
        .bind(instance.borrower_id)
        .bind(instance.due_back)
        .bind(status)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    /// Update a copy
    pub async fn update(&self, id: Uuid, update: &UpdateBookInstance) -> AppResult<BookInstance> {
        let mut instance = self.get_by_id(id).await?;

        if let Some(ref imprint) = update.imprint {
            instance.imprint = imprint.clone();
        }
        if let Some(status) = update.status {
            instance.status = status;
        }
        if let Some(due_back) = update.due_back {
            instance.due_back = Some(due_back);
        }
        if let Some(borrower_id) = update.borrower_id {
            instance.borrower_id = Some(borrower_id);
        }

        let updated = sqlx::query_as::<_, BookInstance>(
            r#"
            UPDATE book_instances
            SET imprint = $1, status = $2, due_back = $3, borrower_id = $4
            WHERE id = $5
            RETURNING *
            "#,
        )
        .bind(&instance.imprint)
        .bind(instance.status)
        .bind(instance.due_back)
        .bind(instance.borrower_id)
        .bind(id)
        .fetch_one(&self.pool)
        .await?;

        Ok(updated)
    }

    /// Delete a copy
    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM book_instances WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "Book instance {} not found",
                id
            )));
        }
        Ok(())
    }

    /// Copies on loan to one user, due-soonest first
    pub async fn loans_for_user(
        &self,
        user_id: i32,
        page: i64,
        per_page: i64,
    ) -> AppResult<(Vec<LoanDetails>, i64)> {
        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM book_instances WHERE borrower_id = $1 AND status = 'o'",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        let rows = sqlx::query(
            r#"
            SELECT i.id, i.book_id, i.imprint, i.due_back, i.status,
                   b.title AS book_title, u.username AS borrower
            FROM book_instances i
            LEFT JOIN books b ON i.book_id = b.id
            LEFT JOIN users u ON i.borrower_id = u.id
            WHERE i.borrower_id = $1 AND i.status = 'o'
            ORDER BY i.due_back
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(user_id)
        .bind(per_page)
        .bind((page - 1) * per_page)
        .fetch_all(&self.pool)
        .await?;

        Ok((Self::rows_to_loans(rows), total))
    }

    /// All copies currently on loan, due-soonest first
    pub async fn all_on_loan(
        &self,
        page: i64,
        per_page: i64,
    ) -> AppResult<(Vec<LoanDetails>, i64)> {
        let total: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM book_instances WHERE status = 'o'")
                .fetch_one(&self.pool)
                .await?;

        let rows = sqlx::query(
            r#"
            SELECT i.id, i.book_id, i.imprint, i.due_back, i.status,
                   b.title AS book_title, u.username AS borrower
            FROM book_instances i
            LEFT JOIN books b ON i.book_id = b.id
            LEFT JOIN users u ON i.borrower_id = u.id
            WHERE i.status = 'o'
            ORDER BY i.due_back
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(per_page)
        .bind((page - 1) * per_page)
        .fetch_all(&self.pool)
        .await?;

        Ok((Self::rows_to_loans(rows), total))
    }

    /// Loan view of a single copy (instance + book title + borrower)
    pub async fn get_loan_details(&self, id: Uuid) -> AppResult<LoanDetails> {
        let row = sqlx::query(
            r#"
            SELECT i.id, i.book_id, i.imprint, i.due_back, i.status,
                   b.title AS book_title, u.username AS borrower
            FROM book_instances i
            LEFT JOIN books b ON i.book_id = b.id
            LEFT JOIN users u ON i.borrower_id = u.id
            WHERE i.id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Book instance {} not found", id)))?;

        Ok(Self::rows_to_loans(vec![row]).remove(0))
    }

    /// Write a renewed due date onto one copy. This is the only column
    /// the renewal workflow touches.
    pub async fn renew(&self, id: Uuid, due_back: NaiveDate) -> AppResult<()> {
        let result = sqlx::query("UPDATE book_instances SET due_back = $1 WHERE id = $2")
            .bind(due_back)
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "Book instance {} not found",
                id
            )));
        }
        Ok(())
    }

    /// Mark a copy returned: back on the shelf, borrower and due date cleared
    pub async fn mark_returned(&self, id: Uuid) -> AppResult<BookInstance> {
        let instance = self.get_by_id(id).await?;

        if instance.status != LoanStatus::OnLoan {
            return Err(AppError::Conflict(format!(
                "Book instance {} is not on loan",
                id
            )));
        }

        let returned = sqlx::query_as::<_, BookInstance>(
            r#"
            UPDATE book_instances
            SET status = 'a', borrower_id = NULL, due_back = NULL
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await?;

        Ok(returned)
    }

    /// Count all copies
    pub async fn count(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM book_instances")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Count copies on the shelf (status Available)
    pub async fn count_available(&self) -> AppResult<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM book_instances WHERE status = 'a'")
                .fetch_one(&self.pool)
                .await?;
        Ok(count)
    }

    fn rows_to_loans(rows: Vec<sqlx::postgres::PgRow>) -> Vec<LoanDetails> {
        let today = Local::now().date_naive();

        rows.into_iter()
            .map(|row| {
                let due_back: Option<NaiveDate> = row.get("due_back");
                let status: LoanStatus = row.get("status");
                LoanDetails {
                    id: row.get("id"),
                    book_id: row.get("book_id"),
                    book_title: row.get("book_title"),
                    imprint: row.get("imprint"),
                    due_back,
                    status,
                    borrower: row.get("borrower"),
                    is_overdue: due_back.map(|d| d < today).unwrap_or(false),
                }
            })
            .collect()
    }
}
