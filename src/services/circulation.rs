//! Circulation service: loan lists, renewals and returns

use chrono::NaiveDate;
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::book_instance::{BookInstance, LoanDetails},
    repository::Repository,
};

#[derive(Clone)]
pub struct CirculationService {
    repository: Repository,
}

impl CirculationService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Copies on loan to one user
    pub async fn loans_for_user(
        &self,
        user_id: i32,
        page: i64,
        per_page: i64,
    ) -> AppResult<(Vec<LoanDetails>, i64)> {
        self.repository
            .instances
            .loans_for_user(user_id, page, per_page)
            .await
    }

    /// All copies currently on loan
    pub async fn all_on_loan(&self, page: i64, per_page: i64) -> AppResult<(Vec<LoanDetails>, i64)> {
        self.repository.instances.all_on_loan(page, per_page).await
    }

    /// Loan view of one copy, for the renewal form
    pub async fn loan_details(&self, id: Uuid) -> AppResult<LoanDetails> {
        self.repository.instances.get_loan_details(id).await
    }

    /// Renew a loan: write the validated due date onto the copy
    pub async fn renew(&self, id: Uuid, due_back: NaiveDate) -> AppResult<()> {
        self.repository.instances.renew(id, due_back).await?;
        tracing::info!("Renewed book instance {} until {}", id, due_back);
        Ok(())
    }

    /// Mark a copy returned
    pub async fn mark_returned(&self, id: Uuid) -> AppResult<BookInstance> {
        let returned = self.repository.instances.mark_returned(id).await?;
        tracing::info!("Book instance {} marked returned", id);
        Ok(returned)
    }
}
