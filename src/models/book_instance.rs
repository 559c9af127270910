//! Book instance (physical copy) model and related types

use chrono::{Duration, Local, NaiveDate};
use serde::{Deserialize, Serialize};
use sqlx::{Decode, Encode, FromRow, Postgres};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

/// Renewal window: a due date may be pushed at most this many days ahead
pub const RENEWAL_WINDOW_DAYS: i64 = 28;

/// Suggested renewal period pre-filled on the renewal form
pub const PROPOSED_RENEWAL_DAYS: i64 = 21;

/// Loan status of a copy. Stored in the database as a one-character code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum LoanStatus {
    #[serde(rename = "m")]
    Maintenance,
    #[serde(rename = "o")]
    OnLoan,
    #[serde(rename = "a")]
    Available,
    #[serde(rename = "r")]
    Reserved,
}

impl LoanStatus {
    /// Return the one-character database code for this status
    pub fn as_code(&self) -> &'static str {
        match self {
            LoanStatus::Maintenance => "m",
            LoanStatus::OnLoan => "o",
            LoanStatus::Available => "a",
            LoanStatus::Reserved => "r",
        }
    }
}

impl From<&str> for LoanStatus {
    fn from(s: &str) -> Self {
        match s {
            "o" => LoanStatus::OnLoan,
            "a" => LoanStatus::Available,
            "r" => LoanStatus::Reserved,
            _ => LoanStatus::Maintenance,
        }
    }
}

impl Default for LoanStatus {
    fn default() -> Self {
        LoanStatus::Maintenance
    }
}

impl std::fmt::Display for LoanStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_code())
    }
}

// SQLx conversion for LoanStatus (stored as a one-character string)
impl sqlx::Type<Postgres> for LoanStatus {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<Postgres>>::type_info()
    }
}

impl<'r> Decode<'r, Postgres> for LoanStatus {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s: String = Decode::<Postgres>::decode(value)?;
        Ok(LoanStatus::from(s.as_str()))
    }
}

impl Encode<'_, Postgres> for LoanStatus {
    fn encode_by_ref(&self, buf: &mut sqlx::postgres::PgArgumentBuffer) -> sqlx::encode::IsNull {
        let s: String = self.as_code().to_string();
        <String as Encode<Postgres>>::encode(s, buf)
    }
}

/// A specific physical copy of a book, identified library-wide by a
/// random UUID minted when the row is created.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct BookInstance {
    pub id: Uuid,
    /// Weak reference: cleared when the book is deleted
    pub book_id: Option<i32>,
    pub imprint: String,
    /// Weak reference to the borrowing user, set while on loan
    pub borrower_id: Option<i32>,
    pub due_back: Option<NaiveDate>,
    pub status: LoanStatus,
}

impl BookInstance {
    /// Whether this copy is overdue as of `today`. A copy with no due
    /// date is never overdue; the due date itself is still on time.
    pub fn is_overdue_on(&self, today: NaiveDate) -> bool {
        matches!(self.due_back, Some(due) if due < today)
    }

    /// Overdue check against the server's local calendar date
    pub fn is_overdue(&self) -> bool {
        self.is_overdue_on(Local::now().date_naive())
    }
}

/// Loan view of a copy: the instance joined with its book title and
/// borrower name, as shown on the loan lists and the renewal form.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct LoanDetails {
    pub id: Uuid,
    pub book_id: Option<i32>,
    pub book_title: Option<String>,
    pub imprint: String,
    pub due_back: Option<NaiveDate>,
    pub status: LoanStatus,
    pub borrower: Option<String>,
    pub is_overdue: bool,
}

/// Create book instance request. The UUID is generated server-side.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateBookInstance {
    #[validate(length(min = 1, max = 200))]
    pub imprint: String,
    pub status: Option<LoanStatus>,
    pub due_back: Option<NaiveDate>,
    pub borrower_id: Option<i32>,
}

/// Update book instance request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateBookInstance {
    #[validate(length(min = 1, max = 200))]
    pub imprint: Option<String>,
    pub status: Option<LoanStatus>,
    pub due_back: Option<NaiveDate>,
    pub borrower_id: Option<i32>,
}

/// Renewal form payload for the librarian workflow
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RenewBookInstance {
    #[validate(custom(function = validate_renewal_date))]
    pub renewal_date: NaiveDate,
}

/// Renewal date rule: the new due date must lie between today and
/// today + 4 weeks, both ends inclusive. `today` is the server's local
/// calendar date; it is a parameter so the rule can be tested.
pub fn check_renewal_date(date: NaiveDate, today: NaiveDate) -> Result<(), ValidationError> {
    if date < today {
        return Err(ValidationError::new("renewal_in_past")
            .with_message("Invalid date - renewal in past".into()));
    }
    if date > today + Duration::days(RENEWAL_WINDOW_DAYS) {
        return Err(ValidationError::new("renewal_too_far_ahead")
            .with_message("Invalid date - renewal more than 4 weeks ahead".into()));
    }
    Ok(())
}

fn validate_renewal_date(date: &NaiveDate) -> Result<(), ValidationError> {
    check_renewal_date(*date, Local::now().date_naive())
}

/// Suggested renewal date pre-filled on the form: three weeks out
pub fn proposed_renewal_date(today: NaiveDate) -> NaiveDate {
    today + Duration::days(PROPOSED_RENEWAL_DAYS)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_status_codes_roundtrip() {
        for status in [
            LoanStatus::Maintenance,
            LoanStatus::OnLoan,
            LoanStatus::Available,
            LoanStatus::Reserved,
        ] {
            assert_eq!(LoanStatus::from(status.as_code()), status);
        }
    }

    #[test]
    fn test_unknown_status_defaults_to_maintenance() {
        assert_eq!(LoanStatus::from("x"), LoanStatus::Maintenance);
        assert_eq!(LoanStatus::from(""), LoanStatus::Maintenance);
    }

    #[test]
    fn test_renewal_date_window() {
        let today = day(2024, 3, 15);

        let err = check_renewal_date(today - Duration::days(1), today).unwrap_err();
        assert_eq!(err.code, "renewal_in_past");

        assert!(check_renewal_date(today, today).is_ok());
        assert!(check_renewal_date(today + Duration::days(28), today).is_ok());

        let err = check_renewal_date(today + Duration::days(29), today).unwrap_err();
        assert_eq!(err.code, "renewal_too_far_ahead");
    }

    #[test]
    fn test_renewal_window_across_month_end() {
        let today = day(2024, 1, 31);
        assert!(check_renewal_date(day(2024, 2, 28), today).is_ok());
        assert!(check_renewal_date(day(2024, 2, 29), today).is_err());
    }

    #[test]
    fn test_proposed_renewal_date() {
        assert_eq!(proposed_renewal_date(day(2024, 3, 15)), day(2024, 4, 5));
    }

    #[test]
    fn test_is_overdue() {
        let mut instance = BookInstance {
            id: Uuid::new_v4(),
            book_id: Some(1),
            imprint: "Foreign Books Inc., 2016".to_string(),
            borrower_id: None,
            due_back: None,
            status: LoanStatus::OnLoan,
        };
        let today = day(2024, 3, 15);

        assert!(!instance.is_overdue_on(today));

        instance.due_back = Some(today);
        assert!(!instance.is_overdue_on(today));

        instance.due_back = Some(today - Duration::days(1));
        assert!(instance.is_overdue_on(today));
    }
}
