//! Borrowed-copy listings and the librarian renewal workflow

use chrono::{Duration, NaiveDate, Utc};
use uuid::Uuid;

use crate::{
    config::LoansConfig,
    error::{AppError, AppResult},
    models::instance::{BookInstanceDetails, CreateBookInstance},
    repository::Repository,
};

/// Proposed renewal date shown on the form: today + the configured period.
/// Recomputed on every request, never stored.
pub fn proposed_renewal_date(config: &LoansConfig, today: NaiveDate) -> NaiveDate {
    today + Duration::days(config.renewal_period_days)
}

/// Check a submitted renewal date: not in the past, not beyond the horizon.
/// Today and today + horizon are both accepted.
pub fn check_renewal_date(
    config: &LoansConfig,
    date: NaiveDate,
    today: NaiveDate,
) -> Result<(), &'static str> {
    if date < today {
        return Err("Invalid date - renewal in past");
    }
    if date > today + Duration::days(config.renewal_horizon_days) {
        return Err("Invalid date - renewal more than 4 weeks ahead");
    }
    Ok(())
}

fn renewal_date_error(message: &'static str) -> AppError {
    let mut errors = validator::ValidationErrors::new();
    let mut error = validator::ValidationError::new("renewal_date_range");
    error.message = Some(message.into());
    errors.add("renewal_date", error);
    AppError::Invalid(errors)
}

#[derive(Clone)]
pub struct LoansService {
    repository: Repository,
    config: LoansConfig,
}

impl LoansService {
    pub fn new(repository: Repository, config: LoansConfig) -> Self {
        Self { repository, config }
    }

    /// Copies on loan to one borrower, soonest due first
    pub async fn my_borrowed(
        &self,
        borrower_id: i32,
        page: i64,
        per_page: i64,
    ) -> AppResult<(Vec<BookInstanceDetails>, i64)> {
        self.repository
            .instances
            .list_borrowed_by(borrower_id, page, per_page)
            .await
    }

    /// All copies on loan, soonest due first
    pub async fn all_borrowed(
        &self,
        page: i64,
        per_page: i64,
    ) -> AppResult<(Vec<BookInstanceDetails>, i64)> {
        self.repository.instances.list_on_loan(page, per_page).await
    }

    /// Get a single copy
    pub async fn get_instance(&self, id: Uuid) -> AppResult<BookInstanceDetails> {
        self.repository.instances.get_by_id(id).await
    }

    /// Create a copy (administrative)
    pub async fn create_instance(
        &self,
        data: &CreateBookInstance,
    ) -> AppResult<BookInstanceDetails> {
        self.repository.instances.create(data).await
    }

    /// The renewal date the form is pre-populated with
    pub fn proposed_renewal_date(&self) -> NaiveDate {
        proposed_renewal_date(&self.config, Utc::now().date_naive())
    }

    /// Renew a copy: validate the submitted date and persist it as the new
    /// due date. Two librarians renewing the same copy is last write wins;
    /// the single UPDATE keeps each write atomic.
    pub async fn renew(&self, id: Uuid, renewal_date: NaiveDate) -> AppResult<BookInstanceDetails> {
        // 404 before validation, as for any unknown id
        self.repository.instances.get_by_id(id).await?;

        let today = Utc::now().date_naive();
        check_renewal_date(&self.config, renewal_date, today).map_err(renewal_date_error)?;

        self.repository.instances.set_due_back(id, renewal_date).await?;
        self.repository.instances.get_by_id(id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> LoansConfig {
        LoansConfig {
            renewal_period_days: 21,
            renewal_horizon_days: 28,
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 15).unwrap()
    }

    #[test]
    fn proposed_date_is_three_weeks_out() {
        assert_eq!(
            proposed_renewal_date(&config(), today()),
            NaiveDate::from_ymd_opt(2024, 4, 5).unwrap()
        );
    }

    #[test]
    fn renewal_today_is_accepted() {
        assert!(check_renewal_date(&config(), today(), today()).is_ok());
    }

    #[test]
    fn renewal_yesterday_is_rejected() {
        let yesterday = today() - Duration::days(1);
        assert!(check_renewal_date(&config(), yesterday, today()).is_err());
    }

    #[test]
    fn renewal_at_four_weeks_is_accepted() {
        let limit = today() + Duration::weeks(4);
        assert!(check_renewal_date(&config(), limit, today()).is_ok());
    }

    #[test]
    fn renewal_beyond_four_weeks_is_rejected() {
        let beyond = today() + Duration::weeks(4) + Duration::days(1);
        assert!(check_renewal_date(&config(), beyond, today()).is_err());
    }

    #[test]
    fn renewal_error_names_the_field() {
        let err = renewal_date_error("Invalid date - renewal in past");
        match err {
            AppError::Invalid(errors) => {
                assert!(errors.field_errors().contains_key("renewal_date"));
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }
}
