use chrono::NaiveDate;

use super::domain::{ApplicationId, ApplicationRecord};
use crate::error::RepositoryError;
use crate::permits::PermitNumber;

/// Storage abstraction so the service module can be exercised in isolation.
pub trait ApplicationRepository: Send + Sync {
    fn next_id(&self) -> Result<ApplicationId, RepositoryError>;
    fn next_invoice_number(&self) -> Result<u64, RepositoryError>;
    fn insert(&self, record: ApplicationRecord) -> Result<ApplicationRecord, RepositoryError>;
    fn update(&self, record: ApplicationRecord) -> Result<(), RepositoryError>;
    fn fetch(&self, id: ApplicationId) -> Result<Option<ApplicationRecord>, RepositoryError>;
    /// Every application ordered by id.
    fn list(&self) -> Result<Vec<ApplicationRecord>, RepositoryError>;
    /// Applications whose UTC creation date falls in `start..=end`.
    fn created_between(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<ApplicationRecord>, RepositoryError>;
    fn find_by_app_number(
        &self,
        app_number: PermitNumber,
    ) -> Result<Option<ApplicationRecord>, RepositoryError>;
}
