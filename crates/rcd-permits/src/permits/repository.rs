use chrono::NaiveDate;

use super::domain::{Permit, PermitNumber};
use crate::applicants::ApplicantId;
use crate::error::RepositoryError;

/// Storage abstraction for issued permits.
pub trait PermitRepository: Send + Sync {
    fn insert(&self, permit: Permit) -> Result<Permit, RepositoryError>;
    fn update(&self, permit: Permit) -> Result<(), RepositoryError>;
    fn fetch(&self, id: PermitNumber) -> Result<Option<Permit>, RepositoryError>;
    /// All permits for an applicant, most recently issued first.
    fn for_applicant(&self, applicant_id: ApplicantId) -> Result<Vec<Permit>, RepositoryError>;
    /// Permits whose expiry date (UTC) falls in `start..=end`.
    fn expiring_between(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Permit>, RepositoryError>;
}
