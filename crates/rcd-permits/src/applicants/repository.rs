use super::domain::{Applicant, ApplicantId};
use crate::error::RepositoryError;

/// Storage abstraction for permit holders.
pub trait ApplicantRepository: Send + Sync {
    fn next_id(&self) -> Result<ApplicantId, RepositoryError>;
    fn insert(&self, applicant: Applicant) -> Result<Applicant, RepositoryError>;
    fn update(&self, applicant: Applicant) -> Result<(), RepositoryError>;
    fn fetch(&self, id: ApplicantId) -> Result<Option<Applicant>, RepositoryError>;
    /// Every applicant ordered by id.
    fn list(&self) -> Result<Vec<Applicant>, RepositoryError>;
}
