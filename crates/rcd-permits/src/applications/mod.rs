//! Permit requests (new, renewal, replacement) and the staff processing workflow.

mod artifacts;
pub mod domain;
pub mod processing;
pub mod repository;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub(crate) use artifacts::dollars;
pub use domain::{
    ApplicantContact, ApplicationDetails, ApplicationId, ApplicationRecord, ApplicationSubmission,
    ApplicationType, PaymentDetails, PaymentMethod, ReplacementReason, SubmissionEdit,
};
pub use processing::{
    ApplicationProcessing, ApplicationStatus, ProcessingAction, ProcessingError, ProcessingTask,
    StaffReview,
};
pub use repository::ApplicationRepository;
pub use router::{application_router, ApplicationView};
pub use service::{
    ApplicationFilter, ApplicationService, ApplicationServiceError, CompletionOutcome,
};
