//! Permit holders: identity, contact details, guardian, and medical information.

pub mod domain;
pub mod repository;
pub mod router;
pub mod service;

pub use domain::{
    Address, Applicant, ApplicantEdit, ApplicantId, ApplicantStatus, Gender, Guardian,
    MedicalInformation, PatientCondition, Physician,
};
pub(crate) use domain::full_name;
pub use repository::ApplicantRepository;
pub use router::applicant_router;
pub use service::{ApplicantService, ApplicantServiceError, NewApplicant};
