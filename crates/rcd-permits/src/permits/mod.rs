//! Issued permits, their expiry classification, and the one-active-permit rule.

pub mod domain;
pub mod expiry;
pub mod repository;
pub mod router;
pub mod service;

pub use domain::{
    expiry_for, Permit, PermitNumber, PermitType, PermitView, PERMANENT_PERMIT_VALIDITY_MONTHS,
};
pub use expiry::{classify, days_until_expiry, PermitStatus, EXPIRING_WINDOW_DAYS};
pub use repository::PermitRepository;
pub use router::permit_router;
pub use service::{PermitService, PermitServiceError};
