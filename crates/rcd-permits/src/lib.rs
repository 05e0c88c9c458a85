pub mod applicants;
pub mod applications;
pub mod config;
pub mod documents;
pub mod error;
pub mod memory;
pub mod permits;
pub mod portal;
pub mod reports;
pub mod telemetry;

pub use portal::{Portal, PortalRepositories};
