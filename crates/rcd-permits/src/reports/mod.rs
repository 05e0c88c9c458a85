//! Column-projected CSV exports of applications and permit holders.

mod columns;
mod error;
mod generator;
pub mod router;

pub use columns::{ApplicationsReportColumn, PermitHoldersReportColumn, ReportColumn};
pub use error::ReportError;
pub use generator::{RenderedReport, ReportGenerator, ReportLink, ReportRequest};
pub use router::report_router;
