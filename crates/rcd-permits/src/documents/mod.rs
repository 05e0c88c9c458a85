//! Generated artifacts (invoices, wallet cards, report files) and their signed links.

pub mod domain;
pub mod router;
pub mod service;
pub mod signer;
pub mod store;

pub use domain::{Invoice, StoredDocument, StoredObject, WalletCard, SIGNED_URL_REFRESH_AFTER_DAYS};
pub use router::document_router;
pub use service::{DocumentError, DocumentService};
pub use signer::{SignedUrl, UrlSigner, SIGNED_URL_TTL_DAYS};
pub use store::ObjectStore;
