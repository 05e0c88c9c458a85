use std::sync::Arc;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use chrono::{DateTime, Utc};
use tracing::debug;

use super::domain::{StoredDocument, StoredObject};
use super::signer::UrlSigner;
use super::store::ObjectStore;
use crate::error::error_response;

/// Stores generated artifacts and hands out signed links to them.
pub struct DocumentService {
    store: Arc<dyn ObjectStore>,
    signer: UrlSigner,
}

impl DocumentService {
    pub fn new(store: Arc<dyn ObjectStore>, signer: UrlSigner) -> Self {
        Self { store, signer }
    }

    pub fn save(
        &self,
        key: &str,
        content_type: &str,
        bytes: Vec<u8>,
        now: DateTime<Utc>,
    ) -> Result<StoredDocument, DocumentError> {
        validate_key(key)?;
        self.store.put(StoredObject {
            key: key.to_string(),
            content_type: content_type.to_string(),
            bytes,
        })?;

        let signed = self.signer.sign(key, now)?;
        Ok(StoredDocument {
            key: key.to_string(),
            content_type: content_type.to_string(),
            url: signed.url,
            url_signed_at: signed.signed_at,
            url_expires_at: signed.expires_at,
        })
    }

    /// Re-sign `document` when its link is stale. Returns whether it changed.
    pub fn refresh(
        &self,
        document: &mut StoredDocument,
        now: DateTime<Utc>,
    ) -> Result<bool, DocumentError> {
        if !document.needs_refresh(now) {
            return Ok(false);
        }

        let signed = self.signer.sign(&document.key, now)?;
        debug!(key = %document.key, "refreshed signed document url");
        document.url = signed.url;
        document.url_signed_at = signed.signed_at;
        document.url_expires_at = signed.expires_at;
        Ok(true)
    }

    /// Resolve a signed download link to the stored bytes.
    pub fn open(
        &self,
        key: &str,
        expires: i64,
        signature: &str,
        now: DateTime<Utc>,
    ) -> Result<StoredObject, DocumentError> {
        self.signer.verify(key, expires, signature, now)?;
        self.store
            .get(key)?
            .ok_or_else(|| DocumentError::NotFound(key.to_string()))
    }
}

fn validate_key(key: &str) -> Result<(), DocumentError> {
    let well_formed = !key.is_empty()
        && !key.starts_with('/')
        && !key.split('/').any(|segment| segment.is_empty() || segment == "..")
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '/' | '-' | '_' | '.'));

    if well_formed {
        Ok(())
    } else {
        Err(DocumentError::InvalidKey(key.to_string()))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    #[error("document signature is invalid")]
    InvalidSignature,
    #[error("document link has expired")]
    LinkExpired,
    #[error("document {0} not found")]
    NotFound(String),
    #[error("document key {0:?} is not allowed")]
    InvalidKey(String),
    #[error("unable to sign document url: {0}")]
    Signing(String),
    #[error("object storage unavailable: {0}")]
    Storage(String),
}

impl DocumentError {
    pub const fn code(&self) -> &'static str {
        match self {
            Self::InvalidSignature => "INVALID_SIGNATURE",
            Self::LinkExpired => "LINK_EXPIRED",
            Self::NotFound(_) => "DOCUMENT_NOT_FOUND",
            Self::InvalidKey(_) | Self::Signing(_) | Self::Storage(_) => "INTERNAL_ERROR",
        }
    }

    pub(crate) fn status(&self) -> StatusCode {
        match self {
            Self::InvalidSignature | Self::LinkExpired => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::InvalidKey(_) | Self::Signing(_) | Self::Storage(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for DocumentError {
    fn into_response(self) -> Response {
        error_response(self.status(), self.code(), self.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemoryObjectStore;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 7, 1, 0, 0, 0)
            .single()
            .expect("valid timestamp")
    }

    fn service() -> DocumentService {
        DocumentService::new(
            Arc::new(InMemoryObjectStore::default()),
            UrlSigner::new("secret", "http://localhost:3000"),
        )
    }

    #[test]
    fn save_rejects_traversal_keys() {
        let service = service();
        for key in ["../etc/passwd", "/abs", "a//b", "spaces are bad", ""] {
            assert!(
                matches!(
                    service.save(key, "text/plain", Vec::new(), now()),
                    Err(DocumentError::InvalidKey(_))
                ),
                "key {key:?} should be rejected"
            );
        }
    }

    #[test]
    fn refresh_is_a_no_op_for_recent_links() {
        let service = service();
        let mut document = service
            .save("invoices/1/RCD-INV-000001.txt", "text/plain", b"x".to_vec(), now())
            .expect("saved");
        let original = document.clone();

        assert!(!service
            .refresh(&mut document, now() + Duration::days(2))
            .expect("refresh"));
        assert_eq!(document, original);

        let later = now() + Duration::days(6) + Duration::hours(1);
        assert!(service.refresh(&mut document, later).expect("refresh"));
        assert_eq!(document.url_signed_at, later);
        assert_ne!(document.url, original.url);
    }

    #[test]
    fn open_returns_stored_bytes() {
        let service = service();
        let document = service
            .save("reports/x.csv", "text/csv", b"a,b\n".to_vec(), now())
            .expect("saved");
        let expires = document.url_expires_at.timestamp();
        let signature = document
            .url
            .rsplit_once("signature=")
            .expect("signature param")
            .1
            .to_string();

        let object = service
            .open("reports/x.csv", expires, &signature, now())
            .expect("opens");
        assert_eq!(object.bytes, b"a,b\n");
        assert_eq!(object.content_type, "text/csv");
    }
}
