use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Signed links are re-issued on read once they are older than this.
pub const SIGNED_URL_REFRESH_AFTER_DAYS: i64 = 6;

/// A stored object plus the signed link handed out for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredDocument {
    pub key: String,
    pub content_type: String,
    pub url: String,
    pub url_signed_at: DateTime<Utc>,
    pub url_expires_at: DateTime<Utc>,
}

impl StoredDocument {
    pub fn needs_refresh(&self, now: DateTime<Utc>) -> bool {
        now.signed_duration_since(self.url_signed_at)
            > Duration::days(SIGNED_URL_REFRESH_AFTER_DAYS)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invoice {
    pub invoice_number: u64,
    pub document: StoredDocument,
    pub created_at: DateTime<Utc>,
}

impl Invoice {
    pub fn display_number(&self) -> String {
        format!("RCD-INV-{:06}", self.invoice_number)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletCard {
    pub document: StoredDocument,
    /// Expiry printed on the card; the permit issued at completion carries the same date.
    pub permit_expiry_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

/// Raw bytes held by an [`ObjectStore`](super::ObjectStore).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub key: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn refresh_happens_only_after_six_days() {
        let signed_at = Utc
            .with_ymd_and_hms(2026, 1, 1, 8, 0, 0)
            .single()
            .expect("valid timestamp");
        let document = StoredDocument {
            key: "invoices/1/RCD-INV-000001.txt".to_string(),
            content_type: "text/plain".to_string(),
            url: "http://localhost/documents/invoices/1/RCD-INV-000001.txt".to_string(),
            url_signed_at: signed_at,
            url_expires_at: signed_at + Duration::days(7),
        };

        assert!(!document.needs_refresh(signed_at + Duration::days(6)));
        assert!(document.needs_refresh(signed_at + Duration::days(6) + Duration::seconds(1)));
    }
}
