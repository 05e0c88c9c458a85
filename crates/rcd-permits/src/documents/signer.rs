//! HMAC-SHA256 signed download links.
//!
//! A link for `key` looks like
//! `{base_url}/documents/{key}?expires={unix_seconds}&signature={b64url}` where the
//! signature covers `{key}\n{expires}`.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use chrono::{DateTime, Duration, Utc};
use hmac::{Hmac, Mac};
use sha2::Sha256;

use super::service::DocumentError;

type HmacSha256 = Hmac<Sha256>;

/// Lifetime of a freshly signed link.
pub const SIGNED_URL_TTL_DAYS: i64 = 7;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedUrl {
    pub url: String,
    pub signed_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

#[derive(Clone)]
pub struct UrlSigner {
    secret: Vec<u8>,
    base_url: String,
    ttl: Duration,
}

impl UrlSigner {
    pub fn new(secret: impl AsRef<[u8]>, base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            secret: secret.as_ref().to_vec(),
            base_url: base_url.trim_end_matches('/').to_string(),
            ttl: Duration::days(SIGNED_URL_TTL_DAYS),
        }
    }

    pub fn sign(&self, key: &str, now: DateTime<Utc>) -> Result<SignedUrl, DocumentError> {
        let expires_at = now + self.ttl;
        let expires = expires_at.timestamp();
        let signature = URL_SAFE_NO_PAD.encode(self.mac(key, expires)?.finalize().into_bytes());

        Ok(SignedUrl {
            url: format!(
                "{}/documents/{}?expires={}&signature={}",
                self.base_url, key, expires, signature
            ),
            signed_at: now,
            expires_at,
        })
    }

    /// Check the signature first so expiry is never reported for forged links.
    pub fn verify(
        &self,
        key: &str,
        expires: i64,
        signature: &str,
        now: DateTime<Utc>,
    ) -> Result<(), DocumentError> {
        let provided = URL_SAFE_NO_PAD
            .decode(signature)
            .map_err(|_| DocumentError::InvalidSignature)?;

        self.mac(key, expires)?
            .verify_slice(&provided)
            .map_err(|_| DocumentError::InvalidSignature)?;

        if now.timestamp() > expires {
            return Err(DocumentError::LinkExpired);
        }
        Ok(())
    }

    fn mac(&self, key: &str, expires: i64) -> Result<HmacSha256, DocumentError> {
        let mut mac = HmacSha256::new_from_slice(&self.secret)
            .map_err(|err| DocumentError::Signing(err.to_string()))?;
        mac.update(key.as_bytes());
        mac.update(b"\n");
        mac.update(expires.to_string().as_bytes());
        Ok(mac)
    }
}
