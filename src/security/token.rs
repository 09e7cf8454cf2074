use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::error::AuthError;

type HmacSha256 = Hmac<Sha256>;

/// Signs and verifies session tokens.
///
/// A token is `b64url(email:password) + "." + b64url(hmac_sha256_tag)`. The
/// payload is signed, not encrypted, so a token holder can read the
/// credentials inside; tokens must be treated as secrets in transit.
pub struct SessionTokenCodec {
    secret: String,
}

/// Credentials recovered from a verified token.
#[derive(Debug, Clone, PartialEq)]
pub struct TokenClaims {
    pub email: String,
    pub password: String,
}

impl SessionTokenCodec {
    pub fn new(secret: impl Into<String>) -> Self {
        SessionTokenCodec {
            secret: secret.into(),
        }
    }

    /// Issue a token binding `email` and `password`.
    pub fn mint(&self, email: &str, password: &str) -> Result<String, AuthError> {
        let payload = format!("{}:{}", email, password);
        let tag = self.sign(payload.as_bytes())?;
        Ok(format!(
            "{}.{}",
            URL_SAFE_NO_PAD.encode(payload.as_bytes()),
            URL_SAFE_NO_PAD.encode(tag)
        ))
    }

    /// Verify `raw` and recover the credentials inside.
    ///
    /// Accepts an optional `Basic ` prefix so header values can be passed in
    /// verbatim. Every decode failure collapses to [`AuthError::MalformedToken`];
    /// callers cannot tell a forged signature from a garbled payload.
    pub fn decode(&self, raw: &str) -> Result<TokenClaims, AuthError> {
        let raw = raw.strip_prefix("Basic ").unwrap_or(raw);
        let (payload_b64, tag_b64) = raw.split_once('.').ok_or(AuthError::MalformedToken)?;
        let payload = URL_SAFE_NO_PAD
            .decode(payload_b64)
            .map_err(|_| AuthError::MalformedToken)?;
        let tag = URL_SAFE_NO_PAD
            .decode(tag_b64)
            .map_err(|_| AuthError::MalformedToken)?;

        let mut mac = HmacSha256::new_from_slice(self.secret.as_bytes())
            .map_err(|e| AuthError::Server(e.to_string()))?;
        mac.update(&payload);
        mac.verify_slice(&tag)
            .map_err(|_| AuthError::MalformedToken)?;

        let payload = String::from_utf8(payload).map_err(|_| AuthError::MalformedToken)?;
        // Split on the first colon only; passwords may contain ':'.
        let (email, password) = payload.split_once(':').ok_or(AuthError::MalformedToken)?;
        Ok(TokenClaims {
            email: email.to_string(),
            password: password.to_string(),
        })
    }

    fn sign(&self, payload: &[u8]) -> Result<Vec<u8>, AuthError> {
        let mut mac = HmacSha256::new_from_slice(self.secret.as_bytes())
            .map_err(|e| AuthError::Server(e.to_string()))?;
        mac.update(payload);
        Ok(mac.finalize().into_bytes().to_vec())
    }
}
