/// Token claims
///
/// The signed payload of every token: subject, kind and second-precision
/// timestamps, plus the standard issuer and token-id claims (RFC 7519).

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AuthError;

/// Distinguishes short-lived access tokens from long-lived refresh tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    Access,
    Refresh,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Access => write!(f, "access"),
            TokenKind::Refresh => write!(f, "refresh"),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    /// Subject (username)
    pub sub: String,
    /// Token kind
    #[serde(rename = "typ")]
    pub kind: TokenKind,
    /// Issued at (Unix timestamp, seconds)
    pub iat: i64,
    /// Expiration time (Unix timestamp, seconds)
    pub exp: i64,
    pub iss: String,
    /// Unique token id; two tokens issued in the same second still differ
    pub jti: String,
}

impl Claims {
    /// Build claims for `subject` valid from `now` for `lifetime_seconds`.
    ///
    /// # Errors
    /// Returns `Internal` if the expiry does not fit in an `i64`
    pub fn new(
        subject: &str,
        kind: TokenKind,
        now: i64,
        lifetime_seconds: i64,
        issuer: &str,
    ) -> Result<Self, AuthError> {
        let exp = now.checked_add(lifetime_seconds).ok_or_else(|| {
            AuthError::Internal(format!(
                "{} token lifetime of {}s overflows the expiry timestamp",
                kind, lifetime_seconds
            ))
        })?;

        Ok(Self {
            sub: subject.to_string(),
            kind,
            iat: now,
            exp,
            iss: issuer.to_string(),
            jti: Uuid::new_v4().to_string(),
        })
    }

    /// A token is still valid at the exact second it expires.
    pub fn is_expired_at(&self, now: i64) -> bool {
        now > self.exp
    }
}
