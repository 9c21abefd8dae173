/// JWT Token Codec
///
/// Signs and parses HS256 tokens. One key, loaded at startup, is shared
/// read-only by every request.

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};

use crate::auth::claims::{Claims, TokenKind};
use crate::auth::identity::Identity;
use crate::configuration::JwtSettings;
use crate::error::{AuthError, TokenError};

#[derive(Clone)]
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    issuer: String,
    access_ttl: i64,
    refresh_ttl: i64,
}

impl TokenCodec {
    pub fn new(config: &JwtSettings) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&config.issuer]);
        validation.set_required_spec_claims(&["exp", "iat", "iss", "sub"]);
        // Expiry is checked against the caller's clock in `parse`.
        validation.validate_exp = false;
        validation.leeway = 0;

        Self {
            encoding_key: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.secret.as_bytes()),
            validation,
            issuer: config.issuer.clone(),
            access_ttl: config.access_token_expiry,
            refresh_ttl: config.refresh_token_expiry,
        }
    }

    /// Access-token lifetime in seconds; reported to clients as `expires_in`.
    pub fn access_ttl(&self) -> i64 {
        self.access_ttl
    }

    pub fn ttl(&self, kind: TokenKind) -> i64 {
        match kind {
            TokenKind::Access => self.access_ttl,
            TokenKind::Refresh => self.refresh_ttl,
        }
    }

    /// Issue a signed token of `kind` for `identity`, valid from `now`.
    ///
    /// # Errors
    /// Returns `Internal` if the expiry overflows or signing fails
    pub fn issue(&self, identity: &Identity, kind: TokenKind, now: i64) -> Result<String, AuthError> {
        let claims = Claims::new(&identity.username, kind, now, self.ttl(kind), &self.issuer)?;

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AuthError::Internal(format!("Token generation failed: {}", e)))
    }

    /// Verify signature, structure and issuer without looking at the clock.
    pub fn decode(&self, token: &str) -> Result<Claims, TokenError> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| {
                tracing::debug!(error = %e, "JWT decode failed");
                TokenError::Malformed
            })
    }

    /// Decode and reject tokens expired at `now`.
    pub fn parse(&self, token: &str, now: i64) -> Result<Claims, TokenError> {
        let claims = self.decode(token)?;
        if claims.is_expired_at(now) {
            return Err(TokenError::Expired);
        }
        Ok(claims)
    }
}
