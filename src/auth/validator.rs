use std::sync::Arc;

use crate::auth::claims::TokenKind;
use crate::auth::identity::Identity;
use crate::auth::jwt::TokenCodec;
use crate::error::{AuthError, TokenError};
use crate::store::CredentialStore;

/// Validates presented tokens and re-resolves their subject.
///
/// Checks run in this order: signature and structure, kind, expiry, and
/// finally a fresh lookup of the account, so a token outliving its account
/// is rejected even while its signature and expiry are still good.
pub struct TokenValidator {
    codec: Arc<TokenCodec>,
    store: Arc<dyn CredentialStore>,
}

impl TokenValidator {
    pub fn new(codec: Arc<TokenCodec>, store: Arc<dyn CredentialStore>) -> Self {
        Self { codec, store }
    }

    pub async fn validate(
        &self,
        token: &str,
        expected_kind: TokenKind,
        now: i64,
    ) -> Result<Identity, AuthError> {
        let claims = self.codec.decode(token)?;

        if claims.kind != expected_kind {
            return Err(TokenError::WrongKind {
                expected: expected_kind,
                found: claims.kind,
            }
            .into());
        }

        if claims.is_expired_at(now) {
            return Err(TokenError::Expired.into());
        }

        match self.store.find_by_username(&claims.sub).await? {
            Some(credential) => Ok(Identity::from_credential(&credential)),
            None => Err(TokenError::UnknownSubject.into()),
        }
    }
}
