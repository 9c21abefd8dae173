/// Credential Verification
///
/// Checks a username/password pair against the stored bcrypt hash. An unknown
/// username and a wrong password produce the same error, the same log line
/// and the same amount of hashing work.

use std::sync::Arc;

use crate::auth::identity::Identity;
use crate::auth::password::{verify_blocking, PasswordHasher};
use crate::error::AuthError;
use crate::store::CredentialStore;

const DECOY_PASSWORD: &str = "decoy-password-for-unknown-users";

pub struct CredentialVerifier {
    store: Arc<dyn CredentialStore>,
    hasher: Arc<dyn PasswordHasher>,
    /// Hash checked when the username does not exist
    decoy_hash: String,
}

impl CredentialVerifier {
    /// Build a verifier. Computes one hash up front for the decoy.
    pub fn new(
        store: Arc<dyn CredentialStore>,
        hasher: Arc<dyn PasswordHasher>,
    ) -> Result<Self, AuthError> {
        let decoy_hash = hasher.hash(DECOY_PASSWORD)?;
        Ok(Self {
            store,
            hasher,
            decoy_hash,
        })
    }

    pub async fn verify_credentials(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Identity, AuthError> {
        let credential = self.store.find_by_username(username).await?;

        let stored_hash = credential
            .as_ref()
            .map(|c| c.password_hash.clone())
            .unwrap_or_else(|| self.decoy_hash.clone());
        let matches = verify_blocking(
            Arc::clone(&self.hasher),
            password.to_string(),
            stored_hash,
        )
        .await?;

        match credential {
            Some(credential) if matches => Ok(Identity::from_credential(&credential)),
            _ => {
                tracing::info!(username = %username, "Credential verification failed");
                Err(AuthError::InvalidCredentials)
            }
        }
    }
}
