/// Password Hashing and Verification
///
/// The hashing primitive sits behind `PasswordHasher` so the core only ever
/// sees `hash` and `verify`. `BcryptHasher` is the production implementation.

use std::sync::Arc;

use bcrypt::{hash, verify};

use crate::error::AuthError;

pub trait PasswordHasher: Send + Sync {
    /// Hash a plaintext password for storage
    fn hash(&self, plaintext: &str) -> Result<String, AuthError>;

    /// Check a plaintext password against a stored hash.
    ///
    /// A stored hash that cannot be parsed counts as a mismatch.
    fn verify(&self, plaintext: &str, hash: &str) -> bool;
}

#[derive(Debug, Clone)]
pub struct BcryptHasher {
    cost: u32,
}

impl BcryptHasher {
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }
}

impl PasswordHasher for BcryptHasher {
    fn hash(&self, plaintext: &str) -> Result<String, AuthError> {
        hash(plaintext, self.cost)
            .map_err(|e| AuthError::Internal(format!("Password hashing failed: {}", e)))
    }

    fn verify(&self, plaintext: &str, hash: &str) -> bool {
        verify(plaintext, hash).unwrap_or_else(|e| {
            tracing::error!(error = %e, "Stored password hash could not be verified");
            false
        })
    }
}

/// Hash on the blocking pool; bcrypt is deliberately slow.
pub async fn hash_blocking(
    hasher: Arc<dyn PasswordHasher>,
    plaintext: String,
) -> Result<String, AuthError> {
    tokio::task::spawn_blocking(move || hasher.hash(&plaintext))
        .await
        .map_err(|e| AuthError::Internal(format!("Hashing task failed: {}", e)))?
}

/// Verify on the blocking pool.
pub async fn verify_blocking(
    hasher: Arc<dyn PasswordHasher>,
    plaintext: String,
    hash: String,
) -> Result<bool, AuthError> {
    tokio::task::spawn_blocking(move || hasher.verify(&plaintext, &hash))
        .await
        .map_err(|e| AuthError::Internal(format!("Verification task failed: {}", e)))
}
