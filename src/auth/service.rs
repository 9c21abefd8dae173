/// Auth Orchestrator
///
/// Composes credential verification, token issuance and token validation
/// into the four public operations: sign-in, sign-up, refresh and sign-out.
/// Every collaborator is handed in at construction; the service itself holds
/// no per-request state.

use std::sync::Arc;

use chrono::Utc;

use crate::auth::claims::TokenKind;
use crate::auth::credentials::CredentialVerifier;
use crate::auth::identity::{AuthResult, Identity};
use crate::auth::jwt::TokenCodec;
use crate::auth::password::{hash_blocking, PasswordHasher};
use crate::auth::validator::TokenValidator;
use crate::error::{AuthError, StoreError};
use crate::store::{Credential, CredentialStore, Profile, ProfileStore};
use crate::validators::{is_valid_password, is_valid_username, normalize_username};

pub struct AuthService {
    verifier: CredentialVerifier,
    codec: Arc<TokenCodec>,
    validator: TokenValidator,
    credentials: Arc<dyn CredentialStore>,
    profiles: Arc<dyn ProfileStore>,
    hasher: Arc<dyn PasswordHasher>,
}

impl AuthService {
    pub fn new(
        codec: TokenCodec,
        credentials: Arc<dyn CredentialStore>,
        profiles: Arc<dyn ProfileStore>,
        hasher: Arc<dyn PasswordHasher>,
    ) -> Result<Self, AuthError> {
        let codec = Arc::new(codec);
        let verifier = CredentialVerifier::new(Arc::clone(&credentials), Arc::clone(&hasher))?;
        let validator = TokenValidator::new(Arc::clone(&codec), Arc::clone(&credentials));

        Ok(Self {
            verifier,
            codec,
            validator,
            credentials,
            profiles,
            hasher,
        })
    }

    /// Verify credentials and issue a fresh token pair.
    ///
    /// The username is normalized the same way as at sign-up; the password is
    /// taken verbatim.
    ///
    /// # Errors
    /// - `InvalidCredentials` for an unknown username or a wrong password
    /// - `StoreUnavailable` if the credential store cannot be reached
    pub async fn sign_in(&self, username: &str, password: &str) -> Result<AuthResult, AuthError> {
        let identity = self
            .verifier
            .verify_credentials(normalize_username(username), password)
            .await?;
        let result = self.issue_pair(&identity, now())?;

        tracing::info!(username = %identity.username, "User signed in");
        Ok(result)
    }

    /// Register a new account and issue its first token pair.
    ///
    /// Creates one profile and one credential. If the credential cannot be
    /// stored the profile is deleted again, so a failed sign-up leaves
    /// nothing behind. Username uniqueness is decided by the store's insert;
    /// the up-front existence check only avoids needless hashing.
    ///
    /// # Errors
    /// - `Validation` for a malformed username or password
    /// - `UsernameTaken` if the username already exists
    /// - `StoreUnavailable` if a store cannot be reached
    pub async fn sign_up(&self, username: &str, password: &str) -> Result<AuthResult, AuthError> {
        let username = is_valid_username(username)?;
        is_valid_password(password)?;

        if self.credentials.exists_by_username(&username).await? {
            tracing::info!(username = %username, "Sign-up rejected: username taken");
            return Err(AuthError::UsernameTaken);
        }

        let password_hash = hash_blocking(Arc::clone(&self.hasher), password.to_string()).await?;

        let profile = self
            .profiles
            .save(Profile::placeholder(Utc::now().date_naive()))
            .await?;

        let credential = Credential {
            username,
            password_hash,
            user_id: profile.id,
        };
        let credential = match self.credentials.save(credential).await {
            Ok(credential) => credential,
            Err(e) => {
                self.discard_profile(&profile).await;
                if matches!(e, StoreError::Conflict(_)) {
                    tracing::info!("Sign-up lost a race for the same username");
                }
                return Err(e.into());
            }
        };

        let identity = Identity::from_credential(&credential);
        let result = self.issue_pair(&identity, now())?;

        tracing::info!(
            username = %identity.username,
            user_id = %credential.user_id,
            "User signed up"
        );
        Ok(result)
    }

    /// Exchange a refresh token for a new access and refresh token.
    ///
    /// The presented refresh token is not revoked; it stays valid until its
    /// own expiry.
    pub async fn refresh(&self, refresh_token: &str) -> Result<AuthResult, AuthError> {
        let now = now();
        let identity = self
            .validator
            .validate(refresh_token, TokenKind::Refresh, now)
            .await?;
        let result = self.issue_pair(&identity, now)?;

        tracing::info!(username = %identity.username, "Token refreshed");
        Ok(result)
    }

    /// Validate an access token for sign-out.
    ///
    /// No server-side state changes: without a denylist the token remains
    /// usable until it expires.
    pub async fn sign_out(&self, access_token: &str) -> Result<(), AuthError> {
        let identity = self
            .validator
            .validate(access_token, TokenKind::Access, now())
            .await?;

        tracing::info!(username = %identity.username, "User signed out");
        Ok(())
    }

    /// Resolve the identity behind an access token for a protected request.
    pub async fn authenticate(&self, access_token: &str) -> Result<Identity, AuthError> {
        self.validator
            .validate(access_token, TokenKind::Access, now())
            .await
    }

    pub fn codec(&self) -> &TokenCodec {
        &self.codec
    }

    fn issue_pair(&self, identity: &Identity, now: i64) -> Result<AuthResult, AuthError> {
        let access_token = self.codec.issue(identity, TokenKind::Access, now)?;
        let refresh_token = self.codec.issue(identity, TokenKind::Refresh, now)?;

        Ok(AuthResult::bearer(
            access_token,
            refresh_token,
            self.codec.access_ttl(),
        ))
    }

    async fn discard_profile(&self, profile: &Profile) {
        if let Err(e) = self.profiles.delete(profile.id).await {
            tracing::error!(
                profile_id = %profile.id,
                error = %e,
                "Failed to remove profile of aborted sign-up"
            );
        }
    }
}

fn now() -> i64 {
    Utc::now().timestamp()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::password::BcryptHasher;
    use crate::configuration::JwtSettings;
    use crate::error::TokenError;
    use crate::store::{InMemoryCredentialStore, InMemoryProfileStore};
    use async_trait::async_trait;
    use uuid::Uuid;

    struct Fixture {
        service: AuthService,
        credentials: Arc<InMemoryCredentialStore>,
        profiles: Arc<InMemoryProfileStore>,
    }

    fn jwt_settings() -> JwtSettings {
        JwtSettings {
            secret: "test-secret-key-at-least-32-characters-long".to_string(),
            access_token_expiry: 900,
            refresh_token_expiry: 604_800,
            issuer: "test".to_string(),
        }
    }

    fn fixture() -> Fixture {
        let credentials = Arc::new(InMemoryCredentialStore::new());
        let profiles = Arc::new(InMemoryProfileStore::new());
        let service = AuthService::new(
            TokenCodec::new(&jwt_settings()),
            credentials.clone(),
            profiles.clone(),
            Arc::new(BcryptHasher::new(4)),
        )
        .unwrap();

        Fixture {
            service,
            credentials,
            profiles,
        }
    }

    #[tokio::test]
    async fn test_example_scenario() {
        let f = fixture();

        let signed_up = f.service.sign_up("alice", "secret1").await.unwrap();
        assert!(!signed_up.access_token.is_empty());
        assert!(!signed_up.refresh_token.is_empty());
        assert_eq!(signed_up.token_type, "Bearer");
        assert_eq!(signed_up.expires_in, 900);

        let signed_in = f.service.sign_in("alice", "secret1").await.unwrap();
        assert!(matches!(
            f.service.sign_in("alice", "wrong").await,
            Err(AuthError::InvalidCredentials)
        ));

        let refreshed = f.service.refresh(&signed_in.refresh_token).await.unwrap();
        assert_ne!(refreshed.access_token, signed_in.access_token);
        assert_ne!(refreshed.refresh_token, signed_in.refresh_token);
    }

    #[tokio::test]
    async fn test_sign_in_issues_both_kinds() {
        let f = fixture();
        f.service.sign_up("alice", "secret1").await.unwrap();

        let result = f.service.sign_in("alice", "secret1").await.unwrap();
        let codec = f.service.codec();

        assert_eq!(codec.decode(&result.access_token).unwrap().kind, TokenKind::Access);
        assert_eq!(codec.decode(&result.refresh_token).unwrap().kind, TokenKind::Refresh);
    }

    #[tokio::test]
    async fn test_sign_in_failures_identical() {
        let f = fixture();
        f.service.sign_up("alice", "secret1").await.unwrap();

        let wrong_password = f.service.sign_in("alice", "wrong").await.unwrap_err();
        let unknown_user = f.service.sign_in("nobody", "secret1").await.unwrap_err();

        assert!(matches!(wrong_password, AuthError::InvalidCredentials));
        assert!(matches!(unknown_user, AuthError::InvalidCredentials));
        assert_eq!(wrong_password.to_string(), unknown_user.to_string());
    }

    #[tokio::test]
    async fn test_sign_up_creates_profile_and_credential() {
        let f = fixture();
        f.service.sign_up("alice", "secret1").await.unwrap();

        let credential = f.credentials.find_by_username("alice").await.unwrap().unwrap();
        let profile = f.profiles.get(credential.user_id).unwrap();

        assert_ne!(credential.password_hash, "secret1");
        assert_eq!(profile.first_name, "New");
        assert_eq!(profile.last_name, "User");
    }

    #[tokio::test]
    async fn test_sign_up_trims_username() {
        let f = fixture();
        f.service.sign_up("  alice ", "secret1").await.unwrap();

        assert!(f.service.sign_in("alice", "secret1").await.is_ok());
    }

    #[tokio::test]
    async fn test_sign_in_accepts_the_sign_up_spelling() {
        let f = fixture();
        f.service.sign_up("  alice ", "secret1").await.unwrap();

        let result = f.service.sign_in("  alice ", "secret1").await.unwrap();
        let claims = f.service.codec().decode(&result.access_token).unwrap();
        assert_eq!(claims.sub, "alice");

        assert!(matches!(
            f.service.sign_in("  alice ", " secret1").await,
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn test_duplicate_sign_up() {
        let f = fixture();
        f.service.sign_up("alice", "secret1").await.unwrap();

        let result = f.service.sign_up("alice", "other-password").await;
        assert!(matches!(result, Err(AuthError::UsernameTaken)));
        assert_eq!(f.profiles.len(), 1);
    }

    #[tokio::test]
    async fn test_sign_up_validation() {
        let f = fixture();

        assert!(matches!(
            f.service.sign_up("", "secret1").await,
            Err(AuthError::Validation(_))
        ));
        assert!(matches!(
            f.service.sign_up("alice", "").await,
            Err(AuthError::Validation(_))
        ));
        assert!(f.credentials.is_empty());
        assert!(f.profiles.is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_concurrent_sign_up_same_username() {
        let f = Arc::new(fixture());

        let a = {
            let f = Arc::clone(&f);
            tokio::spawn(async move { f.service.sign_up("alice", "secret1").await })
        };
        let b = {
            let f = Arc::clone(&f);
            tokio::spawn(async move { f.service.sign_up("alice", "secret2").await })
        };
        let results = [a.await.unwrap(), b.await.unwrap()];

        let successes = results.iter().filter(|r| r.is_ok()).count();
        let taken = results
            .iter()
            .filter(|r| matches!(r, Err(AuthError::UsernameTaken)))
            .count();
        assert_eq!(successes, 1);
        assert_eq!(taken, 1);
        assert_eq!(f.credentials.len(), 1);
        assert_eq!(f.profiles.len(), 1);
    }

    #[tokio::test]
    async fn test_refresh_rotation_keeps_old_token_valid() {
        let f = fixture();
        let original = f.service.sign_up("alice", "secret1").await.unwrap();

        let rotated = f.service.refresh(&original.refresh_token).await.unwrap();
        assert!(f.service.authenticate(&rotated.access_token).await.is_ok());
        assert!(f.service.refresh(&rotated.refresh_token).await.is_ok());

        let before = f.service.codec().decode(&original.refresh_token).unwrap();
        assert!(f.service.refresh(&original.refresh_token).await.is_ok());
        let after = f.service.codec().decode(&original.refresh_token).unwrap();
        assert_eq!(before.exp, after.exp);
    }

    #[tokio::test]
    async fn test_refresh_rejects_access_token() {
        let f = fixture();
        let tokens = f.service.sign_up("alice", "secret1").await.unwrap();

        assert!(matches!(
            f.service.refresh(&tokens.access_token).await,
            Err(AuthError::Token(TokenError::WrongKind { .. }))
        ));
    }

    #[tokio::test]
    async fn test_refresh_rejects_deleted_account() {
        let f = fixture();
        let tokens = f.service.sign_up("alice", "secret1").await.unwrap();
        f.credentials.remove("alice").unwrap();

        assert!(matches!(
            f.service.refresh(&tokens.refresh_token).await,
            Err(AuthError::Token(TokenError::UnknownSubject))
        ));
    }

    #[tokio::test]
    async fn test_sign_out() {
        let f = fixture();
        let tokens = f.service.sign_up("alice", "secret1").await.unwrap();

        assert!(f.service.sign_out(&tokens.access_token).await.is_ok());
        assert!(matches!(
            f.service.sign_out(&tokens.refresh_token).await,
            Err(AuthError::Token(TokenError::WrongKind { .. }))
        ));
        assert!(matches!(
            f.service.sign_out("garbage").await,
            Err(AuthError::Token(TokenError::Malformed))
        ));
        // No revocation: the access token still works afterwards.
        assert!(f.service.authenticate(&tokens.access_token).await.is_ok());
    }

    struct FailingCredentialStore;

    #[async_trait]
    impl CredentialStore for FailingCredentialStore {
        async fn find_by_username(&self, _: &str) -> Result<Option<Credential>, StoreError> {
            Ok(None)
        }

        async fn exists_by_username(&self, _: &str) -> Result<bool, StoreError> {
            Ok(false)
        }

        async fn save(&self, _: Credential) -> Result<Credential, StoreError> {
            Err(StoreError::Unavailable("connection reset".to_string()))
        }
    }

    #[tokio::test]
    async fn test_failed_credential_save_removes_profile() {
        let profiles = Arc::new(InMemoryProfileStore::new());
        let service = AuthService::new(
            TokenCodec::new(&jwt_settings()),
            Arc::new(FailingCredentialStore),
            profiles.clone(),
            Arc::new(BcryptHasher::new(4)),
        )
        .unwrap();

        let result = service.sign_up("alice", "secret1").await;

        assert!(matches!(result, Err(AuthError::StoreUnavailable(_))));
        assert!(profiles.is_empty());
    }

    #[tokio::test]
    async fn test_profile_ids_are_distinct() {
        let f = fixture();
        f.service.sign_up("alice", "secret1").await.unwrap();
        f.service.sign_up("bob", "secret2").await.unwrap();

        let alice = f.credentials.find_by_username("alice").await.unwrap().unwrap();
        let bob = f.credentials.find_by_username("bob").await.unwrap().unwrap();
        assert_ne!(alice.user_id, bob.user_id);
        assert_ne!(alice.user_id, Uuid::nil());
    }
}
