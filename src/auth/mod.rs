/// Authentication module
///
/// Token lifecycle engine: credential verification, token issuance,
/// token validation and the orchestrating `AuthService`.

mod claims;
mod credentials;
mod identity;
mod jwt;
mod password;
mod service;
mod validator;

pub use claims::{Claims, TokenKind};
pub use credentials::CredentialVerifier;
pub use identity::{AuthResult, Identity};
pub use jwt::TokenCodec;
pub use password::{hash_blocking, verify_blocking, BcryptHasher, PasswordHasher};
pub use service::AuthService;
pub use validator::TokenValidator;
