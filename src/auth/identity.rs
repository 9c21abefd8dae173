use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::store::Credential;

/// Authority granted to every account.
const DEFAULT_AUTHORITY: &str = "USER";

/// An authenticated principal: the username plus its granted authorities.
///
/// Produced by credential verification at sign-in and by token validation on
/// every later request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub username: String,
    pub authorities: BTreeSet<String>,
}

impl Identity {
    pub fn from_credential(credential: &Credential) -> Self {
        Self {
            username: credential.username.clone(),
            authorities: BTreeSet::from([DEFAULT_AUTHORITY.to_string()]),
        }
    }
}

/// Response returned by sign-in, sign-up and refresh.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResult {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    /// Access-token lifetime in whole seconds
    pub expires_in: i64,
}

impl AuthResult {
    pub fn bearer(access_token: String, refresh_token: String, expires_in: i64) -> Self {
        Self {
            access_token,
            refresh_token,
            token_type: "Bearer".to_string(),
            expires_in,
        }
    }
}
