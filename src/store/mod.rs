/// Credential and profile storage ports
///
/// The auth core owns no durable state. It talks to these two stores, which
/// are implemented over Postgres for production and in memory for tests.

mod memory;
mod postgres;

use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

use crate::error::StoreError;

pub use memory::{InMemoryCredentialStore, InMemoryProfileStore};
pub use postgres::{PgCredentialStore, PgProfileStore};

/// Login credentials; `username` is unique across the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credential {
    pub username: String,
    pub password_hash: String,
    /// Owning profile
    pub user_id: Uuid,
}

/// Minimal user profile created alongside a credential at sign-up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub age: i32,
    pub birthday: NaiveDate,
}

impl Profile {
    /// Profile every new account starts with until the user edits it.
    pub fn placeholder(today: NaiveDate) -> Self {
        Self {
            id: Uuid::new_v4(),
            first_name: "New".to_string(),
            last_name: "User".to_string(),
            age: 25,
            birthday: today,
        }
    }
}

#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn find_by_username(&self, username: &str) -> Result<Option<Credential>, StoreError>;

    async fn exists_by_username(&self, username: &str) -> Result<bool, StoreError>;

    /// Persist a new credential.
    ///
    /// Must fail with `StoreError::Conflict` when the username is already
    /// taken, atomically with the insert.
    async fn save(&self, credential: Credential) -> Result<Credential, StoreError>;
}

#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn save(&self, profile: Profile) -> Result<Profile, StoreError>;

    /// Remove a profile; used to undo a half-finished sign-up.
    async fn delete(&self, id: Uuid) -> Result<(), StoreError>;
}
