use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use uuid::Uuid;

use super::{Credential, CredentialStore, Profile, ProfileStore};
use crate::error::StoreError;

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>, StoreError> {
    mutex
        .lock()
        .map_err(|_| StoreError::Unavailable("in-memory store lock poisoned".to_string()))
}

/// Credentials keyed by username.
#[derive(Debug, Default)]
pub struct InMemoryCredentialStore {
    credentials: Mutex<HashMap<String, Credential>>,
}

impl InMemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop a credential, as an account deletion in the profile service would.
    pub fn remove(&self, username: &str) -> Result<Option<Credential>, StoreError> {
        Ok(lock(&self.credentials)?.remove(username))
    }

    pub fn len(&self) -> usize {
        lock(&self.credentials).map(|map| map.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl CredentialStore for InMemoryCredentialStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<Credential>, StoreError> {
        Ok(lock(&self.credentials)?.get(username).cloned())
    }

    async fn exists_by_username(&self, username: &str) -> Result<bool, StoreError> {
        Ok(lock(&self.credentials)?.contains_key(username))
    }

    async fn save(&self, credential: Credential) -> Result<Credential, StoreError> {
        let mut credentials = lock(&self.credentials)?;
        match credentials.entry(credential.username.clone()) {
            Entry::Occupied(_) => Err(StoreError::Conflict("username".to_string())),
            Entry::Vacant(slot) => Ok(slot.insert(credential).clone()),
        }
    }
}

#[derive(Debug, Default)]
pub struct InMemoryProfileStore {
    profiles: Mutex<HashMap<Uuid, Profile>>,
}

impl InMemoryProfileStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: Uuid) -> Option<Profile> {
        lock(&self.profiles).ok()?.get(&id).cloned()
    }

    pub fn len(&self) -> usize {
        lock(&self.profiles).map(|map| map.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl ProfileStore for InMemoryProfileStore {
    async fn save(&self, profile: Profile) -> Result<Profile, StoreError> {
        lock(&self.profiles)?.insert(profile.id, profile.clone());
        Ok(profile)
    }

    async fn delete(&self, id: Uuid) -> Result<(), StoreError> {
        lock(&self.profiles)?
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound(format!("profile {}", id)))
    }
}
