/// Postgres-backed stores
///
/// Uniqueness of `logins.username` is enforced by the database, so
/// concurrent sign-ups for the same name cannot both succeed.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use super::{Credential, CredentialStore, Profile, ProfileStore};
use crate::error::StoreError;

#[derive(Clone, Debug)]
pub struct PgCredentialStore {
    pool: PgPool,
}

impl PgCredentialStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CredentialStore for PgCredentialStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<Credential>, StoreError> {
        let row = sqlx::query_as::<_, (String, String, Uuid)>(
            "SELECT username, password_hash, user_id FROM logins WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|(username, password_hash, user_id)| Credential {
            username,
            password_hash,
            user_id,
        }))
    }

    async fn exists_by_username(&self, username: &str) -> Result<bool, StoreError> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM logins WHERE username = $1)",
        )
        .bind(username)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    async fn save(&self, credential: Credential) -> Result<Credential, StoreError> {
        sqlx::query(
            r#"
            INSERT INTO logins (username, password_hash, user_id, created_at)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(&credential.username)
        .bind(&credential.password_hash)
        .bind(credential.user_id)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(credential)
    }
}

#[derive(Clone, Debug)]
pub struct PgProfileStore {
    pool: PgPool,
}

impl PgProfileStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProfileStore for PgProfileStore {
    async fn save(&self, profile: Profile) -> Result<Profile, StoreError> {
        sqlx::query(
            r#"
            INSERT INTO profiles (id, first_name, last_name, age, birthday, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(profile.id)
        .bind(&profile.first_name)
        .bind(&profile.last_name)
        .bind(profile.age)
        .bind(profile.birthday)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(profile)
    }

    async fn delete(&self, id: Uuid) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM profiles WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(format!("profile {}", id)));
        }
        Ok(())
    }
}
