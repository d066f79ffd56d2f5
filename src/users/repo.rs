use async_trait::async_trait;
use sqlx::PgPool;

use super::repo_types::{NewUser, UserChanges, UserRecord};
use crate::db::StoreError;

/// Persistence of one identity record per username/email.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn find_by_id(&self, id: i64) -> Result<Option<UserRecord>, StoreError>;
    async fn find_by_username(&self, username: &str) -> Result<Option<UserRecord>, StoreError>;
    /// Any user holding either the username or the email.
    async fn find_by_username_or_email(
        &self,
        username: &str,
        email: &str,
    ) -> Result<Option<UserRecord>, StoreError>;
    async fn list(&self) -> Result<Vec<UserRecord>, StoreError>;
    async fn insert(&self, user: &NewUser) -> Result<UserRecord, StoreError>;
    /// `Ok(None)` when no user has this id.
    async fn update(&self, id: i64, changes: &UserChanges) -> Result<Option<UserRecord>, StoreError>;
    /// `Ok(false)` when no user has this id.
    async fn delete(&self, id: i64) -> Result<bool, StoreError>;
}

const USER_COLUMNS: &str = "id, name, surname, username, email, password_hash, created_at, updated_at";

#[derive(Clone)]
pub struct PgUserStore {
    db: PgPool,
}

impl PgUserStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl CredentialStore for PgUserStore {
    async fn find_by_id(&self, id: i64) -> Result<Option<UserRecord>, StoreError> {
        let user = sqlx::query_as::<_, UserRecord>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<UserRecord>, StoreError> {
        let user = sqlx::query_as::<_, UserRecord>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username = $1"
        ))
        .bind(username)
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }

    async fn find_by_username_or_email(
        &self,
        username: &str,
        email: &str,
    ) -> Result<Option<UserRecord>, StoreError> {
        let user = sqlx::query_as::<_, UserRecord>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username = $1 OR email = $2 LIMIT 1"
        ))
        .bind(username)
        .bind(email)
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }

    async fn list(&self) -> Result<Vec<UserRecord>, StoreError> {
        let users = sqlx::query_as::<_, UserRecord>(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY id"
        ))
        .fetch_all(&self.db)
        .await?;
        Ok(users)
    }

    async fn insert(&self, user: &NewUser) -> Result<UserRecord, StoreError> {
        let user = sqlx::query_as::<_, UserRecord>(&format!(
            r#"
            INSERT INTO users (name, surname, username, email, password_hash)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(&user.name)
        .bind(&user.surname)
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .fetch_one(&self.db)
        .await?;
        Ok(user)
    }

    async fn update(&self, id: i64, changes: &UserChanges) -> Result<Option<UserRecord>, StoreError> {
        let user = sqlx::query_as::<_, UserRecord>(&format!(
            r#"
            UPDATE users
               SET name = COALESCE($2, name),
                   surname = COALESCE($3, surname),
                   username = COALESCE($4, username),
                   email = COALESCE($5, email),
                   updated_at = now()
             WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(changes.name.as_deref())
        .bind(changes.surname.as_deref())
        .bind(changes.username.as_deref())
        .bind(changes.email.as_deref())
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }

    async fn delete(&self, id: i64) -> Result<bool, StoreError> {
        let res = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;
        Ok(res.rows_affected() > 0)
    }
}
