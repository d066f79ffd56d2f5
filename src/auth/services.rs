use std::sync::Arc;

use axum::extract::FromRef;
use tracing::{error, info, warn};

use super::{jwt::JwtKeys, password::PasswordHasher};
use crate::{
    error::{AppError, AppResult},
    state::AppState,
    users::{repo::CredentialStore, repo_types::User},
};

/// Credential check and token issuance.
#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn CredentialStore>,
    hasher: PasswordHasher,
    keys: JwtKeys,
}

impl FromRef<AppState> for AuthService {
    fn from_ref(state: &AppState) -> Self {
        Self::new(
            state.users.clone(),
            state.hasher.clone(),
            JwtKeys::from_ref(state),
        )
    }
}

impl AuthService {
    pub fn new(users: Arc<dyn CredentialStore>, hasher: PasswordHasher, keys: JwtKeys) -> Self {
        Self {
            users,
            hasher,
            keys,
        }
    }

    /// Returns the user with the digest stripped, or `None` when the
    /// username is unknown or the password does not match.
    pub async fn validate_credential(&self, username: &str, password: &str) -> AppResult<Option<User>> {
        let Some(record) = self.users.find_by_username(username).await? else {
            self.hasher.verify_dummy_blocking(password.to_owned()).await?;
            warn!(username, "login unknown username");
            return Ok(None);
        };

        let ok = self
            .hasher
            .verify_blocking(password.to_owned(), record.password_hash.clone())
            .await?;
        if !ok {
            warn!(username, user_id = record.id, "login invalid password");
            return Ok(None);
        }
        Ok(Some(record.into()))
    }

    pub async fn login(&self, username: &str, password: &str) -> AppResult<(String, User)> {
        let user = self
            .validate_credential(username, password)
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        let token = self.keys.sign(&user).map_err(|e| {
            error!(error = %e, "jwt sign failed");
            AppError::Internal(e)
        })?;

        info!(user_id = user.id, username = %user.username, "user logged in");
        Ok((token, user))
    }
}
