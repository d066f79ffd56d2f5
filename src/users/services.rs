use std::sync::Arc;

use axum::extract::FromRef;
use tracing::{info, warn};

use super::{
    dto::CreateUserRequest,
    repo::CredentialStore,
    repo_types::{NewUser, User, UserChanges},
};
use crate::{
    auth::password::PasswordHasher,
    db::StoreError,
    error::{AppError, AppResult},
    state::AppState,
};

const DUPLICATE_USER: &str = "Username or email already exists";

/// Registration and profile management on top of the credential store.
#[derive(Clone)]
pub struct UserService {
    store: Arc<dyn CredentialStore>,
    hasher: PasswordHasher,
}

impl FromRef<AppState> for UserService {
    fn from_ref(state: &AppState) -> Self {
        Self::new(state.users.clone(), state.hasher.clone())
    }
}

impl UserService {
    pub fn new(store: Arc<dyn CredentialStore>, hasher: PasswordHasher) -> Self {
        Self { store, hasher }
    }

    /// Expects a request that already passed [`CreateUserRequest::validate`].
    pub async fn register(&self, req: CreateUserRequest) -> AppResult<User> {
        if self
            .store
            .find_by_username_or_email(&req.username, &req.email)
            .await?
            .is_some()
        {
            warn!(username = %req.username, "username or email already registered");
            return Err(AppError::Conflict(DUPLICATE_USER.into()));
        }

        let password_hash = self.hasher.hash_blocking(req.password).await?;
        let new_user = NewUser {
            name: req.name,
            surname: req.surname,
            username: req.username,
            email: req.email,
            password_hash,
        };

        // The pre-check can race with a concurrent registration; the schema decides.
        let user = self.store.insert(&new_user).await.map_err(duplicate_as_conflict)?;
        info!(user_id = user.id, username = %user.username, "user registered");
        Ok(user.into())
    }

    pub async fn list(&self) -> AppResult<Vec<User>> {
        let users = self.store.list().await?;
        Ok(users.into_iter().map(User::from).collect())
    }

    pub async fn get(&self, id: i64) -> AppResult<User> {
        self.store
            .find_by_id(id)
            .await?
            .map(User::from)
            .ok_or(AppError::UserNotFound(id))
    }

    pub async fn update(&self, id: i64, changes: UserChanges) -> AppResult<User> {
        let user = self
            .store
            .update(id, &changes)
            .await
            .map_err(duplicate_as_conflict)?
            .ok_or(AppError::UserNotFound(id))?;
        info!(user_id = id, "user updated");
        Ok(user.into())
    }

    pub async fn remove(&self, id: i64) -> AppResult<()> {
        if !self.store.delete(id).await? {
            return Err(AppError::UserNotFound(id));
        }
        info!(user_id = id, "user deleted");
        Ok(())
    }
}

fn duplicate_as_conflict(e: StoreError) -> AppError {
    match e {
        StoreError::UniqueViolation => AppError::Conflict(DUPLICATE_USER.into()),
        other => other.into(),
    }
}
