use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::error;

use crate::db::StoreError;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Unknown user and wrong password collapse into this one case.
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("{0}")]
    Conflict(String),
    #[error("User with ID {0} not found")]
    UserNotFound(i64),
    #[error("{kind} for user {owner_id} not found")]
    ContainerNotFound { kind: &'static str, owner_id: i64 },
    #[error("{0}")]
    Validation(String),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::UserNotFound(_) | AppError::ContainerNotFound { .. } => StatusCode::NOT_FOUND,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Store(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self, "request failed");
            return (status, "Internal server error".to_string()).into_response();
        }
        (status, self.to_string()).into_response()
    }
}
