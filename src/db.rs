use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};

/// Failures surfaced by the persistence layer.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A unique constraint rejected the write (duplicate username/email,
    /// or a second container row for the same owner).
    #[error("unique constraint violated")]
    UniqueViolation,
    #[error(transparent)]
    Database(sqlx::Error),
    #[error("malformed stored payload: {0}")]
    Payload(#[from] serde_json::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        let unique = e
            .as_database_error()
            .map(|d| d.is_unique_violation())
            .unwrap_or(false);
        if unique {
            StoreError::UniqueViolation
        } else {
            StoreError::Database(e)
        }
    }
}

pub async fn connect(database_url: &str) -> anyhow::Result<PgPool> {
    PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await
        .context("connect to database")
}
