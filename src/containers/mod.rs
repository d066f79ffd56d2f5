//! Per-user singleton containers.
//!
//! Every owner has at most one container row per kind, holding an ordered
//! list of items plus an optional kind-specific scalar. Tasks and profiles
//! share this machinery and differ only in their [`ContainerKind`].

use std::fmt::Debug;

use serde::{de::DeserializeOwned, Serialize};
use time::OffsetDateTime;

pub mod repo;
pub mod upsert;

pub use upsert::UpsertCoordinator;

/// Describes one container kind: its storage layout, default-fill policy
/// and response shape.
pub trait ContainerKind: Send + Sync + 'static {
    /// Used in logs and not-found messages.
    const NAME: &'static str;
    const TABLE: &'static str;
    const PAYLOAD_COLUMN: &'static str;
    const EXTRA_COLUMN: Option<&'static str>;

    /// Item as stored. Fields may be absent after a partial merge.
    type Item: Serialize + DeserializeOwned + Clone + Debug + Send + Sync + 'static;
    type View: Serialize + Send;

    /// Insert-path default fill for items written through the update shape.
    fn fill_defaults(items: Option<Vec<Self::Item>>) -> Vec<Self::Item>;

    /// Insert-path default for the extra scalar.
    fn default_extra(extra: Option<i32>) -> Option<i32>;

    fn shape(container: Container<Self::Item>) -> Self::View;
}

#[derive(Debug, Clone)]
pub struct Container<T> {
    pub id: i64,
    pub owner_id: i64,
    pub items: Vec<T>,
    pub extra: Option<i32>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

/// A write against a container. `None` fields leave the stored value as is
/// on the merge path.
#[derive(Debug, Clone)]
pub struct ContainerChanges<T> {
    pub items: Option<Vec<T>>,
    pub extra: Option<i32>,
}
