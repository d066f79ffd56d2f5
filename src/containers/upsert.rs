use std::sync::Arc;

use tracing::{debug, info, warn};

use super::{repo::ContainerRepository, Container, ContainerChanges, ContainerKind};
use crate::{
    db::StoreError,
    error::{AppError, AppResult},
};

/// Create-or-update over a [`ContainerRepository`].
///
/// Defaults are filled only on the insert path. Once a container exists,
/// every write replaces the stored list with exactly what the caller sent.
pub struct UpsertCoordinator<K: ContainerKind> {
    repo: Arc<dyn ContainerRepository<K>>,
}

impl<K: ContainerKind> Clone for UpsertCoordinator<K> {
    fn clone(&self) -> Self {
        Self {
            repo: self.repo.clone(),
        }
    }
}

impl<K: ContainerKind> UpsertCoordinator<K> {
    pub fn new(repo: Arc<dyn ContainerRepository<K>>) -> Self {
        Self { repo }
    }

    /// Explicit insert. Fails with `Conflict` when the owner already has a container.
    pub async fn create(&self, owner_id: i64, items: Vec<K::Item>, extra: Option<i32>) -> AppResult<K::View> {
        let extra = K::default_extra(extra);
        let container = self
            .repo
            .insert(owner_id, &items, extra)
            .await
            .map_err(|e| match e {
                StoreError::UniqueViolation => {
                    AppError::Conflict(format!("{} for user {} already exist", K::NAME, owner_id))
                }
                other => other.into(),
            })?;
        info!(kind = K::NAME, owner_id, "container created");
        Ok(K::shape(container))
    }

    /// Absent is not an error here.
    pub async fn get(&self, owner_id: i64) -> AppResult<Option<K::View>> {
        Ok(self.repo.find_by_owner(owner_id).await?.map(K::shape))
    }

    /// Merge path only.
    pub async fn update(&self, owner_id: i64, changes: &ContainerChanges<K::Item>) -> AppResult<K::View> {
        let touched = self
            .repo
            .update_by_owner(owner_id, changes.items.as_deref(), changes.extra)
            .await?;
        if touched == 0 {
            return Err(self.not_found(owner_id));
        }
        let container = self
            .repo
            .find_by_owner(owner_id)
            .await?
            .ok_or_else(|| self.not_found(owner_id))?;
        debug!(kind = K::NAME, owner_id, "container updated");
        Ok(K::shape(container))
    }

    /// Inserts with defaults when absent, merges when present.
    ///
    /// Find-then-insert is not atomic. When a concurrent writer wins the
    /// insert, the storage uniqueness constraint rejects ours and the write
    /// is retried once as a merge.
    pub async fn upsert(&self, owner_id: i64, changes: ContainerChanges<K::Item>) -> AppResult<K::View> {
        if self.repo.find_by_owner(owner_id).await?.is_some() {
            return self.update(owner_id, &changes).await;
        }

        match self.insert_with_defaults(owner_id, &changes).await {
            Ok(container) => {
                info!(kind = K::NAME, owner_id, "container created by upsert");
                Ok(K::shape(container))
            }
            Err(StoreError::UniqueViolation) => {
                warn!(kind = K::NAME, owner_id, "lost insert race; merging instead");
                self.update(owner_id, &changes).await
            }
            Err(e) => Err(e.into()),
        }
    }

    pub async fn remove(&self, owner_id: i64) -> AppResult<()> {
        if self.repo.delete_by_owner(owner_id).await? == 0 {
            return Err(self.not_found(owner_id));
        }
        info!(kind = K::NAME, owner_id, "container removed");
        Ok(())
    }

    async fn insert_with_defaults(
        &self,
        owner_id: i64,
        changes: &ContainerChanges<K::Item>,
    ) -> Result<Container<K::Item>, StoreError> {
        let items = K::fill_defaults(changes.items.clone());
        let extra = K::default_extra(changes.extra);
        self.repo.insert(owner_id, &items, extra).await
    }

    fn not_found(&self, owner_id: i64) -> AppError {
        AppError::ContainerNotFound {
            kind: K::NAME,
            owner_id,
        }
    }
}
