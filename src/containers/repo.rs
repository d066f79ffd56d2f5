use std::marker::PhantomData;

use async_trait::async_trait;
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;

use super::{Container, ContainerKind};
use crate::db::StoreError;

/// Storage for zero-or-one container row per owner.
///
/// Implementations must reject a second row for the same owner with
/// [`StoreError::UniqueViolation`].
#[async_trait]
pub trait ContainerRepository<K: ContainerKind>: Send + Sync {
    async fn find_by_owner(&self, owner_id: i64) -> Result<Option<Container<K::Item>>, StoreError>;
    async fn insert(
        &self,
        owner_id: i64,
        items: &[K::Item],
        extra: Option<i32>,
    ) -> Result<Container<K::Item>, StoreError>;
    /// Returns the number of rows touched. `None` arguments keep the stored value.
    async fn update_by_owner(
        &self,
        owner_id: i64,
        items: Option<&[K::Item]>,
        extra: Option<i32>,
    ) -> Result<u64, StoreError>;
    async fn delete_by_owner(&self, owner_id: i64) -> Result<u64, StoreError>;
}

#[derive(Debug, FromRow)]
struct ContainerRow {
    id: i64,
    user_id: i64,
    payload: serde_json::Value,
    extra: Option<i32>,
    created_at: OffsetDateTime,
    updated_at: OffsetDateTime,
}

impl ContainerRow {
    fn decode<T: serde::de::DeserializeOwned>(self) -> Result<Container<T>, StoreError> {
        Ok(Container {
            id: self.id,
            owner_id: self.user_id,
            items: serde_json::from_value(self.payload)?,
            extra: self.extra,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// One JSONB column per kind holds the item list.
pub struct PgContainerRepository<K> {
    db: PgPool,
    _kind: PhantomData<fn() -> K>,
}

impl<K: ContainerKind> PgContainerRepository<K> {
    pub fn new(db: PgPool) -> Self {
        Self {
            db,
            _kind: PhantomData,
        }
    }

    fn returning() -> String {
        format!(
            "id, user_id, {payload} AS payload, {extra} AS extra, created_at, updated_at",
            payload = K::PAYLOAD_COLUMN,
            extra = K::EXTRA_COLUMN.unwrap_or("NULL::INT4"),
        )
    }
}

#[async_trait]
impl<K: ContainerKind> ContainerRepository<K> for PgContainerRepository<K> {
    async fn find_by_owner(&self, owner_id: i64) -> Result<Option<Container<K::Item>>, StoreError> {
        let sql = format!(
            "SELECT {cols} FROM {table} WHERE user_id = $1",
            cols = Self::returning(),
            table = K::TABLE,
        );
        let row = sqlx::query_as::<_, ContainerRow>(&sql)
            .bind(owner_id)
            .fetch_optional(&self.db)
            .await?;
        row.map(ContainerRow::decode::<K::Item>).transpose()
    }

    async fn insert(
        &self,
        owner_id: i64,
        items: &[K::Item],
        extra: Option<i32>,
    ) -> Result<Container<K::Item>, StoreError> {
        let payload = serde_json::to_value(items)?;
        let row = match K::EXTRA_COLUMN {
            Some(extra_col) => {
                let sql = format!(
                    "INSERT INTO {table} (user_id, {payload_col}, {extra_col}) VALUES ($1, $2, $3) RETURNING {cols}",
                    table = K::TABLE,
                    payload_col = K::PAYLOAD_COLUMN,
                    cols = Self::returning(),
                );
                sqlx::query_as::<_, ContainerRow>(&sql)
                    .bind(owner_id)
                    .bind(payload)
                    .bind(extra)
                    .fetch_one(&self.db)
                    .await?
            }
            None => {
                let sql = format!(
                    "INSERT INTO {table} (user_id, {payload_col}) VALUES ($1, $2) RETURNING {cols}",
                    table = K::TABLE,
                    payload_col = K::PAYLOAD_COLUMN,
                    cols = Self::returning(),
                );
                sqlx::query_as::<_, ContainerRow>(&sql)
                    .bind(owner_id)
                    .bind(payload)
                    .fetch_one(&self.db)
                    .await?
            }
        };
        row.decode()
    }

    async fn update_by_owner(
        &self,
        owner_id: i64,
        items: Option<&[K::Item]>,
        extra: Option<i32>,
    ) -> Result<u64, StoreError> {
        let payload = items.map(serde_json::to_value).transpose()?;
        let payload_col = K::PAYLOAD_COLUMN;
        let res = match K::EXTRA_COLUMN {
            Some(extra_col) => {
                let sql = format!(
                    r#"
                    UPDATE {table}
                       SET {payload_col} = COALESCE($2, {payload_col}),
                           {extra_col} = COALESCE($3, {extra_col}),
                           updated_at = now()
                     WHERE user_id = $1
                    "#,
                    table = K::TABLE,
                );
                sqlx::query(&sql)
                    .bind(owner_id)
                    .bind(payload)
                    .bind(extra)
                    .execute(&self.db)
                    .await?
            }
            None => {
                let sql = format!(
                    r#"
                    UPDATE {table}
                       SET {payload_col} = COALESCE($2, {payload_col}),
                           updated_at = now()
                     WHERE user_id = $1
                    "#,
                    table = K::TABLE,
                );
                sqlx::query(&sql)
                    .bind(owner_id)
                    .bind(payload)
                    .execute(&self.db)
                    .await?
            }
        };
        Ok(res.rows_affected())
    }

    async fn delete_by_owner(&self, owner_id: i64) -> Result<u64, StoreError> {
        let sql = format!("DELETE FROM {table} WHERE user_id = $1", table = K::TABLE);
        let res = sqlx::query(&sql).bind(owner_id).execute(&self.db).await?;
        Ok(res.rows_affected())
    }
}

#[cfg(test)]
pub(crate) mod memory {
    use std::collections::HashMap;
    use std::marker::PhantomData;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use time::OffsetDateTime;

    use super::ContainerRepository;
    use crate::containers::{Container, ContainerKind};
    use crate::db::StoreError;

    /// In-process repository keyed by owner, so a second insert for the
    /// same owner fails the way the `UNIQUE (user_id)` constraint does.
    pub struct MemoryContainerRepository<K: ContainerKind> {
        rows: Mutex<HashMap<i64, Container<K::Item>>>,
        next_id: Mutex<i64>,
        _kind: PhantomData<fn() -> K>,
    }

    impl<K: ContainerKind> Default for MemoryContainerRepository<K> {
        fn default() -> Self {
            Self {
                rows: Mutex::new(HashMap::new()),
                next_id: Mutex::new(1),
                _kind: PhantomData,
            }
        }
    }

    impl<K: ContainerKind> MemoryContainerRepository<K> {
        pub fn row_count(&self) -> usize {
            self.rows.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl<K: ContainerKind> ContainerRepository<K> for MemoryContainerRepository<K> {
        async fn find_by_owner(&self, owner_id: i64) -> Result<Option<Container<K::Item>>, StoreError> {
            Ok(self.rows.lock().unwrap().get(&owner_id).cloned())
        }

        async fn insert(
            &self,
            owner_id: i64,
            items: &[K::Item],
            extra: Option<i32>,
        ) -> Result<Container<K::Item>, StoreError> {
            let mut rows = self.rows.lock().unwrap();
            if rows.contains_key(&owner_id) {
                return Err(StoreError::UniqueViolation);
            }
            let mut next_id = self.next_id.lock().unwrap();
            let now = OffsetDateTime::now_utc();
            let container = Container {
                id: *next_id,
                owner_id,
                items: items.to_vec(),
                extra,
                created_at: now,
                updated_at: now,
            };
            *next_id += 1;
            rows.insert(owner_id, container.clone());
            Ok(container)
        }

        async fn update_by_owner(
            &self,
            owner_id: i64,
            items: Option<&[K::Item]>,
            extra: Option<i32>,
        ) -> Result<u64, StoreError> {
            let mut rows = self.rows.lock().unwrap();
            let Some(row) = rows.get_mut(&owner_id) else {
                return Ok(0);
            };
            if let Some(items) = items {
                row.items = items.to_vec();
            }
            if extra.is_some() && K::EXTRA_COLUMN.is_some() {
                row.extra = extra;
            }
            row.updated_at = OffsetDateTime::now_utc();
            Ok(1)
        }

        async fn delete_by_owner(&self, owner_id: i64) -> Result<u64, StoreError> {
            Ok(self.rows.lock().unwrap().remove(&owner_id).map_or(0, |_| 1))
        }
    }
}
