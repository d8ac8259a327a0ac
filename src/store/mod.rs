//! Entity store abstraction.
//!
//! Handlers never touch global state: every read and write goes through an
//! `EntityStore` passed in by the caller. Records are JSON documents keyed by
//! `(kind, id)` with last-writer-wins semantics. Records carrying a string
//! `owner` field are also indexed by owner.

use crate::domain::{Address, Entity, EntityKind, OrderingKey};
use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

pub mod memory;

pub use memory::MemoryStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Key-value entity storage plus the indexing cursor.
#[async_trait]
pub trait EntityStore: Send + Sync {
    async fn get(&self, kind: EntityKind, id: &str) -> Result<Option<Value>, StoreError>;

    async fn put(&self, kind: EntityKind, id: &str, value: Value) -> Result<(), StoreError>;

    /// All records of one kind, ordered by id.
    async fn scan(&self, kind: EntityKind) -> Result<Vec<Value>, StoreError>;

    /// Records of one kind whose `owner` field equals `owner`, ordered by id.
    async fn scan_by_owner(
        &self,
        kind: EntityKind,
        owner: &Address,
    ) -> Result<Vec<Value>, StoreError>;

    /// Last event fully applied to this store.
    async fn load_cursor(&self) -> Result<Option<OrderingKey>, StoreError>;

    async fn store_cursor(&self, cursor: OrderingKey) -> Result<(), StoreError>;
}

/// Typed helpers over [`EntityStore`].
#[async_trait]
pub trait StoreExt: EntityStore {
    async fn load<E: Entity>(&self, id: &str) -> Result<Option<E>, StoreError> {
        match self.get(E::KIND, id).await? {
            Some(value) => Ok(Some(serde_json::from_value(value)?)),
            None => Ok(None),
        }
    }

    async fn save<E: Entity>(&self, entity: &E) -> Result<(), StoreError> {
        let value = serde_json::to_value(entity)?;
        self.put(E::KIND, entity.id(), value).await
    }

    async fn exists<E: Entity>(&self, id: &str) -> Result<bool, StoreError> {
        Ok(self.get(E::KIND, id).await?.is_some())
    }

    async fn load_all<E: Entity>(&self) -> Result<Vec<E>, StoreError> {
        self.scan(E::KIND)
            .await?
            .into_iter()
            .map(|value| serde_json::from_value(value).map_err(StoreError::from))
            .collect()
    }

    async fn load_by_owner<E: Entity>(&self, owner: &Address) -> Result<Vec<E>, StoreError> {
        self.scan_by_owner(E::KIND, owner)
            .await?
            .into_iter()
            .map(|value| serde_json::from_value(value).map_err(StoreError::from))
            .collect()
    }
}

/// The `owner` an entity document is indexed under, if any.
pub(crate) fn owner_of(value: &Value) -> Option<&str> {
    value.get("owner").and_then(Value::as_str)
}

impl<S: EntityStore + ?Sized> StoreExt for S {}
