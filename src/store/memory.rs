//! In-memory entity store, used by tests and dry runs.

use super::{owner_of, EntityStore, StoreError};
use crate::domain::{Address, EntityKind, OrderingKey};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use tokio::sync::RwLock;

#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<HashMap<EntityKind, BTreeMap<String, Value>>>,
    cursor: RwLock<Option<OrderingKey>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records of one kind.
    pub async fn count(&self, kind: EntityKind) -> usize {
        self.tables
            .read()
            .await
            .get(&kind)
            .map(|table| table.len())
            .unwrap_or(0)
    }

    /// Total number of records across all kinds.
    pub async fn total(&self) -> usize {
        self.tables.read().await.values().map(|t| t.len()).sum()
    }
}

#[async_trait]
impl EntityStore for MemoryStore {
    async fn get(&self, kind: EntityKind, id: &str) -> Result<Option<Value>, StoreError> {
        Ok(self
            .tables
            .read()
            .await
            .get(&kind)
            .and_then(|table| table.get(id))
            .cloned())
    }

    async fn put(&self, kind: EntityKind, id: &str, value: Value) -> Result<(), StoreError> {
        self.tables
            .write()
            .await
            .entry(kind)
            .or_default()
            .insert(id.to_string(), value);
        Ok(())
    }

    async fn scan(&self, kind: EntityKind) -> Result<Vec<Value>, StoreError> {
        Ok(self
            .tables
            .read()
            .await
            .get(&kind)
            .map(|table| table.values().cloned().collect())
            .unwrap_or_default())
    }

    async fn scan_by_owner(
        &self,
        kind: EntityKind,
        owner: &Address,
    ) -> Result<Vec<Value>, StoreError> {
        Ok(self
            .tables
            .read()
            .await
            .get(&kind)
            .map(|table| {
                table
                    .values()
                    .filter(|value| owner_of(value) == Some(owner.as_str()))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn load_cursor(&self) -> Result<Option<OrderingKey>, StoreError> {
        Ok(*self.cursor.read().await)
    }

    async fn store_cursor(&self, cursor: OrderingKey) -> Result<(), StoreError> {
        *self.cursor.write().await = Some(cursor);
        Ok(())
    }
}
