//! SQLite-backed entity store.

use crate::domain::{Address, EntityKind, OrderingKey};
use crate::store::{owner_of, EntityStore, StoreError};
use async_trait::async_trait;
use serde_json::Value;
use sqlx::sqlite::SqlitePool;
use sqlx::Row;

/// Entity store persisting JSON documents in the `entities` table.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Create a new store with the given connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        SqliteStore { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl EntityStore for SqliteStore {
    async fn get(&self, kind: EntityKind, id: &str) -> Result<Option<Value>, StoreError> {
        let row = sqlx::query("SELECT data FROM entities WHERE kind = ? AND id = ?")
            .bind(kind.as_str())
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => {
                let data: String = row.get("data");
                Ok(Some(serde_json::from_str(&data)?))
            }
            None => Ok(None),
        }
    }

    async fn put(&self, kind: EntityKind, id: &str, value: Value) -> Result<(), StoreError> {
        let owner = owner_of(&value).map(str::to_string);
        let data = serde_json::to_string(&value)?;
        sqlx::query(
            r#"
            INSERT INTO entities (kind, id, owner, data, updated_at)
            VALUES (?, ?, ?, ?, ?)
            ON CONFLICT(kind, id) DO UPDATE SET
                owner = excluded.owner,
                data = excluded.data,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(kind.as_str())
        .bind(id)
        .bind(owner)
        .bind(data)
        .bind(chrono::Utc::now().timestamp_millis())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn scan(&self, kind: EntityKind) -> Result<Vec<Value>, StoreError> {
        let rows = sqlx::query("SELECT data FROM entities WHERE kind = ? ORDER BY id ASC")
            .bind(kind.as_str())
            .fetch_all(&self.pool)
            .await?;

        rows.iter()
            .map(|row| {
                let data: String = row.get("data");
                serde_json::from_str(&data).map_err(StoreError::from)
            })
            .collect()
    }

    async fn scan_by_owner(
        &self,
        kind: EntityKind,
        owner: &Address,
    ) -> Result<Vec<Value>, StoreError> {
        let rows = sqlx::query(
            "SELECT data FROM entities WHERE kind = ? AND owner = ? ORDER BY id ASC",
        )
        .bind(kind.as_str())
        .bind(owner.as_str())
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| {
                let data: String = row.get("data");
                serde_json::from_str(&data).map_err(StoreError::from)
            })
            .collect()
    }

    async fn load_cursor(&self) -> Result<Option<OrderingKey>, StoreError> {
        let row = sqlx::query(
            "SELECT block_number, transaction_index, log_index FROM sync_state WHERE id = 1",
        )
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| {
            let block_number: i64 = r.get("block_number");
            let transaction_index: i64 = r.get("transaction_index");
            let log_index: i64 = r.get("log_index");
            OrderingKey {
                block_number: block_number as u64,
                transaction_index: transaction_index as u32,
                log_index: log_index as u32,
            }
        }))
    }

    async fn store_cursor(&self, cursor: OrderingKey) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO sync_state (id, block_number, transaction_index, log_index, updated_at)
            VALUES (1, ?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                block_number = excluded.block_number,
                transaction_index = excluded.transaction_index,
                log_index = excluded.log_index,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(cursor.block_number as i64)
        .bind(cursor.transaction_index as i64)
        .bind(cursor.log_index as i64)
        .bind(chrono::Utc::now().timestamp_millis())
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
