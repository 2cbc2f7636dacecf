//! In-process record store.

use std::collections::HashMap;

use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use bandscore_core::traits::{RecordStore, Row, Table};

use crate::{assign_id, merge};

/// Record store holding every table in memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<HashMap<Table, HashMap<Uuid, Row>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of rows currently in `table`.
    pub async fn len(&self, table: Table) -> usize {
        self.tables
            .read()
            .await
            .get(&table)
            .map_or(0, HashMap::len)
    }

    pub async fn is_empty(&self) -> bool {
        self.tables.read().await.values().all(HashMap::is_empty)
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn insert(&self, table: Table, row: Row) -> Result<Row> {
        let (id, row) = assign_id(row);
        self.tables
            .write()
            .await
            .entry(table)
            .or_default()
            .insert(id, row.clone());
        tracing::debug!(%table, %id, "inserted row");
        Ok(row)
    }

    async fn update(&self, table: Table, id: Uuid, patch: Row) -> Result<()> {
        let mut tables = self.tables.write().await;
        let row = tables
            .get_mut(&table)
            .and_then(|rows| rows.get_mut(&id))
            .ok_or_else(|| anyhow::anyhow!("no row {id} in {table}"))?;
        merge(row, patch);
        Ok(())
    }

    async fn select(&self, table: Table, id: Uuid) -> Result<Option<Row>> {
        Ok(self
            .tables
            .read()
            .await
            .get(&table)
            .and_then(|rows| rows.get(&id))
            .cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bandscore_core::traits::{row_id, ID_COLUMN};
    use serde_json::json;

    fn row(value: serde_json::Value) -> Row {
        match value {
            serde_json::Value::Object(map) => map,
            _ => panic!("not an object"),
        }
    }

    #[tokio::test]
    async fn insert_assigns_id_and_select_reads_it_back() {
        let store = MemoryStore::new();
        let stored = store
            .insert(Table::ReadingResponses, row(json!({"score": 1, "id": "caller-id"})))
            .await
            .unwrap();

        let id = row_id(&stored).unwrap();
        assert_ne!(stored[ID_COLUMN], "caller-id");
        let read = store.select(Table::ReadingResponses, id).await.unwrap();
        assert_eq!(read, Some(stored));
        assert_eq!(store.len(Table::ReadingResponses).await, 1);
    }

    #[tokio::test]
    async fn tables_are_separate() {
        let store = MemoryStore::new();
        let stored = store
            .insert(Table::WritingSubmissions, row(json!({"band_score": 6.5})))
            .await
            .unwrap();
        let id = row_id(&stored).unwrap();
        assert_eq!(store.select(Table::SpeakingRecordings, id).await.unwrap(), None);
    }

    #[tokio::test]
    async fn update_merges_columns() {
        let store = MemoryStore::new();
        let stored = store
            .insert(
                Table::WritingSubmissions,
                row(json!({"band_score": 6.5, "status": "fallback_scored", "content": "essay"})),
            )
            .await
            .unwrap();
        let id = row_id(&stored).unwrap();

        store
            .update(
                Table::WritingSubmissions,
                id,
                row(json!({"band_score": 7.0, "status": "scored", "id": "ignored"})),
            )
            .await
            .unwrap();

        let read = store
            .select(Table::WritingSubmissions, id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(read["band_score"], 7.0);
        assert_eq!(read["status"], "scored");
        assert_eq!(read["content"], "essay");
        assert_eq!(row_id(&read), Some(id));
    }

    #[tokio::test]
    async fn update_of_missing_row_fails() {
        let store = MemoryStore::new();
        let err = store
            .update(Table::TestSessions, Uuid::new_v4(), Row::new())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("test_sessions"));
        assert!(store.is_empty().await);
    }
}
