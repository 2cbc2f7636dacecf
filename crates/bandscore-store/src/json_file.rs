//! Record store persisted as JSON files, one per table.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use async_trait::async_trait;
use tempfile::NamedTempFile;
use tokio::sync::Mutex;
use uuid::Uuid;

use bandscore_core::traits::{row_id, RecordStore, Row, Table};

use crate::{assign_id, merge};

/// Record store writing `<data_dir>/<table>.json`.
///
/// Each file holds a JSON array of rows in insertion order. Writes replace
/// the whole file through a temporary file in the same directory, so a
/// crash never leaves a half-written table behind.
#[derive(Debug)]
pub struct JsonFileStore {
    dir: PathBuf,
    /// Serializes read-modify-write cycles within this process.
    write_lock: Mutex<()>,
}

impl JsonFileStore {
    /// Open (creating if needed) a store rooted at `dir`.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("failed to create data directory {}", dir.display()))?;
        Ok(Self {
            dir,
            write_lock: Mutex::new(()),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn table_path(&self, table: Table) -> PathBuf {
        self.dir.join(format!("{table}.json"))
    }

    async fn read_table(&self, table: Table) -> Result<Vec<Row>> {
        let path = self.table_path(table);
        let content = match tokio::fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(e).with_context(|| format!("failed to read {}", path.display()))
            }
        };
        serde_json::from_str(&content)
            .with_context(|| format!("failed to parse {}", path.display()))
    }

    async fn write_table(&self, table: Table, rows: &[Row]) -> Result<()> {
        let json = serde_json::to_string_pretty(rows)
            .with_context(|| format!("failed to serialize {table}"))?;
        let dir = self.dir.clone();
        let path = self.table_path(table);

        tokio::task::spawn_blocking(move || -> Result<()> {
            let mut tmp = NamedTempFile::new_in(&dir)
                .with_context(|| format!("failed to create temp file in {}", dir.display()))?;
            tmp.write_all(json.as_bytes())
                .context("failed to write table contents")?;
            tmp.persist(&path)
                .with_context(|| format!("failed to replace {}", path.display()))?;
            Ok(())
        })
        .await
        .context("table write task failed")?
    }
}

#[async_trait]
impl RecordStore for JsonFileStore {
    async fn insert(&self, table: Table, row: Row) -> Result<Row> {
        let _guard = self.write_lock.lock().await;
        let mut rows = self.read_table(table).await?;
        let (id, row) = assign_id(row);
        rows.push(row.clone());
        self.write_table(table, &rows).await?;
        tracing::debug!(%table, %id, "inserted row");
        Ok(row)
    }

    async fn update(&self, table: Table, id: Uuid, patch: Row) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let mut rows = self.read_table(table).await?;
        let row = rows
            .iter_mut()
            .find(|row| row_id(row) == Some(id))
            .ok_or_else(|| anyhow::anyhow!("no row {id} in {table}"))?;
        merge(row, patch);
        self.write_table(table, &rows).await
    }

    async fn select(&self, table: Table, id: Uuid) -> Result<Option<Row>> {
        let rows = self.read_table(table).await?;
        Ok(rows.into_iter().find(|row| row_id(row) == Some(id)))
    }
}
