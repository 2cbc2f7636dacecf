//! bandscore-store: Record store backends.
//!
//! `MemoryStore` keeps rows in process and backs tests and one-shot runs.
//! `JsonFileStore` keeps one JSON file per table in a data directory.

pub mod json_file;
pub mod memory;

pub use json_file::JsonFileStore;
pub use memory::MemoryStore;

use bandscore_core::traits::{Row, ID_COLUMN};
use serde_json::Value;
use uuid::Uuid;

/// Stamp a freshly generated id onto `row`, replacing any caller-supplied one.
pub(crate) fn assign_id(mut row: Row) -> (Uuid, Row) {
    let id = Uuid::new_v4();
    row.insert(ID_COLUMN.into(), Value::String(id.to_string()));
    (id, row)
}

/// Merge `patch` into `row`. The id column is never overwritten.
pub(crate) fn merge(row: &mut Row, patch: Row) {
    for (column, value) in patch {
        if column != ID_COLUMN {
            row.insert(column, value);
        }
    }
}
