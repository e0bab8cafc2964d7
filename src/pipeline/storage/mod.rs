pub mod in_memory;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::common::{CoverageRecord, Result};

pub use in_memory::InMemoryStorage;

/// Per-sheet outcome of one import cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SheetSummary {
    pub name: String,
    pub range: String,
    pub records: usize,
    pub unknown_records: usize,
}

/// Full record set produced by one import cycle. Never mutated once
/// published; a new import publishes a new snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub version: u64,
    pub import_id: Uuid,
    pub imported_at: DateTime<Utc>,
    pub sheets: Vec<SheetSummary>,
    pub records: Vec<CoverageRecord>,
}

impl Snapshot {
    /// Version 0: nothing imported yet.
    pub fn empty() -> Self {
        Self {
            version: 0,
            import_id: Uuid::nil(),
            imported_at: Utc::now(),
            sheets: Vec::new(),
            records: Vec::new(),
        }
    }
}

/// Snapshot metadata without the records, for status endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotInfo {
    pub version: u64,
    pub import_id: Uuid,
    pub imported_at: DateTime<Utc>,
    pub record_count: usize,
    pub sheets: Vec<SheetSummary>,
}

impl From<&Snapshot> for SnapshotInfo {
    fn from(snapshot: &Snapshot) -> Self {
        Self {
            version: snapshot.version,
            import_id: snapshot.import_id,
            imported_at: snapshot.imported_at,
            record_count: snapshot.records.len(),
            sheets: snapshot.sheets.clone(),
        }
    }
}

/// Holder of the current coverage snapshot
#[async_trait]
pub trait Storage: Send + Sync {
    /// The snapshot readers should use right now.
    async fn current(&self) -> Arc<Snapshot>;

    /// Replace the current snapshot wholesale, assigning the next version.
    /// Returns the published snapshot.
    async fn publish(
        &self,
        records: Vec<CoverageRecord>,
        sheets: Vec<SheetSummary>,
    ) -> Result<Arc<Snapshot>>;
}
