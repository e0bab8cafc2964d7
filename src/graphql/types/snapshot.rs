use crate::pipeline::storage::{SheetSummary, SnapshotInfo};
use async_graphql::{Object, ID};
use chrono::{DateTime, Utc};

/// Metadata of the snapshot currently being served
pub struct SnapshotStatus {
    pub inner: SnapshotInfo,
}

impl From<SnapshotInfo> for SnapshotStatus {
    fn from(info: SnapshotInfo) -> Self {
        Self { inner: info }
    }
}

#[Object]
impl SnapshotStatus {
    /// Increments by one per successful import; 0 before the first import
    async fn version(&self) -> u64 {
        self.inner.version
    }

    async fn import_id(&self) -> ID {
        ID(self.inner.import_id.to_string())
    }

    async fn imported_at(&self) -> DateTime<Utc> {
        self.inner.imported_at
    }

    async fn record_count(&self) -> u64 {
        self.inner.record_count as u64
    }

    async fn sheets(&self) -> Vec<SheetStatus> {
        self.inner.sheets.iter().cloned().map(SheetStatus::from).collect()
    }
}

pub struct SheetStatus {
    pub inner: SheetSummary,
}

impl From<SheetSummary> for SheetStatus {
    fn from(summary: SheetSummary) -> Self {
        Self { inner: summary }
    }
}

#[Object]
impl SheetStatus {
    async fn name(&self) -> &str {
        &self.inner.name
    }

    async fn range(&self) -> &str {
        &self.inner.range
    }

    async fn records(&self) -> u64 {
        self.inner.records as u64
    }

    /// Records whose cell matched no coverage rule
    async fn unknown_records(&self) -> u64 {
        self.inner.unknown_records as u64
    }
}
