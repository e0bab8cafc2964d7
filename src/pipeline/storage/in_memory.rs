use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use super::{SheetSummary, Snapshot, Storage};
use crate::common::{CoverageRecord, Result};

/// In-memory snapshot store. Readers clone the `Arc` under a brief read lock,
/// so a publish never exposes a half-built record set.
pub struct InMemoryStorage {
    current: RwLock<Arc<Snapshot>>,
}

impl Default for InMemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self {
            current: RwLock::new(Arc::new(Snapshot::empty())),
        }
    }
}

#[async_trait]
impl Storage for InMemoryStorage {
    async fn current(&self) -> Arc<Snapshot> {
        self.current.read().await.clone()
    }

    async fn publish(
        &self,
        records: Vec<CoverageRecord>,
        sheets: Vec<SheetSummary>,
    ) -> Result<Arc<Snapshot>> {
        let mut current = self.current.write().await;

        let snapshot = Arc::new(Snapshot {
            version: current.version + 1,
            import_id: Uuid::new_v4(),
            imported_at: Utc::now(),
            sheets,
            records,
        });
        *current = snapshot.clone();

        debug!(
            version = snapshot.version,
            records = snapshot.records.len(),
            "Published coverage snapshot"
        );
        Ok(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_starts_empty() {
        let storage = InMemoryStorage::new();
        let snapshot = storage.current().await;
        assert_eq!(snapshot.version, 0);
        assert!(snapshot.records.is_empty());
    }

    #[tokio::test]
    async fn test_publish_replaces_wholesale_and_bumps_version() {
        let storage = InMemoryStorage::new();

        storage
            .publish(vec![CoverageRecord::new("Allstate", "IL", "FIRE")], Vec::new())
            .await
            .unwrap();
        let first = storage.current().await;

        storage
            .publish(vec![CoverageRecord::new("Chubb", "OH", "AUTO")], Vec::new())
            .await
            .unwrap();
        let second = storage.current().await;

        assert_eq!(first.version, 1);
        assert_eq!(second.version, 2);
        assert_ne!(first.import_id, second.import_id);
        // Earlier readers keep their snapshot untouched
        assert_eq!(first.records, vec![CoverageRecord::new("Allstate", "IL", "FIRE")]);
        assert_eq!(second.records, vec![CoverageRecord::new("Chubb", "OH", "AUTO")]);
    }
}
