use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::debug;

use super::{RangeRows, RowSource};
use crate::common::{Result, ServiceError};

/// Reads ranges from a JSON fixture file shaped like
/// `{ "PL - FL!A:B": [["Carrier", "FL"], ["American Integrity", "FIRE"]] }`.
///
/// The file is re-read on every fetch so that edits show up on the next
/// import cycle.
pub struct FileRowSource {
    path: PathBuf,
}

impl FileRowSource {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

#[async_trait]
impl RowSource for FileRowSource {
    fn source_name(&self) -> &'static str {
        "file"
    }

    async fn fetch_ranges(&self, ranges: &[String]) -> Result<RangeRows> {
        let content = tokio::fs::read_to_string(&self.path).await?;
        let all: RangeRows = serde_json::from_str(&content)?;
        debug!(path = %self.path.display(), available = all.len(), "Loaded row fixture");

        ranges
            .iter()
            .map(|range| {
                all.get(range)
                    .map(|rows| (range.clone(), rows.clone()))
                    .ok_or_else(|| ServiceError::MissingRange(range.clone()))
            })
            .collect()
    }
}
