//! Row sources: where raw sheet rows come from.

pub mod file_source;
pub mod sheets_client;

use async_trait::async_trait;
use std::collections::HashMap;

use crate::common::{RawRow, Result};

pub use file_source::FileRowSource;
pub use sheets_client::SheetsClient;

/// Rows of each requested range, keyed by the range string as requested.
pub type RangeRows = HashMap<String, Vec<RawRow>>;

#[async_trait]
pub trait RowSource: Send + Sync {
    /// Short name used in logs
    fn source_name(&self) -> &'static str;

    /// Fetch every range in one round trip where the backend allows it.
    async fn fetch_ranges(&self, ranges: &[String]) -> Result<RangeRows>;
}
