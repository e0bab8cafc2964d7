use serde::{Deserialize, Serialize};

/// One spreadsheet row as delivered by the row source. The first cell holds
/// the carrier name for data rows and a label for the header row.
pub type RawRow = Vec<String>;

/// Canonical output unit of the normalizer: which carrier offers which
/// coverage in which jurisdiction.
///
/// The jurisdiction travels as `state` on the wire, which is what existing
/// consumers of the carrier feed read.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CoverageRecord {
    pub carrier: String,
    #[serde(rename = "state", alias = "jurisdiction")]
    pub jurisdiction: String,
    pub coverage: String,
}

impl CoverageRecord {
    pub fn new(
        carrier: impl Into<String>,
        jurisdiction: impl Into<String>,
        coverage: impl Into<String>,
    ) -> Self {
        Self {
            carrier: carrier.into(),
            jurisdiction: jurisdiction.into(),
            coverage: coverage.into(),
        }
    }
}
