use crate::common::CoverageRecord;
use async_graphql::Object;

/// GraphQL representation of a coverage record
#[derive(Clone)]
pub struct Coverage {
    pub inner: CoverageRecord,
}

impl From<CoverageRecord> for Coverage {
    fn from(record: CoverageRecord) -> Self {
        Self { inner: record }
    }
}

#[Object]
impl Coverage {
    /// Carrier name as written in the workbook
    async fn carrier(&self) -> &str {
        &self.inner.carrier
    }

    /// Two-letter jurisdiction code
    async fn state(&self) -> &str {
        &self.inner.jurisdiction
    }

    /// Canonical coverage label, e.g. `FIRE` or `SFR - PLs`
    async fn coverage(&self) -> &str {
        &self.inner.coverage
    }
}
