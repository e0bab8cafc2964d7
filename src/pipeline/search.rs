use serde::{Deserialize, Serialize};

use crate::common::CoverageRecord;

/// Exact-match search criteria. Absent or empty fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchQuery {
    #[serde(default, alias = "jurisdiction")]
    pub state: Option<String>,
    #[serde(default)]
    pub coverage: Option<String>,
}

impl SearchQuery {
    pub fn matches(&self, record: &CoverageRecord) -> bool {
        criterion(&self.state).map_or(true, |state| record.jurisdiction == state)
            && criterion(&self.coverage).map_or(true, |coverage| record.coverage == coverage)
    }
}

fn criterion(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

/// Records matching `query`, in snapshot order.
pub fn filter<'a>(
    records: &'a [CoverageRecord],
    query: &'a SearchQuery,
) -> impl Iterator<Item = &'a CoverageRecord> + 'a {
    records.iter().filter(move |record| query.matches(record))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn records() -> Vec<CoverageRecord> {
        vec![
            CoverageRecord::new("Allstate", "IL", "FIRE"),
            CoverageRecord::new("Allstate", "IL", "AUTO"),
            CoverageRecord::new("Allstate", "IN", "FIRE"),
            CoverageRecord::new("Arcana", "IL", "SFR"),
        ]
    }

    fn search(state: Option<&str>, coverage: Option<&str>) -> Vec<CoverageRecord> {
        let query = SearchQuery {
            state: state.map(str::to_string),
            coverage: coverage.map(str::to_string),
        };
        let records = records();
        filter(&records, &query).cloned().collect()
    }

    #[test]
    fn test_empty_query_returns_everything() {
        assert_eq!(search(None, None), records());
        assert_eq!(search(Some(""), Some("")), records());
    }

    #[test]
    fn test_filters_are_conjunctive() {
        assert_eq!(search(Some("IL"), None).len(), 3);
        assert_eq!(search(None, Some("FIRE")).len(), 2);
        assert_eq!(
            search(Some("IL"), Some("FIRE")),
            vec![CoverageRecord::new("Allstate", "IL", "FIRE")]
        );
    }

    #[test]
    fn test_match_is_exact() {
        assert!(search(Some("il"), None).is_empty());
        assert!(search(None, Some("SFR - PLs")).is_empty());
    }

    #[test]
    fn test_query_accepts_jurisdiction_alias() {
        let query: SearchQuery =
            serde_json::from_str(r#"{"jurisdiction": "IN", "coverage": "FIRE"}"#).unwrap();
        assert_eq!(query.state.as_deref(), Some("IN"));
    }
}
