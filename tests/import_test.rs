use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use coverage_sheets::common::ServiceError;
use coverage_sheets::normalize::NoFramePolicy;
use coverage_sheets::pipeline::ingestion::{FileRowSource, RangeRows, RowSource};
use coverage_sheets::pipeline::storage::{InMemoryStorage, Storage};
use coverage_sheets::pipeline::{Importer, SheetDescriptor};
use coverage_sheets::{CoverageRecord, RawRow};

fn rows(input: &[&[&str]]) -> Vec<RawRow> {
    input
        .iter()
        .map(|row| row.iter().map(|c| c.to_string()).collect())
        .collect()
}

fn sheets() -> Vec<SheetDescriptor> {
    vec![
        SheetDescriptor::by_category("PL - IL/IN/MI", "PL - IL/IN/MI!A:D", "PL"),
        SheetDescriptor::by_jurisdictions("CL - TX", "CL - TX!A:C", ["TX"]),
    ]
}

fn workbook(pl_header: &[&str]) -> RangeRows {
    let mut ranges = HashMap::new();
    ranges.insert(
        "PL - IL/IN/MI!A:D".to_string(),
        rows(&[pl_header, &["Allstate", "Both"]]),
    );
    ranges.insert(
        "CL - TX!A:C".to_string(),
        rows(&[
            &["Carrier", "SFR's (1-4 Units)", "4+ units"],
            &["Arcana", "Yes", "Maybe"],
        ]),
    );
    ranges
}

/// Serves a good workbook until `broken` is flipped, then one with a bad
/// header on the PL tab.
struct MockRowSource {
    broken: AtomicBool,
}

#[async_trait]
impl RowSource for MockRowSource {
    fn source_name(&self) -> &'static str {
        "mock"
    }

    async fn fetch_ranges(&self, _ranges: &[String]) -> coverage_sheets::common::Result<RangeRows> {
        if self.broken.load(Ordering::SeqCst) {
            Ok(workbook(&["Carrier", "Illinois"]))
        } else {
            Ok(workbook(&["Carrier", "IL"]))
        }
    }
}

#[tokio::test]
async fn test_import_publishes_all_sheets_in_order() -> Result<()> {
    let storage: Arc<dyn Storage> = Arc::new(InMemoryStorage::new());
    let source = Arc::new(MockRowSource {
        broken: AtomicBool::new(false),
    });
    let importer = Importer::new(source, storage.clone(), sheets(), NoFramePolicy::Duplicate);

    let summary = importer.run_once().await?;
    assert_eq!(summary.version, 1);
    assert_eq!(summary.record_count, 4);
    assert_eq!(summary.sheets.len(), 2);
    assert_eq!(summary.sheets[1].unknown_records, 1);

    let snapshot = storage.current().await;
    assert_eq!(
        snapshot.records,
        vec![
            CoverageRecord::new("Allstate", "IL", "FIRE"),
            CoverageRecord::new("Allstate", "IL", "AUTO"),
            CoverageRecord::new("Arcana", "TX", "SFR"),
            CoverageRecord::new("Arcana", "TX", "UNKNOWN"),
        ]
    );
    Ok(())
}

#[tokio::test]
async fn test_failed_import_keeps_previous_snapshot() -> Result<()> {
    let storage: Arc<dyn Storage> = Arc::new(InMemoryStorage::new());
    let source = Arc::new(MockRowSource {
        broken: AtomicBool::new(false),
    });
    let importer = Importer::new(
        source.clone(),
        storage.clone(),
        sheets(),
        NoFramePolicy::Duplicate,
    );

    importer.run_once().await?;
    let before = storage.current().await;

    source.broken.store(true, Ordering::SeqCst);
    let err = importer.run_once().await.unwrap_err();
    assert!(matches!(err, ServiceError::Normalize { ref sheet, .. } if sheet == "PL - IL/IN/MI"));

    let after = storage.current().await;
    assert_eq!(after.version, before.version);
    assert_eq!(after.records, before.records);
    Ok(())
}

#[tokio::test]
async fn test_import_from_fixture_file() -> Result<()> {
    let mut file = tempfile::NamedTempFile::new()?;
    let fixture = serde_json::json!({
        "Flood!A:E": [["Carrier", "IL", "IN"], ["CatCoverage", "Yes", ""]],
        "CL - FL!A:C": [["Carrier", "SFR's (1-4 Units)", "4+ units"], ["Distinguished", "IL (no frame)"]]
    });
    write!(file, "{fixture}")?;

    let storage: Arc<dyn Storage> = Arc::new(InMemoryStorage::new());
    let importer = Importer::new(
        Arc::new(FileRowSource::new(file.path())),
        storage.clone(),
        vec![
            SheetDescriptor::by_category("Flood", "Flood!A:E", "FLOOD"),
            SheetDescriptor::by_jurisdictions("CL - FL", "CL - FL!A:C", ["FL"]),
        ],
        NoFramePolicy::Single,
    );

    importer.run_once().await?;
    let snapshot = storage.current().await;
    assert_eq!(
        snapshot.records,
        vec![
            CoverageRecord::new("CatCoverage", "IL", "FLOOD"),
            CoverageRecord::new("Distinguished", "IL", "SFR - NO FRAME"),
        ]
    );
    Ok(())
}

#[tokio::test]
async fn test_sheets_sharing_a_range_both_import() -> Result<()> {
    let mut file = tempfile::NamedTempFile::new()?;
    let fixture = serde_json::json!({
        "Flood!A:E": [["Carrier", "IL"], ["CatCoverage", "Yes"]]
    });
    write!(file, "{fixture}")?;

    let storage: Arc<dyn Storage> = Arc::new(InMemoryStorage::new());
    let importer = Importer::new(
        Arc::new(FileRowSource::new(file.path())),
        storage.clone(),
        vec![
            SheetDescriptor::by_category("Flood", "Flood!A:E", "FLOOD"),
            SheetDescriptor::by_category("Flood copy", "Flood!A:E", "FLOOD"),
        ],
        NoFramePolicy::Duplicate,
    );

    let summary = importer.run_once().await?;
    assert_eq!(summary.sheets.len(), 2);
    assert_eq!(summary.sheets[1].records, 1);
    assert_eq!(
        storage.current().await.records,
        vec![
            CoverageRecord::new("CatCoverage", "IL", "FLOOD"),
            CoverageRecord::new("CatCoverage", "IL", "FLOOD"),
        ]
    );
    Ok(())
}

#[tokio::test]
async fn test_missing_range_fails_import() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, r#"{{"Flood!A:E": [["Carrier", "IL"]]}}"#).unwrap();

    let storage: Arc<dyn Storage> = Arc::new(InMemoryStorage::new());
    let importer = Importer::new(
        Arc::new(FileRowSource::new(file.path())),
        storage.clone(),
        sheets(),
        NoFramePolicy::Duplicate,
    );

    let err = importer.run_once().await.unwrap_err();
    assert!(matches!(err, ServiceError::MissingRange(_)));
    assert_eq!(storage.current().await.version, 0);
}
