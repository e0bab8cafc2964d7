use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;
use tracing::{error, info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::common::constants::UNKNOWN;
use crate::common::{CoverageRecord, Result, ServiceError};
use crate::normalize::{self, is_valid_jurisdiction, Category, NoFramePolicy, NormalizeOptions};
use crate::observability::metrics;
use crate::pipeline::ingestion::RowSource;
use crate::pipeline::storage::{SheetSummary, Storage};

/// One tab of the workbook and how to read it. Exactly one of `category`
/// (state-keyed tab) or `jurisdictions` (commercial-lines tab) is set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SheetDescriptor {
    pub name: String,
    pub range: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default, alias = "states")]
    pub jurisdictions: Option<Vec<String>>,
}

impl SheetDescriptor {
    pub fn by_category(name: &str, range: &str, category: &str) -> Self {
        Self {
            name: name.to_string(),
            range: range.to_string(),
            category: Some(category.to_string()),
            jurisdictions: None,
        }
    }

    pub fn by_jurisdictions<'a>(
        name: &str,
        range: &str,
        jurisdictions: impl IntoIterator<Item = &'a str>,
    ) -> Self {
        Self {
            name: name.to_string(),
            range: range.to_string(),
            category: None,
            jurisdictions: Some(jurisdictions.into_iter().map(str::to_string).collect()),
        }
    }

    /// Static checks run at config load, before any rows are fetched.
    pub fn validate(&self) -> Result<()> {
        let invalid = |reason: String| {
            ServiceError::Config(format!("sheet '{}': {}", self.name, reason))
        };

        match (&self.category, &self.jurisdictions) {
            (Some(category), None) => {
                category
                    .parse::<Category>()
                    .map_err(|e| invalid(e.to_string()))?;
            }
            (None, Some(jurisdictions)) => {
                if jurisdictions.is_empty() {
                    return Err(invalid("jurisdictions must not be empty".to_string()));
                }
                if let Some(code) = jurisdictions.iter().find(|c| !is_valid_jurisdiction(c)) {
                    return Err(invalid(format!("invalid jurisdiction {code:?}")));
                }
            }
            _ => {
                return Err(invalid(
                    "exactly one of category or jurisdictions must be set".to_string(),
                ))
            }
        }
        Ok(())
    }

    pub fn options(&self, no_frame: NoFramePolicy) -> NormalizeOptions {
        NormalizeOptions {
            category: self.category.clone(),
            jurisdictions: self.jurisdictions.clone(),
            no_frame,
        }
    }
}

/// Result of a successful import cycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportSummary {
    pub version: u64,
    pub import_id: Uuid,
    pub record_count: usize,
    pub sheets: Vec<SheetSummary>,
    pub duration_ms: u64,
}

/// Fetches every configured sheet, normalizes it and publishes the combined
/// record set as one snapshot. A cycle is all-or-nothing: if any sheet fails
/// the current snapshot stays in place.
pub struct Importer {
    source: Arc<dyn RowSource>,
    storage: Arc<dyn Storage>,
    sheets: Vec<SheetDescriptor>,
    no_frame: NoFramePolicy,
}

impl Importer {
    pub fn new(
        source: Arc<dyn RowSource>,
        storage: Arc<dyn Storage>,
        sheets: Vec<SheetDescriptor>,
        no_frame: NoFramePolicy,
    ) -> Self {
        Self {
            source,
            storage,
            sheets,
            no_frame,
        }
    }

    /// Ranges to request, in sheet order. Tabs that read the same range
    /// share one fetch.
    fn distinct_ranges(&self) -> Vec<String> {
        let mut ranges: Vec<String> = Vec::with_capacity(self.sheets.len());
        for sheet in &self.sheets {
            if !ranges.contains(&sheet.range) {
                ranges.push(sheet.range.clone());
            }
        }
        ranges
    }

    /// Fetch and normalize every sheet without publishing anything.
    pub async fn collect(&self) -> Result<(Vec<CoverageRecord>, Vec<SheetSummary>)> {
        let fetched = self.source.fetch_ranges(&self.distinct_ranges()).await?;

        let mut records = Vec::new();
        let mut summaries = Vec::with_capacity(self.sheets.len());

        for sheet in &self.sheets {
            let span = info_span!("sheet", name = %sheet.name);
            let _enter = span.enter();

            let rows = fetched
                .get(&sheet.range)
                .ok_or_else(|| ServiceError::MissingRange(sheet.range.clone()))?;

            let sheet_records = normalize::normalize(rows, &sheet.options(self.no_frame))
                .map_err(|source| ServiceError::Normalize {
                    sheet: sheet.name.clone(),
                    source,
                })?;

            let unknown_records = sheet_records.iter().filter(|r| r.coverage == UNKNOWN).count();
            if unknown_records > 0 {
                warn!(unknown_records, "Sheet has cells that matched no coverage rule");
                metrics::import::unknown_coverage(&sheet.name, unknown_records);
            }
            metrics::import::sheet_records(&sheet.name, sheet_records.len());
            info!(rows = rows.len(), records = sheet_records.len(), "Normalized sheet");

            summaries.push(SheetSummary {
                name: sheet.name.clone(),
                range: sheet.range.clone(),
                records: sheet_records.len(),
                unknown_records,
            });
            records.extend(sheet_records);
        }

        Ok((records, summaries))
    }

    /// Run one import cycle and publish the result.
    pub async fn run_once(&self) -> Result<ImportSummary> {
        let started = Instant::now();
        let span = info_span!("import", source = self.source.source_name(), sheets = self.sheets.len());

        let outcome = async {
            let (records, sheets) = self.collect().await?;
            self.storage.publish(records, sheets).await
        }
        .instrument(span)
        .await;

        match outcome {
            Ok(snapshot) => {
                let elapsed = started.elapsed();
                metrics::import::succeeded(elapsed.as_secs_f64());
                metrics::import::snapshot_published(snapshot.version, snapshot.records.len());
                info!(
                    version = snapshot.version,
                    records = snapshot.records.len(),
                    elapsed_ms = elapsed.as_millis() as u64,
                    "Import finished"
                );
                Ok(ImportSummary {
                    version: snapshot.version,
                    import_id: snapshot.import_id,
                    record_count: snapshot.records.len(),
                    sheets: snapshot.sheets.clone(),
                    duration_ms: elapsed.as_millis() as u64,
                })
            }
            Err(e) => {
                metrics::import::failed();
                error!("Import failed, keeping previous snapshot: {}", e);
                Err(e)
            }
        }
    }

    /// Re-run the import every `interval`. The first run happens one full
    /// interval from now; failures are logged and retried on the next tick.
    pub fn spawn_refresh(self: Arc<Self>, interval: Duration) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + interval, interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let _ = self.run_once().await;
            }
        })
    }
}
