use async_trait::async_trait;
use serde::Deserialize;
use std::time::{Duration, Instant};
use tracing::{debug, instrument, warn};

use super::{RangeRows, RowSource};
use crate::common::{RawRow, Result, ServiceError};
use crate::config::SpreadsheetConfig;
use crate::observability::metrics;

/// Client for the Google Sheets `values:batchGet` endpoint.
///
/// Authentication is limited to what the caller hands in: an API key for
/// link-shared workbooks or an already issued OAuth bearer token.
pub struct SheetsClient {
    client: reqwest::Client,
    base_url: String,
    spreadsheet_id: String,
    api_key: Option<String>,
    access_token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BatchGetResponse {
    #[serde(default)]
    value_ranges: Vec<ValueRange>,
}

#[derive(Debug, Deserialize)]
struct ValueRange {
    /// Values are omitted entirely for an empty range
    #[serde(default)]
    values: Vec<Vec<serde_json::Value>>,
}

impl SheetsClient {
    pub fn from_config(config: &SpreadsheetConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url().trim_end_matches('/').to_string(),
            spreadsheet_id: config.id.clone(),
            api_key: config.api_key.clone(),
            access_token: config.access_token.clone(),
        })
    }

    fn batch_get_url(&self) -> String {
        format!("{}/{}/values:batchGet", self.base_url, self.spreadsheet_id)
    }
}

#[async_trait]
impl RowSource for SheetsClient {
    fn source_name(&self) -> &'static str {
        "google_sheets"
    }

    #[instrument(skip(self, ranges), fields(spreadsheet = %self.spreadsheet_id, ranges = ranges.len()))]
    async fn fetch_ranges(&self, ranges: &[String]) -> Result<RangeRows> {
        let started = Instant::now();

        let mut query: Vec<(&str, &str)> = ranges.iter().map(|r| ("ranges", r.as_str())).collect();
        query.push(("majorDimension", "ROWS"));
        query.push(("valueRenderOption", "FORMATTED_VALUE"));
        if let Some(key) = self.api_key.as_deref() {
            query.push(("key", key));
        }

        let mut request = self.client.get(self.batch_get_url()).query(&query);
        if let Some(token) = self.access_token.as_deref() {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(|e| {
            metrics::sources::request_error();
            e
        })?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = %status, "Sheets API returned an error");
            metrics::sources::request_error();
            return Err(ServiceError::Api {
                message: format!("Sheets API returned {status}: {body}"),
            });
        }

        let payload: BatchGetResponse = response.json().await?;
        metrics::sources::request_success(started.elapsed().as_secs_f64());

        if payload.value_ranges.len() != ranges.len() {
            return Err(ServiceError::Api {
                message: format!(
                    "requested {} ranges but received {}",
                    ranges.len(),
                    payload.value_ranges.len()
                ),
            });
        }

        // batchGet answers in request order; key by the requested string since
        // the echoed range is rewritten (quoted names, clamped bounds)
        let rows = ranges
            .iter()
            .cloned()
            .zip(payload.value_ranges)
            .map(|(range, value_range)| {
                let rows: Vec<RawRow> = value_range
                    .values
                    .into_iter()
                    .map(|row| row.into_iter().map(cell_to_string).collect())
                    .collect();
                debug!(range = %range, rows = rows.len(), "Fetched range");
                (range, rows)
            })
            .collect();

        Ok(rows)
    }
}

fn cell_to_string(value: serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s,
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    }
}
