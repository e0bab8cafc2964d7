//! Metrics for the coverage service
//!
//! Thin wrappers over the `metrics` facade using Prometheus naming
//! conventions. Without an installed recorder every call is a no-op, which
//! keeps tests and the offline CLI free of exporter setup.

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::fmt;
use std::sync::OnceLock;
use tracing::{info, warn};

static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// All metric names used in the system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricName {
    SourcesRequestsSuccess,
    SourcesRequestsError,
    SourcesRequestDuration,

    ImportSuccess,
    ImportError,
    ImportDuration,
    ImportSheetRecords,
    ImportUnknownCoverage,
    SnapshotVersion,
    SnapshotRecords,

    ApiRequests,
}

impl MetricName {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricName::SourcesRequestsSuccess => "coverage_sources_requests_success_total",
            MetricName::SourcesRequestsError => "coverage_sources_requests_error_total",
            MetricName::SourcesRequestDuration => "coverage_sources_request_duration_seconds",
            MetricName::ImportSuccess => "coverage_import_success_total",
            MetricName::ImportError => "coverage_import_error_total",
            MetricName::ImportDuration => "coverage_import_duration_seconds",
            MetricName::ImportSheetRecords => "coverage_import_sheet_records",
            MetricName::ImportUnknownCoverage => "coverage_import_unknown_coverage_total",
            MetricName::SnapshotVersion => "coverage_snapshot_version",
            MetricName::SnapshotRecords => "coverage_snapshot_records",
            MetricName::ApiRequests => "coverage_api_requests_total",
        }
    }
}

impl fmt::Display for MetricName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Install the Prometheus recorder. Safe to call more than once; only the
/// first call installs anything.
pub fn init() {
    if METRICS_HANDLE.get().is_some() {
        return;
    }
    match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => {
            METRICS_HANDLE.set(handle).ok();
            info!("Metrics recorder installed");
        }
        Err(e) => warn!("Failed to install Prometheus recorder: {}", e),
    }
}

/// Prometheus text exposition of the current metrics, if a recorder is
/// installed.
pub fn render() -> Option<String> {
    METRICS_HANDLE.get().map(|handle| handle.render())
}

pub mod sources {
    use super::MetricName;

    pub fn request_success(duration_secs: f64) {
        ::metrics::counter!(MetricName::SourcesRequestsSuccess.as_str()).increment(1);
        ::metrics::histogram!(MetricName::SourcesRequestDuration.as_str()).record(duration_secs);
    }

    pub fn request_error() {
        ::metrics::counter!(MetricName::SourcesRequestsError.as_str()).increment(1);
    }
}

pub mod import {
    use super::MetricName;

    pub fn succeeded(duration_secs: f64) {
        ::metrics::counter!(MetricName::ImportSuccess.as_str()).increment(1);
        ::metrics::histogram!(MetricName::ImportDuration.as_str()).record(duration_secs);
    }

    pub fn failed() {
        ::metrics::counter!(MetricName::ImportError.as_str()).increment(1);
    }

    pub fn sheet_records(sheet: &str, records: usize) {
        ::metrics::gauge!(MetricName::ImportSheetRecords.as_str(), "sheet" => sheet.to_string())
            .set(records as f64);
    }

    pub fn unknown_coverage(sheet: &str, count: usize) {
        ::metrics::counter!(MetricName::ImportUnknownCoverage.as_str(), "sheet" => sheet.to_string())
            .increment(count as u64);
    }

    pub fn snapshot_published(version: u64, records: usize) {
        ::metrics::gauge!(MetricName::SnapshotVersion.as_str()).set(version as f64);
        ::metrics::gauge!(MetricName::SnapshotRecords.as_str()).set(records as f64);
    }
}

pub mod api {
    use super::MetricName;

    pub fn request(endpoint: &'static str) {
        ::metrics::counter!(MetricName::ApiRequests.as_str(), "endpoint" => endpoint).increment(1);
    }
}
