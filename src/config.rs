use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

use crate::common::constants::{DEFAULT_PORT, DEFAULT_SHEETS_BASE_URL, DEFAULT_TIMEOUT_SECONDS};
use crate::common::{Result, ServiceError};
use crate::normalize::NoFramePolicy;
use crate::pipeline::import::SheetDescriptor;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub spreadsheet: SpreadsheetConfig,
    #[serde(default)]
    pub import: ImportConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
    #[serde(default = "default_sheets", rename = "sheet")]
    pub sheets: Vec<SheetDescriptor>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SpreadsheetConfig {
    #[serde(default)]
    pub id: String,
    pub api_key: Option<String>,
    pub access_token: Option<String>,
    pub base_url: Option<String>,
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ImportConfig {
    /// Re-import on this interval while serving. No periodic refresh if unset.
    pub refresh_interval_secs: Option<u64>,
    #[serde(default)]
    pub no_frame_policy: NoFramePolicy,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MetricsConfig {
    /// Install the Prometheus recorder and expose `/metrics`
    #[serde(default = "default_metrics_enabled")]
    pub enabled: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { port: default_port() }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            spreadsheet: SpreadsheetConfig::default(),
            import: ImportConfig::default(),
            metrics: MetricsConfig::default(),
            sheets: default_sheets(),
        }
    }
}

impl Default for SpreadsheetConfig {
    fn default() -> Self {
        Self {
            id: String::new(),
            api_key: None,
            access_token: None,
            base_url: None,
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: default_metrics_enabled(),
        }
    }
}

fn default_metrics_enabled() -> bool {
    true
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_timeout_seconds() -> u64 {
    DEFAULT_TIMEOUT_SECONDS
}

impl SpreadsheetConfig {
    pub fn base_url(&self) -> &str {
        self.base_url.as_deref().unwrap_or(DEFAULT_SHEETS_BASE_URL)
    }

    pub fn has_credentials(&self) -> bool {
        self.api_key.is_some() || self.access_token.is_some()
    }
}

impl Config {
    /// Load configuration from `path`, falling back to built-in defaults when
    /// the file does not exist. Environment variables (including a `.env`
    /// file) override file values.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut config = if path.exists() {
            let content = fs::read_to_string(path).map_err(|e| {
                ServiceError::Config(format!(
                    "Failed to read config file '{}': {}",
                    path.display(),
                    e
                ))
            })?;
            let config: Config = toml::from_str(&content)?;
            info!(path = %path.display(), sheets = config.sheets.len(), "Loaded configuration");
            config
        } else {
            debug!(path = %path.display(), "No config file, using defaults");
            Config::default()
        };

        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(key) = std::env::var("SHEETS_API_KEY") {
            self.spreadsheet.api_key = Some(key);
        }
        if let Ok(token) = std::env::var("SHEETS_ACCESS_TOKEN") {
            self.spreadsheet.access_token = Some(token);
        }
        if let Ok(id) = std::env::var("SHEETS_SPREADSHEET_ID") {
            self.spreadsheet.id = id;
        }
        if let Ok(port) = std::env::var("COVERAGE_PORT") {
            self.server.port = port
                .parse()
                .map_err(|e| ServiceError::Config(format!("Invalid COVERAGE_PORT '{port}': {e}")))?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        for sheet in &self.sheets {
            sheet.validate()?;
        }
        Ok(())
    }

    /// Checks that only matter when rows are fetched from the remote API.
    pub fn validate_remote(&self) -> Result<()> {
        if self.spreadsheet.id.is_empty() {
            return Err(ServiceError::Config(
                "spreadsheet.id (or SHEETS_SPREADSHEET_ID) is required".to_string(),
            ));
        }
        if !self.spreadsheet.has_credentials() {
            return Err(ServiceError::Config(
                "an API key or access token is required to read the spreadsheet".to_string(),
            ));
        }
        Ok(())
    }
}

/// Tabs of the production carrier workbook.
pub fn default_sheets() -> Vec<SheetDescriptor> {
    let by_category = |name: &str, range: &str, category: &str| {
        SheetDescriptor::by_category(name, range, category)
    };
    let by_states = |name: &str, range: &str, states: &[&str]| {
        SheetDescriptor::by_jurisdictions(name, range, states.iter().copied())
    };

    vec![
        by_category("PL - IL/IN/MI", "PL - IL/IN/MI!A:D", "PL"),
        by_category("PL - FL", "PL - FL!A:B", "PL"),
        by_category("Flood", "Flood!A:E", "FLOOD"),
        by_category("PL - Other States", "PL - Other States!A:V", "PL"),
        by_category("CL STATES APTS", "CL STATES APTS!A:AA", "APARTMENT"),
        by_states("CL - IL/IN/MI/OH", "CL - IL/IN/MI/OH!A:C", &["IL", "IN", "MI", "OH"]),
        by_states("CL - FL", "CL - FL!A:C", &["FL"]),
        by_states("CL - TX", "CL - TX!A:C", &["TX"]),
        by_states("CL - OK", "CL - OK!A:C", &["OK"]),
        by_states("CL - TN", "CL - TN!A:C", &["TN"]),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = Config::default();
        assert_eq!(config.server.port, DEFAULT_PORT);
        assert_eq!(config.sheets.len(), 10);
        assert!(config.validate().is_ok());
        assert!(config.validate_remote().is_err());
    }

    #[test]
    fn test_parse_toml() {
        let config: Config = toml::from_str(
            r#"
            [server]
            port = 8081

            [spreadsheet]
            id = "sheet-123"
            api_key = "abc"

            [import]
            refresh_interval_secs = 600
            no_frame_policy = "single"

            [[sheet]]
            name = "Flood"
            range = "Flood!A:E"
            category = "FLOOD"

            [[sheet]]
            name = "CL - TX"
            range = "CL - TX!A:C"
            jurisdictions = ["TX"]
            "#,
        )
        .unwrap();

        assert_eq!(config.server.port, 8081);
        assert_eq!(config.spreadsheet.timeout_seconds, DEFAULT_TIMEOUT_SECONDS);
        assert_eq!(config.spreadsheet.base_url(), DEFAULT_SHEETS_BASE_URL);
        assert_eq!(config.import.refresh_interval_secs, Some(600));
        assert_eq!(config.import.no_frame_policy, NoFramePolicy::Single);
        assert_eq!(config.sheets.len(), 2);
        assert!(config.validate().is_ok());
        assert!(config.validate_remote().is_ok());
    }

    #[test]
    fn test_sheet_with_both_category_and_jurisdictions_is_rejected() {
        let config: Config = toml::from_str(
            r#"
            [[sheet]]
            name = "Broken"
            range = "Broken!A:C"
            category = "PL"
            jurisdictions = ["IL"]
            "#,
        )
        .unwrap();
        assert!(matches!(config.validate(), Err(ServiceError::Config(_))));
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.sheets.len(), default_sheets().len());
    }
}
