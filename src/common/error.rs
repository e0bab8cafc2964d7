use thiserror::Error;

/// Structural failures raised while normalizing a sheet.
///
/// Cell-level oddities never end up here; they degrade to sentinel or echo
/// coverage labels instead.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NormalizeError {
    #[error("Incorrect sheet format! Expecting header with {expected_shape} (found: {found})")]
    MalformedHeader { expected_shape: String, found: String },

    #[error("Invalid state: {code:?}")]
    InvalidJurisdiction { code: String },

    #[error("Unknown coverage category: {category:?}")]
    UnknownCategory { category: String },
}

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON deserialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Sheet '{sheet}' could not be normalized: {source}")]
    Normalize {
        sheet: String,
        #[source]
        source: NormalizeError,
    },

    #[error("Sheet range '{0}' was not returned by the row source")]
    MissingRange(String),

    #[error("API error: {message}")]
    Api { message: String },
}

pub type Result<T> = std::result::Result<T, ServiceError>;
