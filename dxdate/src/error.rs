//! Error types for dxdate.

use std::path::PathBuf;

use thiserror::Error;

/// Result type for dxdate operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for dxdate operations.
///
/// Data problems inside a single record (unparseable dates, missing keys)
/// are not errors: they are logged and the record is dropped. The variants
/// here cover configuration, input, and external-service failures.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV read error.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Configuration file could not be parsed.
    #[error("Config parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration is unreadable or inconsistent.
    #[error("Config error: {0}")]
    Config(String),

    /// Dataset file does not exist.
    #[error("Dataset not found: {}", .0.display())]
    DatasetNotFound(PathBuf),

    /// A required CSV column is absent.
    #[error("Missing column '{column}' (available: {})", available.join(", "))]
    MissingColumn {
        /// Column that was requested.
        column: String,
        /// Columns present in the file header.
        available: Vec<String>,
    },

    /// Parse error.
    #[error("Parse error: {0}")]
    Parse(String),

    /// Remote model call failed (HTTP, auth, malformed response).
    #[error("Remote error: {0}")]
    Remote(String),

    /// A relation generator failed on a document.
    #[error("Generator error: {0}")]
    Generator(String),

    /// The pair classifier failed.
    #[error("Classifier error: {0}")]
    Classifier(String),

    /// Invalid input provided.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Error from the core data model.
    #[error(transparent)]
    Core(#[from] dxdate_core::Error),
}

impl Error {
    /// Create a config error.
    pub fn config(msg: impl Into<String>) -> Self {
        Error::Config(msg.into())
    }

    /// Create a parse error.
    pub fn parse(msg: impl Into<String>) -> Self {
        Error::Parse(msg.into())
    }

    /// Create a remote error.
    pub fn remote(msg: impl Into<String>) -> Self {
        Error::Remote(msg.into())
    }

    /// Create a generator error.
    pub fn generator(msg: impl Into<String>) -> Self {
        Error::Generator(msg.into())
    }

    /// Create a classifier error.
    pub fn classifier(msg: impl Into<String>) -> Self {
        Error::Classifier(msg.into())
    }

    /// Create an invalid input error.
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Error::InvalidInput(msg.into())
    }
}

impl From<ureq::Error> for Error {
    fn from(err: ureq::Error) -> Self {
        match err {
            ureq::Error::Status(code, response) => {
                let body = response.into_string().unwrap_or_default();
                Error::Remote(format!("HTTP {code}: {}", body.trim()))
            }
            ureq::Error::Transport(t) => Error::Remote(format!("transport: {t}")),
        }
    }
}
