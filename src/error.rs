//! Unified error handling for the beauty-trends crate
//!
//! All fallible operations in the library return [`Result`], whose error type
//! classifies failures so callers can decide whether to degrade or abort.
//!
//! # Architecture
//!
//! - [`ErrorCategory`] - Classification of errors for handling strategies
//! - [`Error`] - Unified error enum
//!
//! # Usage
//!
//! ```rust,ignore
//! use beauty_trends::error::{Error, ErrorCategory};
//!
//! fn handle_error(err: Error) {
//!     if err.is_recoverable() {
//!         tracing::warn!(error = %err, "source contributed nothing this run");
//!     } else {
//!         tracing::error!(error = %err, "fatal");
//!     }
//! }
//! ```

use std::io;
use thiserror::Error;

/// Classification of errors for handling strategies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// A source (store query, upstream collector) produced no data
    Source,
    /// A stored payload could not be decoded
    Payload,
    /// Storage and I/O errors
    Storage,
    /// Configuration and validation errors
    Config,
    /// Other/unknown errors
    Other,
}

impl ErrorCategory {
    /// Short label used in log fields
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Source => "source",
            Self::Payload => "payload",
            Self::Storage => "storage",
            Self::Config => "config",
            Self::Other => "other",
        }
    }
}

/// Unified error type for the beauty-trends crate
#[derive(Error, Debug)]
pub enum Error {
    /// Store or upstream collector could not produce data for a run
    #[error("Source '{source_name}' unavailable: {reason}")]
    SourceUnavailable { source_name: String, reason: String },

    /// A stored item's payload could not be parsed
    #[error("Malformed payload in item '{key}': {reason}")]
    MalformedPayload { key: String, reason: String },

    /// Required external configuration is absent
    #[error("Configuration missing: {0}")]
    ConfigurationMissing(String),

    /// Configuration present but invalid
    #[error("Config error: {0}")]
    Config(String),

    /// Database errors
    #[error("Database error: {0}")]
    Database(#[source] rusqlite::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing errors
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// CSV export errors
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Generic error with context
    #[error("{context}")]
    Other {
        context: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl Error {
    /// Create a source-unavailable error
    pub fn source_unavailable(source_name: impl Into<String>, reason: impl ToString) -> Self {
        Self::SourceUnavailable {
            source_name: source_name.into(),
            reason: reason.to_string(),
        }
    }

    /// Create a malformed-payload error for the item with the given key
    pub fn malformed(key: impl Into<String>, reason: impl ToString) -> Self {
        Self::MalformedPayload {
            key: key.into(),
            reason: reason.to_string(),
        }
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a generic error with context
    pub fn other(context: impl Into<String>) -> Self {
        Self::Other {
            context: context.into(),
            source: None,
        }
    }

    /// Create a generic error with context and source
    pub fn with_source(
        context: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Other {
            context: context.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Check if the aggregation run can continue past this error
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::SourceUnavailable { .. } | Self::MalformedPayload { .. } => true,
            Self::Database(_) => true,
            Self::Io(_) | Self::Csv(_) => true,
            Self::Json(_) => true,
            Self::ConfigurationMissing(_) | Self::Config(_) | Self::Toml(_) => false,
            Self::Other { .. } => false,
        }
    }

    /// Get the error category for handling strategies
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::SourceUnavailable { .. } => ErrorCategory::Source,
            Self::MalformedPayload { .. } | Self::Json(_) => ErrorCategory::Payload,
            Self::Database(_) | Self::Io(_) | Self::Csv(_) => ErrorCategory::Storage,
            Self::ConfigurationMissing(_) | Self::Config(_) | Self::Toml(_) => {
                ErrorCategory::Config
            }
            Self::Other { .. } => ErrorCategory::Other,
        }
    }
}

// Conversion from rusqlite::Error
impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        Self::Database(err)
    }
}

/// Result type alias using the unified Error type
pub type Result<T> = std::result::Result<T, Error>;
