//! Error types for gsw-core
//!
//! Provides a unified error type that can be converted to appropriate exit codes.

use std::path::PathBuf;

use thiserror::Error;

use crate::destination::DestinationKind;

/// Result type alias for gsw-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for gsw-core operations
#[derive(Error, Debug)]
pub enum Error {
    /// Empty or malformed destination string
    #[error("Invalid destination: {0}")]
    InvalidDestination(String),

    /// The remote client could not be constructed
    #[error("Backend unavailable: {0}")]
    BackendUnavailable(String),

    /// The local file could not be created
    #[error("Failed to create {}: {source}", path.display())]
    ResourceCreateFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The underlying resource rejected a write, flush or close
    #[error("{kind} write to '{key}' failed: {source}")]
    Io {
        kind: DestinationKind,
        key: String,
        #[source]
        source: std::io::Error,
    },

    /// Write or flush on a sink that has been closed
    #[error("Sink is closed")]
    SinkClosed,

    /// Close on a sink that has already been closed
    #[error("Sink is already closed")]
    SinkAlreadyClosed,

    /// Configuration file error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Config file could not be read or written
    #[error("Configuration IO error: {0}")]
    ConfigIo(#[from] std::io::Error),

    /// TOML parsing error
    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// TOML serialization error
    #[error("TOML serialization error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// General error
    #[error("{0}")]
    General(String),
}

impl Error {
    /// Get the appropriate exit code for this error
    pub const fn exit_code(&self) -> i32 {
        match self {
            Error::InvalidDestination(_) | Error::Config(_) => 2, // UsageError
            Error::BackendUnavailable(_) => 3,                   // BackendUnavailable
            Error::ResourceCreateFailed { .. } => 4,             // CreateFailed
            Error::Io { .. } => 5,                               // WriteFailed
            Error::SinkClosed | Error::SinkAlreadyClosed => 6,   // ContractViolation
            _ => 1,                                              // GeneralError
        }
    }

    /// Whether a caller could reasonably retry the whole operation
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Error::Io { .. })
    }
}
