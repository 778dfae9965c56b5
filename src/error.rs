//! Error types
//!
//! Runtime conditions the game recovers from (or reports once at startup).
//! Broken invariants are panics, not variants here.

use std::path::PathBuf;

use thiserror::Error;

/// A wire line that could not be turned into a command
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProtocolError {
    #[error("empty line")]
    Empty,
    #[error("unknown command `{0}`")]
    UnknownCommand(String),
    #[error("`{command}` is missing its {field} token")]
    MissingToken {
        command: &'static str,
        field: &'static str,
    },
    #[error("`{token}` is not a valid {field}")]
    BadNumber { field: &'static str, token: String },
    #[error("`{command}` has trailing token `{token}`")]
    TrailingToken {
        command: &'static str,
        token: String,
    },
}

/// Connection-level failures
#[derive(Error, Debug)]
pub enum NetError {
    #[error("network I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed handshake line `{0}`")]
    Handshake(String),
    #[error("connection closed during handshake")]
    Closed,
}

/// Startup asset loading failures
#[derive(Error, Debug)]
pub enum AssetError {
    #[error("missing assets in {dir}: {}", .missing.join(", "))]
    Missing { dir: PathBuf, missing: Vec<String> },
    #[error("failed to read asset {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Settings file failures
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read settings {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid settings {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
