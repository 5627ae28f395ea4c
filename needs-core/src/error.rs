//! Error types for needs operations

use std::path::PathBuf;
use thiserror::Error;

/// Errors that callers may want to match on
#[derive(Error, Debug)]
pub enum NeedsError {
    #[error("Unknown need field: {0}")]
    UnknownField(String),

    #[error("Unknown output format: {0}")]
    UnknownFormat(String),

    #[error("Failed to read config file {path:?}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path:?}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}
