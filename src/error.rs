use std::io;
use std::path::PathBuf;
use thiserror::Error;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Invalid search pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("{operation} failed for '{target}': {source}")]
    Network {
        operation: &'static str,
        target: String,
        #[source]
        source: BoxError,
    },

    #[error("{operation} failed for '{}': {source}", path.display())]
    FileSystem {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("File '{}' is locked by another process, retries exceeded ({retries})", path.display())]
    LockTimeout { path: PathBuf, retries: u32 },

    #[error("Destination already exists: '{}'", path.display())]
    DestinationExists { path: PathBuf },

    #[error("No matches for pattern '{pattern}' in directory '{directory}'")]
    NoMatch { pattern: String, directory: String },

    #[error("Internal consistency error: {0}")]
    InternalConsistency(String),

    #[error("Operation cancelled")]
    Cancelled,
}

impl Error {
    pub(crate) fn network(
        operation: &'static str,
        target: impl Into<String>,
        source: impl Into<BoxError>,
    ) -> Self {
        Error::Network {
            operation,
            target: target.into(),
            source: source.into(),
        }
    }

    pub(crate) fn fs(operation: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        Error::FileSystem {
            operation,
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
