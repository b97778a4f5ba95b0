//! Error types for bundling runs.
//!
//! Only conditions that abort a run live here. A missing or unreadable input
//! file is not an error: it becomes an [`EntryStatus`](crate::EntryStatus)
//! and is rendered into the bundle.

use std::path::PathBuf;
use thiserror::Error;

/// Fatal errors raised while producing a bundle.
#[derive(Error, Debug)]
pub enum BundleError {
    /// The output file could not be created or truncated.
    #[error("cannot open output file {}: {source}", .path.display())]
    OutputOpen {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Writing to or flushing the output failed part way through.
    #[error("failed writing to {}: {source}", .path.display())]
    OutputWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot read manifest {}: {source}", .path.display())]
    ManifestRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid manifest {}: {source}", .path.display())]
    ManifestParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// Reading the path list from stdin failed.
    #[error("failed to read paths from stdin: {0}")]
    Stdin(#[source] std::io::Error),
}

/// Result type alias for bundling operations.
pub type Result<T> = std::result::Result<T, BundleError>;
