//! Bundle configuration: the [`BundleRequest`] handed to the bundler and the
//! TOML manifest it can be loaded from.
//!
//! # Example manifest
//!
//! ```toml
//! base_directory = "/home/me/projects/quiz"
//! output_path = "quiz_bundle.txt"
//! relative_paths = [
//!     "src/components/AnimeCard.tsx",
//!     "App.tsx",
//! ]
//! ```

use crate::error::{BundleError, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Output file used when none is configured, relative to the working directory.
pub const DEFAULT_OUTPUT_PATH: &str = "full_code.txt";

/// Everything one bundling run needs. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleRequest {
    /// Root every relative path is joined onto.
    pub base_directory: PathBuf,
    /// Files to bundle, in output order. Duplicates are bundled twice.
    pub relative_paths: Vec<PathBuf>,
    /// Where the bundle is written. Resolved against the current working
    /// directory, not `base_directory`.
    pub output_path: PathBuf,
}

impl BundleRequest {
    pub fn new<B, I, P>(base_directory: B, relative_paths: I) -> Self
    where
        B: Into<PathBuf>,
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            base_directory: base_directory.into(),
            relative_paths: relative_paths.into_iter().map(Into::into).collect(),
            output_path: PathBuf::from(DEFAULT_OUTPUT_PATH),
        }
    }

    pub fn with_output_path(mut self, output_path: impl Into<PathBuf>) -> Self {
        self.output_path = output_path.into();
        self
    }
}

/// On-disk form of a [`BundleRequest`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BundleManifest {
    #[serde(default)]
    pub base_directory: Option<PathBuf>,
    #[serde(default)]
    pub relative_paths: Vec<PathBuf>,
    #[serde(default)]
    pub output_path: Option<PathBuf>,
}

impl BundleManifest {
    /// Read and parse a TOML manifest.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path).map_err(|source| BundleError::ManifestRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&raw, path)
    }

    fn parse(raw: &str, path: &Path) -> Result<Self> {
        toml::from_str(raw).map_err(|source| BundleError::ManifestParse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Fill in defaults: base directory `.`, output [`DEFAULT_OUTPUT_PATH`].
    pub fn into_request(self) -> BundleRequest {
        let request = BundleRequest::new(
            self.base_directory.unwrap_or_else(|| PathBuf::from(".")),
            self.relative_paths,
        );
        match self.output_path {
            Some(output_path) => request.with_output_path(output_path),
            None => request,
        }
    }
}
