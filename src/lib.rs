//! Bundle a fixed, ordered list of project files into one plain-text file.
//!
//! Each entry is written as a `name<` header, the file's content (or an
//! inline error line), and an `END OF name>` footer. Missing files get the
//! header and a not-found line only.

pub mod bundler;
pub mod cli;
pub mod config;
pub mod error;
pub mod logging;

pub use bundler::{bundle, write_bundle, BundleSummary, EntryStatus, FileEntry, ReadFailure};
pub use config::{BundleManifest, BundleRequest, DEFAULT_OUTPUT_PATH};
pub use error::{BundleError, Result};
