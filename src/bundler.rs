use crate::config::BundleRequest;
use crate::error::{BundleError, Result};
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Why an existing file could not be bundled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadFailure {
    /// Content is not valid UTF-8.
    Encoding,
    /// Any other read error, carrying its message.
    Io(String),
}

/// Outcome of resolving and reading one requested path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryStatus {
    Found,
    Missing,
    ReadError(ReadFailure),
}

/// One requested path, resolved and read. Lives only until it is written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    pub resolved_path: PathBuf,
    pub file_name: String,
    pub status: EntryStatus,
    /// Set only when `status` is [`EntryStatus::Found`].
    pub content: Option<String>,
}

impl FileEntry {
    /// Resolve `relative_path` against `base_directory` and read it.
    ///
    /// An absolute `relative_path` replaces the base, as with [`Path::join`].
    pub fn load(base_directory: &Path, relative_path: &Path) -> Self {
        let resolved_path = base_directory.join(relative_path);
        let file_name = base_name(&resolved_path);

        if !resolved_path.exists() {
            return Self {
                resolved_path,
                file_name,
                status: EntryStatus::Missing,
                content: None,
            };
        }

        let (status, content) = match fs::read(&resolved_path) {
            Ok(bytes) => match String::from_utf8(bytes) {
                Ok(text) => (EntryStatus::Found, Some(text)),
                Err(_) => (EntryStatus::ReadError(ReadFailure::Encoding), None),
            },
            Err(e) => (EntryStatus::ReadError(ReadFailure::Io(e.to_string())), None),
        };

        Self {
            resolved_path,
            file_name,
            status,
            content,
        }
    }

    /// Write this entry's block. Missing files get no `END OF` footer.
    pub fn write_to<W: Write>(&self, out: &mut W) -> io::Result<()> {
        write!(out, "{}<\n\n", self.file_name)?;

        match &self.status {
            EntryStatus::Missing => {
                return write!(
                    out,
                    "Error: File not found - {}\n\n",
                    self.resolved_path.display()
                );
            }
            EntryStatus::Found => {
                debug_assert!(self.content.is_some(), "found entry without content");
                if let Some(content) = &self.content {
                    out.write_all(content.as_bytes())?;
                }
            }
            EntryStatus::ReadError(ReadFailure::Encoding) => {
                writeln!(
                    out,
                    "Error: Unable to read {} due to encoding issues.",
                    self.resolved_path.display()
                )?;
            }
            EntryStatus::ReadError(ReadFailure::Io(message)) => {
                writeln!(
                    out,
                    "Error: An unexpected error occurred while reading {}: {}",
                    self.file_name, message
                )?;
            }
        }

        write!(out, "\n\nEND OF {}>\n\n", self.file_name)
    }
}

/// Text after the last separator, exactly as written. `sub/..` names `..`
/// and a trailing separator names the empty string.
fn base_name(path: &Path) -> String {
    let text = path.to_string_lossy();
    match text.rfind(std::path::is_separator) {
        Some(idx) => text[idx + 1..].to_string(),
        None => text.into_owned(),
    }
}

/// What a bundling run produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BundleSummary {
    pub output_path: PathBuf,
    pub entries: usize,
    pub found: usize,
    pub missing: usize,
    pub read_errors: usize,
}

impl BundleSummary {
    fn record(&mut self, status: &EntryStatus) {
        self.entries += 1;
        match status {
            EntryStatus::Found => self.found += 1,
            EntryStatus::Missing => self.missing += 1,
            EntryStatus::ReadError(_) => self.read_errors += 1,
        }
    }
}

/// Bundle `request` into its output file and print a completion notice.
///
/// Per-file problems are written into the bundle. Only failing to open or
/// write the output file is an error.
pub fn bundle(request: &BundleRequest) -> Result<BundleSummary> {
    let file = File::create(&request.output_path).map_err(|source| BundleError::OutputOpen {
        path: request.output_path.clone(),
        source,
    })?;
    let mut out = BufWriter::new(file);

    let summary = write_bundle(request, &mut out)?;
    out.flush().map_err(|source| BundleError::OutputWrite {
        path: request.output_path.clone(),
        source,
    })?;

    info!(
        output = %summary.output_path.display(),
        entries = summary.entries,
        found = summary.found,
        missing = summary.missing,
        read_errors = summary.read_errors,
        "bundle written"
    );
    println!(
        "File extraction complete. Output saved to {}",
        request.output_path.display()
    );

    Ok(summary)
}

/// Write every entry of `request` to `out`, in order.
pub fn write_bundle<W: Write>(request: &BundleRequest, out: &mut W) -> Result<BundleSummary> {
    let mut summary = BundleSummary {
        output_path: request.output_path.clone(),
        ..BundleSummary::default()
    };

    for relative_path in &request.relative_paths {
        let entry = FileEntry::load(&request.base_directory, relative_path);

        match &entry.status {
            EntryStatus::Found => debug!(path = %entry.resolved_path.display(), "bundling file"),
            EntryStatus::Missing => {
                warn!(path = %entry.resolved_path.display(), "file not found")
            }
            EntryStatus::ReadError(ReadFailure::Encoding) => {
                warn!(path = %entry.resolved_path.display(), "file is not valid UTF-8")
            }
            EntryStatus::ReadError(ReadFailure::Io(message)) => {
                warn!(
                    path = %entry.resolved_path.display(),
                    error = %message,
                    "failed to read file"
                )
            }
        }

        entry
            .write_to(out)
            .map_err(|source| BundleError::OutputWrite {
                path: request.output_path.clone(),
                source,
            })?;
        summary.record(&entry.status);
    }

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn render(request: &BundleRequest) -> String {
        let mut out = Vec::new();
        write_bundle(request, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn found_file_is_wrapped_verbatim() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("a.txt"), "hello").unwrap();

        let request = BundleRequest::new(temp_dir.path(), ["a.txt"]);
        assert_eq!(render(&request), "a.txt<\n\nhello\n\nEND OF a.txt>\n\n");
    }

    #[test]
    fn missing_file_has_no_footer() {
        let temp_dir = TempDir::new().unwrap();

        let request = BundleRequest::new(temp_dir.path(), ["missing.txt"]);
        let expected = format!(
            "missing.txt<\n\nError: File not found - {}\n\n",
            temp_dir.path().join("missing.txt").display()
        );
        let actual = render(&request);
        assert_eq!(actual, expected);
        assert!(!actual.contains("END OF"));
    }

    #[test]
    fn invalid_utf8_reports_encoding_and_keeps_footer() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("blob.bin"), [0xff, 0xfe, 0x00]).unwrap();

        let request = BundleRequest::new(temp_dir.path(), ["blob.bin"]);
        let expected = format!(
            "blob.bin<\n\nError: Unable to read {} due to encoding issues.\n\
             \n\nEND OF blob.bin>\n\n",
            temp_dir.path().join("blob.bin").display()
        );
        assert_eq!(render(&request), expected);
    }

    #[cfg(unix)]
    #[test]
    fn directory_reports_unexpected_error() {
        let temp_dir = TempDir::new().unwrap();
        fs::create_dir(temp_dir.path().join("sub")).unwrap();

        let entry = FileEntry::load(temp_dir.path(), Path::new("sub"));
        assert!(matches!(
            entry.status,
            EntryStatus::ReadError(ReadFailure::Io(_))
        ));

        let request = BundleRequest::new(temp_dir.path(), ["sub"]);
        let actual = render(&request);
        assert!(actual
            .starts_with("sub<\n\nError: An unexpected error occurred while reading sub: "));
        assert!(actual.ends_with("\n\n\nEND OF sub>\n\n"));
    }

    #[test]
    fn parent_dir_entry_is_named_dot_dot() {
        let temp_dir = TempDir::new().unwrap();
        let sub = temp_dir.path().join("sub");
        fs::create_dir(&sub).unwrap();

        let entry = FileEntry::load(&sub, Path::new(".."));
        assert_eq!(entry.file_name, "..");
        assert_eq!(entry.resolved_path, sub.join(".."));

        let request = BundleRequest::new(&sub, [".."]);
        let actual = render(&request);
        assert!(actual.starts_with("..<\n\n"));
        assert!(actual.ends_with("\n\nEND OF ..>\n\n"));
    }

    #[test]
    fn trailing_separator_gives_empty_name() {
        let temp_dir = TempDir::new().unwrap();
        fs::create_dir(temp_dir.path().join("sub")).unwrap();

        let entry = FileEntry::load(temp_dir.path(), Path::new("sub/"));
        assert_eq!(entry.file_name, "");

        let entry = FileEntry::load(temp_dir.path(), Path::new("src/./main.rs"));
        assert_eq!(entry.file_name, "main.rs");
    }

    #[test]
    fn content_is_not_escaped() {
        let temp_dir = TempDir::new().unwrap();
        let tricky = "x.txt<\n\nEND OF x.txt>\r\n\u{feff}tail";
        fs::write(temp_dir.path().join("x.txt"), tricky).unwrap();

        let request = BundleRequest::new(temp_dir.path(), ["x.txt"]);
        assert_eq!(
            render(&request),
            format!("x.txt<\n\n{}\n\nEND OF x.txt>\n\n", tricky)
        );
    }

    #[test]
    fn entries_follow_request_order() {
        let temp_dir = TempDir::new().unwrap();
        fs::create_dir(temp_dir.path().join("src")).unwrap();
        fs::write(temp_dir.path().join("src/b.rs"), "fn b() {}").unwrap();
        fs::write(temp_dir.path().join("a.txt"), "A").unwrap();

        let request = BundleRequest::new(temp_dir.path(), ["src/b.rs", "gone.txt", "a.txt"]);
        let expected = format!(
            "b.rs<\n\nfn b() {{}}\n\nEND OF b.rs>\n\n\
             gone.txt<\n\nError: File not found - {}\n\n\
             a.txt<\n\nA\n\nEND OF a.txt>\n\n",
            temp_dir.path().join("gone.txt").display()
        );
        assert_eq!(render(&request), expected);
    }

    #[test]
    fn summary_counts_statuses() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("a.txt"), "A").unwrap();
        fs::write(temp_dir.path().join("b.bin"), [0xc3, 0x28]).unwrap();

        let request = BundleRequest::new(temp_dir.path(), ["a.txt", "b.bin", "c.txt", "a.txt"]);
        let summary = write_bundle(&request, &mut Vec::new()).unwrap();
        assert_eq!(
            summary,
            BundleSummary {
                output_path: PathBuf::from(crate::config::DEFAULT_OUTPUT_PATH),
                entries: 4,
                found: 2,
                missing: 1,
                read_errors: 1,
            }
        );
    }

    #[test]
    fn empty_request_writes_nothing() {
        let request = BundleRequest::new(".", Vec::<PathBuf>::new());
        assert_eq!(render(&request), "");
    }

    #[test]
    fn bundle_writes_output_file_idempotently() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("a.txt"), "hello").unwrap();
        let output_path = temp_dir.path().join("out.txt");

        let request = BundleRequest::new(temp_dir.path(), ["a.txt", "missing.txt"])
            .with_output_path(&output_path);
        let summary = bundle(&request).unwrap();
        assert_eq!(summary.entries, 2);
        let first = fs::read(&output_path).unwrap();

        bundle(&request).unwrap();
        let second = fs::read(&output_path).unwrap();
        assert_eq!(first, second);
        let text = String::from_utf8(first).unwrap();
        assert!(text.starts_with("a.txt<\n\nhello\n\nEND OF a.txt>\n\n"));
    }

    #[test]
    fn bundle_fails_when_output_cannot_be_opened() {
        let temp_dir = TempDir::new().unwrap();
        let request = BundleRequest::new(temp_dir.path(), ["a.txt"])
            .with_output_path(temp_dir.path().join("no_such_dir/out.txt"));

        let err = bundle(&request).unwrap_err();
        assert!(matches!(err, BundleError::OutputOpen { .. }));
    }

    struct BrokenPipe;

    impl Write for BrokenPipe {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn write_failure_aborts_run() {
        let request = BundleRequest::new(".", ["anything.txt"]);
        let err = write_bundle(&request, &mut BrokenPipe).unwrap_err();
        assert!(matches!(err, BundleError::OutputWrite { .. }));
    }
}
