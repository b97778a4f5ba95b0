use crate::bundler::bundle;
use crate::config::{BundleManifest, BundleRequest};
use crate::error::{BundleError, Result};
use crate::logging::init_logging;
use clap::{arg, command, ArgAction, ArgMatches, Command};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use tracing::debug;

pub fn run() -> Result<()> {
    let matches = build_command().get_matches();

    init_logging(matches.get_count("verbose"));

    // Read paths from stdin if available
    let use_null_separator = matches.get_flag("null");
    let stdin_paths = read_paths_from_stdin(use_null_separator)?;

    let request = build_request(&matches, stdin_paths)?;
    debug!(
        base = %request.base_directory.display(),
        output = %request.output_path.display(),
        paths = request.relative_paths.len(),
        "starting bundle"
    );

    bundle(&request)?;
    Ok(())
}

fn build_command() -> Command {
    command!()
        .about("Concatenate a fixed list of project files into a single text bundle")
        .arg(arg!([PATHS] ... "Files to bundle, relative to the base directory").required(false))
        .arg(arg!(-b --"base-dir" <DIR> "Directory the paths are relative to [default: .]"))
        .arg(arg!(-o --output <FILE> "Bundle file to write [default: full_code.txt]"))
        .arg(arg!(-m --manifest <FILE> "TOML manifest describing the bundle"))
        .arg(arg!(-v --verbose ... "Log more to stderr").action(ArgAction::Count))
        // -0 can't be spelled through arg!, so build it by hand
        .arg(
            clap::Arg::new("null")
                .short('0')
                .long("null")
                .help("Use NUL character as separator when reading paths from stdin")
                .action(ArgAction::SetTrue),
        )
}

/// Manifest first, then flags override it, then positional and stdin paths
/// are appended after the manifest's list.
fn build_request(matches: &ArgMatches, stdin_paths: Vec<PathBuf>) -> Result<BundleRequest> {
    let mut request = match matches.get_one::<String>("manifest") {
        Some(manifest_path) => BundleManifest::load(Path::new(manifest_path))?.into_request(),
        None => BundleRequest::new(".", Vec::<PathBuf>::new()),
    };

    if let Some(base_dir) = matches.get_one::<String>("base-dir") {
        request.base_directory = PathBuf::from(base_dir);
    }
    if let Some(output_path) = matches.get_one::<String>("output") {
        request.output_path = PathBuf::from(output_path);
    }

    request.relative_paths.extend(
        matches
            .get_many::<String>("PATHS")
            .unwrap_or_default()
            .map(PathBuf::from),
    );
    request.relative_paths.extend(stdin_paths);

    Ok(request)
}

fn read_paths_from_stdin(use_null_separator: bool) -> Result<Vec<PathBuf>> {
    // Nothing to read from an interactive terminal
    if atty::is(atty::Stream::Stdin) {
        return Ok(Vec::new());
    }

    let mut content = String::new();
    io::stdin()
        .lock()
        .read_to_string(&mut content)
        .map_err(BundleError::Stdin)?;

    Ok(split_paths(&content, use_null_separator))
}

fn split_paths(content: &str, use_null_separator: bool) -> Vec<PathBuf> {
    if use_null_separator {
        content
            .split('\0')
            .filter(|s| !s.is_empty())
            .map(PathBuf::from)
            .collect()
    } else {
        content.split_whitespace().map(PathBuf::from).collect()
    }
}
