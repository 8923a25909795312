//! Parsing sets of rotated log files.
//!
//! ```no_run
//! use w3clog::ParserOptions;
//! use w3clog::io::glob::parse_glob;
//!
//! let logs = parse_glob("/var/log/iis/W3SVC1/u_ex2401*.log", &ParserOptions::default())?;
//! for log in &logs {
//!     println!("{}: {} records", log.path.display(), log.records.len());
//! }
//! # use anyhow::Error; Ok::<(), Error>(())
//! ```

use crate::engine::{LogEngine, ParsedLog};
use crate::options::ParserOptions;
use anyhow::{Context, Result, bail};
use glob::glob;
use std::path::PathBuf;
use tracing::debug;

/// Expand a glob pattern into the sorted list of matching files.
///
/// Directories are skipped. Zero matches is not an error.
///
/// # Errors
/// Returns an error if the pattern is invalid or an entry cannot be read.
pub fn expand_glob(pattern: &str) -> Result<Vec<PathBuf>> {
    let paths = glob(pattern).with_context(|| format!("invalid glob pattern: {pattern}"))?;

    let mut result = Vec::new();
    for entry in paths {
        let path =
            entry.with_context(|| format!("error reading glob entry for pattern: {pattern}"))?;
        if path.is_file() {
            result.push(path);
        }
    }

    // u_ex240101.log sorts before u_ex240102.log
    result.sort();

    Ok(result)
}

/// Like [`expand_glob`], but zero matches is an error.
///
/// # Errors
/// See [`expand_glob`]; also fails when nothing matches.
pub fn expand_glob_required(pattern: &str) -> Result<Vec<PathBuf>> {
    let files = expand_glob(pattern)?;
    if files.is_empty() {
        bail!("no files found matching pattern: {pattern}");
    }
    Ok(files)
}

/// Parse every file matching `pattern`, in sorted order.
///
/// Each file gets its own [`LogEngine`], so a schema declared in one file never
/// applies to the next, and the record cap and window are per file.
///
/// # Errors
/// Fails on the first file that cannot be opened or read; parsing stops there.
pub fn parse_glob(pattern: &str, options: &ParserOptions) -> Result<Vec<ParsedLog>> {
    let files = expand_glob(pattern)?;
    debug!(pattern, files = files.len(), "expanded log glob");
    files
        .into_iter()
        .map(|path| {
            let mut engine = LogEngine::with_options(&path, options.clone())
                .with_context(|| format!("open {}", path.display()))?;
            engine
                .collect()
                .with_context(|| format!("parse {}", path.display()))
        })
        .collect()
}
