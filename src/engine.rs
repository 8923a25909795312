//! The parsing engine: one log file, one schema at a time, one pass per call.
//!
//! ```no_run
//! use w3clog::{LogEngine, ParserOptions, WindowSpec};
//!
//! # fn main() -> w3clog::Result<()> {
//! let options = ParserOptions::new().with_window(WindowSpec::last(20));
//! let mut engine = LogEngine::with_options("u_ex240101.log", options)?;
//! for record in engine.parse_all() {
//!     let record = record?;
//!     println!("{:?} {:?}", record.uri_path, record.status_code);
//! }
//! if engine.is_truncated() {
//!     eprintln!("record cap reached");
//! }
//! # Ok(())
//! # }
//! ```

use crate::error::{Error, Result};
use crate::io::source::{LineSource, ReadStrategy};
use crate::options::ParserOptions;
use crate::record::{LogRecord, project};
use crate::row::tokenize;
use crate::schema::{Directive, LogHeader, Schema};
use crate::window::{WindowExt, Windowed};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Outcome of a pass that is not a record: truncation and header directives.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct PassReport {
    truncated: bool,
    header: LogHeader,
}

#[derive(Debug)]
pub struct LogEngine {
    path: PathBuf,
    options: ParserOptions,
    strategy: ReadStrategy,
    report: PassReport,
}

impl LogEngine {
    /// Open `path` with default options.
    ///
    /// # Errors
    /// [`Error::Configuration`] if `path` is not an existing file,
    /// [`Error::Parse`] if its first bytes cannot be read.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::with_options(path, ParserOptions::default())
    }

    pub fn with_options(path: impl AsRef<Path>, options: ParserOptions) -> Result<Self> {
        options.validate()?;
        let path = path.as_ref().to_path_buf();
        let meta = match std::fs::metadata(&path) {
            Ok(meta) if meta.is_file() => meta,
            Ok(_) => {
                return Err(Error::configuration(format!(
                    "{} is not a file",
                    path.display()
                )));
            }
            Err(e) => {
                return Err(Error::configuration(format!(
                    "log file {} not found: {e}",
                    path.display()
                )));
            }
        };
        let strategy = ReadStrategy::for_file(&path, meta.len(), options.quick_path_threshold)
            .map_err(|e| Error::parse(&path, e))?;
        debug!(path = %path.display(), size = meta.len(), ?strategy, "read strategy selected");
        Ok(Self {
            path,
            options,
            strategy,
            report: PassReport::default(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn options(&self) -> &ParserOptions {
        &self.options
    }

    pub fn strategy(&self) -> ReadStrategy {
        self.strategy
    }

    /// `true` if the last pass stopped at the record cap with input left.
    pub fn is_truncated(&self) -> bool {
        self.report.truncated
    }

    /// `#Software` / `#Version` / `#Date` values seen by the last pass.
    pub fn header(&self) -> &LogHeader {
        &self.report.header
    }

    /// Start a new read pass with the configured window applied.
    pub fn parse_all(&mut self) -> Records<'_> {
        let window = self.options.window;
        Records {
            inner: self.parse_unwindowed().windowed(window),
        }
    }

    /// Start a new read pass without windowing; the record cap still applies.
    pub fn parse_unwindowed(&mut self) -> RecordReader<'_> {
        self.report = PassReport::default();
        RecordReader {
            lines: LineSource::open(self.path.clone(), self.strategy),
            path: &self.path,
            max_records: self.options.max_records,
            schema: None,
            produced: 0,
            done: false,
            report: &mut self.report,
        }
    }

    /// Run a full pass and collect it.
    ///
    /// # Errors
    /// The first [`Error::Parse`] met during the pass.
    pub fn collect(&mut self) -> Result<ParsedLog> {
        let records = self.parse_all().collect::<Result<Vec<_>>>()?;
        Ok(ParsedLog {
            path: self.path.clone(),
            records,
            truncated: self.report.truncated,
            header: self.report.header.clone(),
        })
    }
}

/// A fully collected pass over one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedLog {
    pub path: PathBuf,
    pub records: Vec<LogRecord>,
    pub truncated: bool,
    pub header: LogHeader,
}

/// Parse `path` with default options.
pub fn parse_file(path: impl AsRef<Path>) -> Result<ParsedLog> {
    LogEngine::open(path)?.collect()
}

/// One read pass: lines in, capped records out.
///
/// Holds the pass state (active schema, record count) and writes truncation
/// and header information back into its [`LogEngine`].
pub struct RecordReader<'a> {
    lines: LineSource,
    path: &'a Path,
    max_records: usize,
    schema: Option<Schema>,
    produced: usize,
    done: bool,
    report: &'a mut PassReport,
}

impl RecordReader<'_> {
    pub fn is_truncated(&self) -> bool {
        self.report.truncated
    }

    pub fn header(&self) -> &LogHeader {
        &self.report.header
    }

    /// Records produced so far in this pass.
    pub fn produced(&self) -> usize {
        self.produced
    }

    pub fn schema(&self) -> Option<&Schema> {
        self.schema.as_ref()
    }

    fn finish(&mut self) {
        if !self.done {
            self.done = true;
            self.lines.close();
            debug!(
                records = self.produced,
                truncated = self.report.truncated,
                "read pass finished"
            );
        }
    }
}

impl Iterator for RecordReader<'_> {
    type Item = Result<LogRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        loop {
            let line = match self.lines.next() {
                Some(Ok(line)) => line,
                Some(Err(e)) => {
                    self.finish();
                    return Some(Err(Error::parse(self.path, e)));
                }
                None => {
                    self.finish();
                    return None;
                }
            };
            match Directive::classify(&line) {
                Directive::Fields(schema) => {
                    debug!(columns = schema.len(), "schema replaced");
                    self.schema = Some(schema);
                }
                Directive::Header(kind, value) => self.report.header.record(kind, value),
                Directive::Comment | Directive::Blank => {}
                Directive::Data(data) => {
                    let Some(schema) = self.schema.as_ref() else {
                        continue;
                    };
                    let row = tokenize(schema, data);
                    if self.produced >= self.max_records {
                        warn!(
                            path = %self.path.display(),
                            max_records = self.max_records,
                            "record cap reached; returning partial results"
                        );
                        self.report.truncated = true;
                        self.finish();
                        return None;
                    }
                    self.produced += 1;
                    return Some(Ok(project(row)));
                }
            }
        }
    }
}

/// The record sequence returned by [`LogEngine::parse_all`].
///
/// Forward-only and not restartable; call `parse_all` again for a new pass.
/// Dropping it early closes the file.
pub struct Records<'a> {
    inner: Windowed<RecordReader<'a>>,
}

impl Records<'_> {
    pub fn is_truncated(&self) -> bool {
        self.inner.get_ref().is_truncated()
    }

    pub fn header(&self) -> &LogHeader {
        self.inner.get_ref().header()
    }

    /// Records pulled from the file so far, before windowing.
    pub fn produced(&self) -> usize {
        self.inner.get_ref().produced()
    }

    /// Most records held by the window at once.
    pub fn peak_buffered(&self) -> usize {
        self.inner.peak_buffered()
    }
}

impl Iterator for Records<'_> {
    type Item = Result<LogRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }
}
