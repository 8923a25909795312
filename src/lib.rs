//! # w3clog
//!
//! A **streaming parser** for the W3C Extended Log Format, as written by IIS and
//! compatible web servers. Files are read lazily, one read pass per call, and
//! each data line becomes a typed [`LogRecord`].
//!
//! ## Key Features
//!
//! - **Schema-driven** - `#Fields:` directives define the columns, and a later
//!   directive replaces the schema mid-file
//! - **Typed records** - well-known columns become typed fields, everything else
//!   lands in an ordered, case-insensitive [`FieldMap`]
//! - **Lenient values** - malformed numbers or timestamps never drop a record
//! - **Size-adaptive reads** - small files are buffered, large files streamed
//! - **Windowing** - skip / first / last / skip-last with bounded memory
//! - **Safety cap** - partial results plus a truncation flag
//! - **Compressed input** - gzip, zstd, bzip2 and xz (feature flags)
//! - **Export** - JSON Lines and CSV (feature flags)
//!
//! ## Quick Start
//!
//! ```no_run
//! use w3clog::{LogEngine, ParserOptions, WindowSpec};
//!
//! # fn main() -> w3clog::Result<()> {
//! let options = ParserOptions::new()
//!     .with_max_records(1_000_000)
//!     .with_window(WindowSpec::range(0, None, Some(100)));
//! let mut engine = LogEngine::with_options("u_ex240101.log", options)?;
//!
//! for record in engine.parse_all() {
//!     let record = record?;
//!     if record.status_code == Some(500) {
//!         println!("{:?} {:?}", record.timestamp, record.uri_path);
//!     }
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Core Concepts
//!
//! ### Engine
//!
//! A [`LogEngine`] is bound to one file and one [`ParserOptions`]. Every call to
//! [`LogEngine::parse_all`] starts a fresh pass with no schema; records before
//! the first `#Fields:` directive are never produced.
//!
//! ### Records
//!
//! Known columns (`date`, `time`, `cs-uri-stem`, `sc-status`, `sc-bytes`, ...)
//! are projected into typed fields. A value of `-` is absent. An integer that
//! does not parse becomes `None`; a missing or malformed timestamp becomes
//! [`LogRecord::MIN_TIMESTAMP`]. [`LegacyLogRecord`] carries the same data under
//! W3C-style field names.
//!
//! ### Windows
//!
//! A [`WindowSpec`] is either a range (`skip`, then `first`, then `last`) or a
//! `skip_last`. The adapters work on any `Iterator<Item = Result<T, E>>` through
//! [`WindowExt`]; errors pass through uncounted.
//!
//! ## Module Overview
//!
//! - [`engine`] - Read passes, the record cap and truncation
//! - [`schema`] - Directive classification and the active column list
//! - [`row`] - Tokenizing data lines into a [`FieldMap`]
//! - [`record`] - Typed projection
//! - [`window`] - Windowing adapters
//! - [`options`] - Configuration, TOML and environment overrides
//! - [`io`] - Line sources, decompression, globbing and export
//! - [`testing`] - Fixtures and assertions for tests

#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod coerce;
pub mod engine;
pub mod error;
pub mod io;
pub mod options;
pub mod record;
pub mod row;
pub mod schema;
pub mod testing;
pub mod window;

pub use engine::{LogEngine, ParsedLog, RecordReader, Records, parse_file};
pub use error::{CoercionError, Error, Result};
pub use io::glob::{expand_glob, parse_glob};
pub use io::source::{QUICK_PATH_THRESHOLD, ReadStrategy};
pub use options::{DEFAULT_MAX_RECORDS, ParserOptions};
pub use record::{KnownColumn, LegacyLogRecord, LogRecord};
pub use row::FieldMap;
pub use schema::{LogHeader, Schema};
pub use window::{WindowExt, WindowSpec};

#[cfg(feature = "io-jsonl")]
pub use io::jsonl::{write_jsonl, write_records_jsonl};

#[cfg(feature = "io-csv")]
pub use io::csv::write_records_csv;
