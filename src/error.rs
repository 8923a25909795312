//! Error taxonomy for the parsing engine.
//!
//! Only two conditions are fatal and surface as [`Error`]:
//! - [`Error::Configuration`] - raised before any record is produced
//!   (missing file, invalid options, mixed window groups).
//! - [`Error::Parse`] - an I/O failure in the middle of a read pass. Records
//!   already yielded remain valid; the sequence ends after the error.
//!
//! Field-level problems are recovered where they happen and are described by
//! [`CoercionError`], which never leaves the projector.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result alias used throughout the engine.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("configuration error: {message}")]
    Configuration { message: String },

    #[error("failed reading {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl Error {
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Error::Configuration {
            message: message.into(),
        }
    }

    pub fn parse(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Error::Parse {
            path: path.into(),
            source,
        }
    }

    /// `true` for errors raised at construction time, before any record.
    pub fn is_configuration(&self) -> bool {
        matches!(self, Error::Configuration { .. })
    }
}

/// A single column that could not be coerced to its typed field.
///
/// The projector substitutes the documented default (absent value, or the
/// minimum timestamp) and keeps the rest of the record.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoercionError {
    #[error("column `{column}`: `{value}` is not a valid {width}-bit integer")]
    Integer {
        column: &'static str,
        value: String,
        width: u8,
    },

    #[error("timestamp `{0}` does not match yyyy-MM-dd HH:mm:ss")]
    Timestamp(String),

    #[error("timestamp columns `date`/`time` are missing")]
    MissingTimestamp,
}
