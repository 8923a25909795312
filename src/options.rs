//! Per-engine configuration.
//!
//! Options are plain values passed to [`LogEngine`](crate::LogEngine) at
//! construction; nothing is global. They can be built in code, or loaded from
//! TOML:
//!
//! ```toml
//! max_records = 500000
//!
//! [window]
//! skip = 10
//! first = 50
//! last = 5
//! ```
//!
//! Priority when both are used: environment > file > defaults.

use crate::error::{Error, Result};
use crate::io::source::QUICK_PATH_THRESHOLD;
use crate::window::WindowSpec;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default safety cap on records produced by one read pass.
pub const DEFAULT_MAX_RECORDS: usize = 10_000_000;

/// Environment variable overriding [`ParserOptions::max_records`].
pub const MAX_RECORDS_ENV: &str = "W3CLOG_MAX_RECORDS";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ParserOptions {
    /// Stop (and flag truncation) once this many records were produced.
    pub max_records: usize,
    /// Files smaller than this many bytes are buffered in full.
    pub quick_path_threshold: u64,
    pub window: WindowSpec,
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self {
            max_records: DEFAULT_MAX_RECORDS,
            quick_path_threshold: QUICK_PATH_THRESHOLD,
            window: WindowSpec::ALL,
        }
    }
}

impl ParserOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_max_records(mut self, max_records: usize) -> Self {
        self.max_records = max_records;
        self
    }

    #[must_use]
    pub fn with_quick_path_threshold(mut self, bytes: u64) -> Self {
        self.quick_path_threshold = bytes;
        self
    }

    #[must_use]
    pub fn with_window(mut self, window: WindowSpec) -> Self {
        self.window = window;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_records == 0 {
            return Err(Error::configuration("`max_records` must be at least 1"));
        }
        Ok(())
    }

    pub fn from_toml_str(s: &str) -> Result<Self> {
        let options: ParserOptions =
            toml::from_str(s).map_err(|e| Error::configuration(e.to_string()))?;
        options.validate()?;
        Ok(options)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            Error::configuration(format!("cannot read options {}: {e}", path.display()))
        })?;
        tracing::debug!(path = %path.display(), "loading parser options");
        Self::from_toml_str(&contents)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string(self).map_err(|e| Error::configuration(e.to_string()))
    }

    /// Apply overrides from the process environment.
    pub fn with_env_overrides(self) -> Result<Self> {
        self.with_overrides_from(|key| std::env::var(key).ok())
    }

    /// Apply overrides taken from `lookup`, keyed by environment variable name.
    pub fn with_overrides_from<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(raw) = lookup(MAX_RECORDS_ENV) {
            self.max_records = raw.trim().parse().map_err(|_| {
                Error::configuration(format!("{MAX_RECORDS_ENV}=`{raw}` is not a record count"))
            })?;
        }
        self.validate()?;
        Ok(self)
    }
}
