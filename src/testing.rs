//! Testing utilities for code that consumes W3C logs.
//!
//! - **Fixtures**: generate log text and write it to temporary files
//! - **Assertions**: compare parsed records with expected values
//!
//! ```
//! use w3clog::LogEngine;
//! use w3clog::testing::*;
//!
//! # fn main() -> anyhow::Result<()> {
//! let (_dir, path) = temp_log_file(&numbered_log(3))?;
//! let records = LogEngine::open(&path)?.collect()?.records;
//! assert_uri_paths(&records, &["/index0.html", "/index1.html", "/index2.html"]);
//! # Ok(())
//! # }
//! ```

pub mod assertions;
pub mod fixtures;

pub use assertions::*;
pub use fixtures::*;
