//! JSON Lines export of parsed records.
//!
//! One JSON object per line. Open fields serialize as a nested object under
//! `"fields"`, absent values as `null`. A `.gz`/`.zst`/`.bz2`/`.xz` suffix
//! compresses the output.

use crate::io::compression::encoding_writer;
use crate::record::LogRecord;
use anyhow::{Context, Result};
use serde::Serialize;
use std::fs::{File, create_dir_all};
use std::io::Write;
use std::path::Path;

fn create_output(path: &Path) -> Result<Box<dyn Write>> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        create_dir_all(parent).with_context(|| format!("mkdir -p {}", parent.display()))?;
    }
    let f = File::create(path).with_context(|| format!("create {}", path.display()))?;
    encoding_writer(f, path).with_context(|| format!("setup compression for {}", path.display()))
}

/// Write a typed slice as JSONL.
///
/// # Returns
/// The number of items written (`data.len()`).
///
/// # Errors
/// Returns an error if the file or its parent directories cannot be created, or
/// an item fails to serialize.
pub fn write_jsonl<T: Serialize>(path: impl AsRef<Path>, data: &[T]) -> Result<usize> {
    let path = path.as_ref();
    let mut w = create_output(path)?;
    for (i, item) in data.iter().enumerate() {
        serde_json::to_writer(&mut w, item)
            .with_context(|| format!("serialize item #{} to {}", i, path.display()))?;
        w.write_all(b"\n")?;
    }
    w.flush()?;
    Ok(data.len())
}

/// Stream records from a parse pass straight into a JSONL file.
///
/// Records are written as they arrive; the first parse error stops the export
/// and is returned, leaving the records before it in the file.
///
/// # Errors
/// Any I/O or serialization failure, or the first `Err` from `records`.
pub fn write_records_jsonl<I>(path: impl AsRef<Path>, records: I) -> Result<usize>
where
    I: IntoIterator<Item = crate::Result<LogRecord>>,
{
    let path = path.as_ref();
    let mut w = create_output(path)?;
    let mut written = 0usize;
    for record in records {
        let record = record.with_context(|| format!("export to {}", path.display()))?;
        serde_json::to_writer(&mut w, &record)
            .with_context(|| format!("serialize record #{} to {}", written, path.display()))?;
        w.write_all(b"\n")?;
        written += 1;
    }
    w.flush()?;
    Ok(written)
}
