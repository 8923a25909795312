//! Generated log text and temporary log files.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Column list used by [`numbered_log`].
pub const NUMBERED_FIELDS: &str =
    "date time s-ip cs-method cs-uri-stem cs-uri-query s-port c-ip sc-status sc-bytes time-taken";

/// A typical IIS header followed by a `#Fields:` directive for `fields`.
#[must_use]
pub fn sample_header(fields: &str) -> String {
    format!(
        "#Software: Microsoft Internet Information Services 10.0\n\
         #Version: 1.0\n\
         #Date: 2024-01-01 00:00:00\n\
         #Fields: {fields}\n"
    )
}

/// The `i`-th line of [`numbered_log`]: URI path `/index{i}.html`, one
/// second apart, status 200.
#[must_use]
pub fn numbered_line(i: usize) -> String {
    let secs = i % 86_400;
    format!(
        "2024-01-01 {:02}:{:02}:{:02} 10.0.0.1 GET /index{i}.html - 443 192.168.1.{} 200 {} {}",
        secs / 3600,
        (secs / 60) % 60,
        secs % 60,
        i % 250,
        1024 + i,
        i % 1000,
    )
}

/// Header plus `n` data lines with URI paths `/index0.html` .. `/index{n-1}.html`.
#[must_use]
pub fn numbered_log(n: usize) -> String {
    let mut text = sample_header(NUMBERED_FIELDS);
    text.reserve(n * 96);
    for i in 0..n {
        text.push_str(&numbered_line(i));
        text.push('\n');
    }
    text
}

/// Write `contents` to `dir/name`, creating `dir` if needed.
pub fn write_log_file(dir: impl AsRef<Path>, name: &str, contents: &str) -> Result<PathBuf> {
    let dir = dir.as_ref();
    fs::create_dir_all(dir).with_context(|| format!("mkdir -p {}", dir.display()))?;
    let path = dir.join(name);
    fs::write(&path, contents).with_context(|| format!("write {}", path.display()))?;
    Ok(path)
}

/// Write `contents` to a fresh temporary directory.
///
/// Keep the returned [`TempDir`] alive for as long as the file is needed.
pub fn temp_log_file(contents: &str) -> Result<(TempDir, PathBuf)> {
    let dir = tempfile::tempdir().context("create temp dir")?;
    let path = write_log_file(dir.path(), "u_ex240101.log", contents)?;
    Ok((dir, path))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbered_lines_match_the_field_count() {
        let columns = NUMBERED_FIELDS.split(' ').count();
        for i in [0, 59, 3_599, 86_399, 100_000] {
            assert_eq!(numbered_line(i).split(' ').count(), columns, "line {i}");
        }
    }

    #[test]
    fn numbered_log_has_header_and_lines() {
        let text = numbered_log(2);
        assert!(text.contains(&format!("#Fields: {NUMBERED_FIELDS}\n")));
        assert!(text.ends_with("/index1.html - 443 192.168.1.1 200 1025 1\n"));
    }
}
