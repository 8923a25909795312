//! Convert every log matching a glob into JSONL and CSV.
//!
//! ```text
//! cargo run --example export_records -- 'logs/u_ex*.log' out/
//! ```

use anyhow::{Context, Result};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use w3clog::{ParserOptions, parse_glob, write_jsonl, write_records_csv};

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let mut args = std::env::args().skip(1);
    let pattern = args.next().context("usage: export_records <glob> [out dir]")?;
    let out_dir = PathBuf::from(args.next().unwrap_or_else(|| "out".into()));

    let options = match std::env::var_os("W3CLOG_CONFIG") {
        Some(conf) => ParserOptions::from_file(conf)?,
        None => ParserOptions::default(),
    }
    .with_env_overrides()?;

    for log in parse_glob(&pattern, &options)? {
        let stem = log
            .path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "log".into());
        let jsonl = write_jsonl(out_dir.join(format!("{stem}.jsonl.gz")), &log.records)?;
        let csv = write_records_csv(out_dir.join(format!("{stem}.csv")), &log.records)?;
        tracing::info!(
            file = %log.path.display(),
            jsonl,
            csv,
            truncated = log.truncated,
            "exported"
        );
    }
    Ok(())
}
