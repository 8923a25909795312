//! Print the last N requests of a log file.
//!
//! ```text
//! RUST_LOG=w3clog=debug cargo run --example tail_window -- u_ex240101.log 20
//! ```

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;
use w3clog::{LogEngine, ParserOptions, WindowSpec};

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let mut args = std::env::args().skip(1);
    let path = args.next().context("usage: tail_window <log file> [count]")?;
    let count: usize = match args.next() {
        Some(raw) => raw.parse().with_context(|| format!("invalid count `{raw}`"))?,
        None => 10,
    };

    let options = ParserOptions::new()
        .with_window(WindowSpec::last(count))
        .with_env_overrides()?;
    let mut engine = LogEngine::with_options(&path, options)?;

    for record in engine.parse_all() {
        let r = record?;
        println!(
            "{} {} {} {}",
            r.valid_timestamp().map(|t| t.to_string()).unwrap_or_else(|| "-".into()),
            r.http_method.as_deref().unwrap_or("-"),
            r.uri_path.as_deref().unwrap_or("-"),
            r.status_code.map(|s| s.to_string()).unwrap_or_else(|| "-".into()),
        );
    }
    if engine.is_truncated() {
        eprintln!("warning: record cap reached, output covers a prefix of the file");
    }
    Ok(())
}
