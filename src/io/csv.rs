//! CSV export of parsed records.
//!
//! The header is the typed record fields followed by every open-field key seen
//! in the batch, in order of first appearance. Absent values, and the
//! timestamp sentinel, are written as empty cells.

use crate::coerce::TIMESTAMP_FORMAT;
use crate::io::compression::encoding_writer;
use crate::record::LogRecord;
use anyhow::{Context, Result};
use csv::WriterBuilder;
use std::fs::{File, create_dir_all};
use std::path::Path;

/// Typed columns, in output order.
pub const RECORD_COLUMNS: [&str; 21] = [
    "timestamp",
    "site_name",
    "computer_name",
    "server_ip",
    "http_method",
    "uri_path",
    "uri_query",
    "server_port",
    "username",
    "client_ip",
    "http_version",
    "user_agent",
    "cookie",
    "referer",
    "host",
    "status_code",
    "sub_status_code",
    "win32_status",
    "bytes_sent",
    "bytes_received",
    "time_taken_ms",
];

/// Union of open-field keys across `records`, first appearance wins.
///
/// Keys differing only in case are one column.
pub fn open_field_columns(records: &[LogRecord]) -> Vec<String> {
    let mut columns: Vec<String> = Vec::new();
    for record in records {
        for key in record.fields.keys() {
            if !columns.iter().any(|c| c.eq_ignore_ascii_case(key)) {
                columns.push(key.to_string());
            }
        }
    }
    columns
}

fn text(v: Option<&str>) -> String {
    v.unwrap_or_default().to_string()
}

fn number<N: ToString>(v: Option<N>) -> String {
    v.map(|n| n.to_string()).unwrap_or_default()
}

fn typed_row(r: &LogRecord) -> Vec<String> {
    vec![
        r.valid_timestamp()
            .map(|ts| ts.format(TIMESTAMP_FORMAT).to_string())
            .unwrap_or_default(),
        text(r.site_name.as_deref()),
        text(r.computer_name.as_deref()),
        text(r.server_ip.as_deref()),
        text(r.http_method.as_deref()),
        text(r.uri_path.as_deref()),
        text(r.uri_query.as_deref()),
        number(r.server_port),
        text(r.username.as_deref()),
        text(r.client_ip.as_deref()),
        text(r.http_version.as_deref()),
        text(r.user_agent.as_deref()),
        text(r.cookie.as_deref()),
        text(r.referer.as_deref()),
        text(r.host.as_deref()),
        number(r.status_code),
        number(r.sub_status_code),
        number(r.win32_status),
        number(r.bytes_sent),
        number(r.bytes_received),
        number(r.time_taken_ms),
    ]
}

/// Write `records` to a CSV file with a header row.
///
/// Parent directories are created as needed; a compression suffix on `path`
/// compresses the output.
///
/// # Returns
/// The number of rows written (`records.len()`).
///
/// # Errors
/// Returns an error if the file cannot be created or a row fails to write.
pub fn write_records_csv(path: impl AsRef<Path>, records: &[LogRecord]) -> Result<usize> {
    let path = path.as_ref();
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        create_dir_all(parent).with_context(|| format!("mkdir -p {}", parent.display()))?;
    }
    let f = File::create(path).with_context(|| format!("create {}", path.display()))?;
    let w = encoding_writer(f, path)
        .with_context(|| format!("setup compression for {}", path.display()))?;
    let mut wtr = WriterBuilder::new().has_headers(false).from_writer(w);

    let extra = open_field_columns(records);
    let header = RECORD_COLUMNS.iter().copied().chain(extra.iter().map(String::as_str));
    wtr.write_record(header)
        .with_context(|| format!("write CSV header to {}", path.display()))?;

    for (i, record) in records.iter().enumerate() {
        let mut row = typed_row(record);
        row.extend(extra.iter().map(|key| text(record.field(key))));
        wtr.write_record(&row)
            .with_context(|| format!("write CSV row #{} to {}", i, path.display()))?;
    }
    wtr.flush()
        .with_context(|| format!("flush {}", path.display()))?;
    Ok(records.len())
}
