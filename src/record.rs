//! Typed log records and the projection from a tokenized row.
//!
//! Known W3C columns become typed [`LogRecord`] fields. Every other column is
//! kept verbatim in the record's open [`FieldMap`]. The two sets never
//! overlap: a known column name is never a key of the open map.

use crate::coerce::{parse_i32, parse_i64, parse_timestamp};
use crate::row::FieldMap;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use tracing::trace;

/// Standard W3C columns with a typed home on [`LogRecord`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KnownColumn {
    Date,
    Time,
    SiteName,
    ComputerName,
    ServerIp,
    HttpMethod,
    UriPath,
    UriQuery,
    ServerPort,
    Username,
    ClientIp,
    HttpVersion,
    UserAgent,
    Cookie,
    Referer,
    Host,
    StatusCode,
    SubStatusCode,
    Win32Status,
    BytesSent,
    BytesReceived,
    TimeTaken,
}

impl KnownColumn {
    pub const ALL: [KnownColumn; 22] = [
        KnownColumn::Date,
        KnownColumn::Time,
        KnownColumn::SiteName,
        KnownColumn::ComputerName,
        KnownColumn::ServerIp,
        KnownColumn::HttpMethod,
        KnownColumn::UriPath,
        KnownColumn::UriQuery,
        KnownColumn::ServerPort,
        KnownColumn::Username,
        KnownColumn::ClientIp,
        KnownColumn::HttpVersion,
        KnownColumn::UserAgent,
        KnownColumn::Cookie,
        KnownColumn::Referer,
        KnownColumn::Host,
        KnownColumn::StatusCode,
        KnownColumn::SubStatusCode,
        KnownColumn::Win32Status,
        KnownColumn::BytesSent,
        KnownColumn::BytesReceived,
        KnownColumn::TimeTaken,
    ];

    /// The W3C column name as it appears in a `#Fields:` directive.
    pub fn name(self) -> &'static str {
        match self {
            KnownColumn::Date => "date",
            KnownColumn::Time => "time",
            KnownColumn::SiteName => "s-sitename",
            KnownColumn::ComputerName => "s-computername",
            KnownColumn::ServerIp => "s-ip",
            KnownColumn::HttpMethod => "cs-method",
            KnownColumn::UriPath => "cs-uri-stem",
            KnownColumn::UriQuery => "cs-uri-query",
            KnownColumn::ServerPort => "s-port",
            KnownColumn::Username => "cs-username",
            KnownColumn::ClientIp => "c-ip",
            KnownColumn::HttpVersion => "cs-version",
            KnownColumn::UserAgent => "cs(User-Agent)",
            KnownColumn::Cookie => "cs(Cookie)",
            KnownColumn::Referer => "cs(Referer)",
            KnownColumn::Host => "cs-host",
            KnownColumn::StatusCode => "sc-status",
            KnownColumn::SubStatusCode => "sc-substatus",
            KnownColumn::Win32Status => "sc-win32-status",
            KnownColumn::BytesSent => "sc-bytes",
            KnownColumn::BytesReceived => "cs-bytes",
            KnownColumn::TimeTaken => "time-taken",
        }
    }

    /// Case-insensitive lookup of a column name.
    pub fn lookup(column: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|k| k.name().eq_ignore_ascii_case(column))
    }
}

/// `true` if `column` maps to a typed [`LogRecord`] field.
pub fn is_known_column(column: &str) -> bool {
    KnownColumn::lookup(column).is_some()
}

/// One parsed data line.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogRecord {
    /// `date` + `time`. Records produced by the projector always carry a
    /// value; it is [`LogRecord::MIN_TIMESTAMP`] when the columns were missing
    /// or malformed.
    pub timestamp: Option<NaiveDateTime>,
    pub site_name: Option<String>,
    pub computer_name: Option<String>,
    pub server_ip: Option<String>,
    pub http_method: Option<String>,
    pub uri_path: Option<String>,
    pub uri_query: Option<String>,
    pub server_port: Option<i32>,
    pub username: Option<String>,
    pub client_ip: Option<String>,
    pub http_version: Option<String>,
    pub user_agent: Option<String>,
    pub cookie: Option<String>,
    pub referer: Option<String>,
    pub host: Option<String>,
    pub status_code: Option<i32>,
    pub sub_status_code: Option<i32>,
    pub win32_status: Option<i64>,
    pub bytes_sent: Option<i64>,
    pub bytes_received: Option<i64>,
    pub time_taken_ms: Option<i64>,
    /// Every schema column outside the known set, verbatim.
    pub fields: FieldMap,
}

impl LogRecord {
    /// Sentinel for a timestamp that could not be parsed.
    pub const MIN_TIMESTAMP: NaiveDateTime = NaiveDateTime::MIN;

    /// The timestamp unless it is missing or the sentinel.
    pub fn valid_timestamp(&self) -> Option<NaiveDateTime> {
        self.timestamp.filter(|ts| *ts != Self::MIN_TIMESTAMP)
    }

    /// Value of an open field; `None` both for unknown keys and `-` values.
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.value(name)
    }

    pub fn into_legacy(self) -> LegacyLogRecord {
        LegacyLogRecord::from(self)
    }
}

/// Project a tokenized row into a [`LogRecord`].
///
/// Coercion failures are recovered per field; the record is always produced.
pub fn project(row: FieldMap) -> LogRecord {
    let mut rec = LogRecord::default();
    let mut date = None;
    let mut time = None;
    let mut fields = FieldMap::new();

    for (column, value) in row {
        let Some(known) = KnownColumn::lookup(&column) else {
            fields.insert(column, value);
            continue;
        };
        match known {
            KnownColumn::Date => date = value,
            KnownColumn::Time => time = value,
            KnownColumn::SiteName => rec.site_name = value,
            KnownColumn::ComputerName => rec.computer_name = value,
            KnownColumn::ServerIp => rec.server_ip = value,
            KnownColumn::HttpMethod => rec.http_method = value,
            KnownColumn::UriPath => rec.uri_path = value,
            KnownColumn::UriQuery => rec.uri_query = value,
            KnownColumn::ServerPort => rec.server_port = int32(known, value),
            KnownColumn::Username => rec.username = value,
            KnownColumn::ClientIp => rec.client_ip = value,
            KnownColumn::HttpVersion => rec.http_version = value,
            KnownColumn::UserAgent => rec.user_agent = value,
            KnownColumn::Cookie => rec.cookie = value,
            KnownColumn::Referer => rec.referer = value,
            KnownColumn::Host => rec.host = value,
            KnownColumn::StatusCode => rec.status_code = int32(known, value),
            KnownColumn::SubStatusCode => rec.sub_status_code = int32(known, value),
            KnownColumn::Win32Status => rec.win32_status = int64(known, value),
            KnownColumn::BytesSent => rec.bytes_sent = int64(known, value),
            KnownColumn::BytesReceived => rec.bytes_received = int64(known, value),
            KnownColumn::TimeTaken => rec.time_taken_ms = int64(known, value),
        }
    }

    let ts = parse_timestamp(date.as_deref(), time.as_deref()).unwrap_or_else(|e| {
        trace!(error = %e, "timestamp recovered with sentinel");
        LogRecord::MIN_TIMESTAMP
    });
    rec.timestamp = Some(ts);
    rec.fields = fields;
    rec
}

fn int32(column: KnownColumn, value: Option<String>) -> Option<i32> {
    let raw = value?;
    parse_i32(column.name(), &raw)
        .map_err(|e| trace!(error = %e, "field coercion recovered as absent"))
        .ok()
}

fn int64(column: KnownColumn, value: Option<String>) -> Option<i64> {
    let raw = value?;
    parse_i64(column.name(), &raw)
        .map_err(|e| trace!(error = %e, "field coercion recovered as absent"))
        .ok()
}

/// [`LogRecord`] under its W3C column names.
///
/// Carries exactly the same data; only the naming differs, both in Rust and
/// in serialized form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegacyLogRecord {
    #[serde(rename = "date-time")]
    pub date_time: Option<NaiveDateTime>,
    #[serde(rename = "s-sitename")]
    pub s_sitename: Option<String>,
    #[serde(rename = "s-computername")]
    pub s_computername: Option<String>,
    #[serde(rename = "s-ip")]
    pub s_ip: Option<String>,
    #[serde(rename = "cs-method")]
    pub cs_method: Option<String>,
    #[serde(rename = "cs-uri-stem")]
    pub cs_uri_stem: Option<String>,
    #[serde(rename = "cs-uri-query")]
    pub cs_uri_query: Option<String>,
    #[serde(rename = "s-port")]
    pub s_port: Option<i32>,
    #[serde(rename = "cs-username")]
    pub cs_username: Option<String>,
    #[serde(rename = "c-ip")]
    pub c_ip: Option<String>,
    #[serde(rename = "cs-version")]
    pub cs_version: Option<String>,
    #[serde(rename = "cs(User-Agent)")]
    pub cs_user_agent: Option<String>,
    #[serde(rename = "cs(Cookie)")]
    pub cs_cookie: Option<String>,
    #[serde(rename = "cs(Referer)")]
    pub cs_referer: Option<String>,
    #[serde(rename = "cs-host")]
    pub cs_host: Option<String>,
    #[serde(rename = "sc-status")]
    pub sc_status: Option<i32>,
    #[serde(rename = "sc-substatus")]
    pub sc_substatus: Option<i32>,
    #[serde(rename = "sc-win32-status")]
    pub sc_win32_status: Option<i64>,
    #[serde(rename = "sc-bytes")]
    pub sc_bytes: Option<i64>,
    #[serde(rename = "cs-bytes")]
    pub cs_bytes: Option<i64>,
    #[serde(rename = "time-taken")]
    pub time_taken: Option<i64>,
    pub fields: FieldMap,
}

impl From<LogRecord> for LegacyLogRecord {
    fn from(r: LogRecord) -> Self {
        Self {
            date_time: r.timestamp,
            s_sitename: r.site_name,
            s_computername: r.computer_name,
            s_ip: r.server_ip,
            cs_method: r.http_method,
            cs_uri_stem: r.uri_path,
            cs_uri_query: r.uri_query,
            s_port: r.server_port,
            cs_username: r.username,
            c_ip: r.client_ip,
            cs_version: r.http_version,
            cs_user_agent: r.user_agent,
            cs_cookie: r.cookie,
            cs_referer: r.referer,
            cs_host: r.host,
            sc_status: r.status_code,
            sc_substatus: r.sub_status_code,
            sc_win32_status: r.win32_status,
            sc_bytes: r.bytes_sent,
            cs_bytes: r.bytes_received,
            time_taken: r.time_taken_ms,
            fields: r.fields,
        }
    }
}

impl From<LegacyLogRecord> for LogRecord {
    fn from(r: LegacyLogRecord) -> Self {
        Self {
            timestamp: r.date_time,
            site_name: r.s_sitename,
            computer_name: r.s_computername,
            server_ip: r.s_ip,
            http_method: r.cs_method,
            uri_path: r.cs_uri_stem,
            uri_query: r.cs_uri_query,
            server_port: r.s_port,
            username: r.cs_username,
            client_ip: r.c_ip,
            http_version: r.cs_version,
            user_agent: r.cs_user_agent,
            cookie: r.cs_cookie,
            referer: r.cs_referer,
            host: r.cs_host,
            status_code: r.sc_status,
            sub_status_code: r.sc_substatus,
            win32_status: r.sc_win32_status,
            bytes_sent: r.sc_bytes,
            bytes_received: r.cs_bytes,
            time_taken_ms: r.time_taken,
            fields: r.fields,
        }
    }
}
