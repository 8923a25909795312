#![cfg(feature = "io-jsonl")]

use anyhow::Result;
use w3clog::testing::*;
use w3clog::*;

#[test]
fn export_a_windowed_pass() -> Result<()> {
    let text = format!(
        "{}#Fields: date time cs-uri-stem sc-status X-Forwarded-For\n\
         2024-01-02 03:04:05 /proxied 502 10.1.1.1\n",
        numbered_log(20)
    );
    let (dir, path) = temp_log_file(&text)?;
    let options = ParserOptions::new().with_window(WindowSpec::last(3));
    let mut engine = LogEngine::with_options(&path, options)?;

    let out = dir.path().join("export/records.jsonl");
    assert_eq!(write_records_jsonl(&out, engine.parse_all())?, 3);

    let values: Vec<serde_json::Value> = std::fs::read_to_string(&out)?
        .lines()
        .map(serde_json::from_str)
        .collect::<std::result::Result<_, _>>()?;
    assert_eq!(values[0]["uri_path"], "/index18.html");
    assert_eq!(values[0]["fields"], serde_json::json!({}));
    assert_eq!(values[2]["uri_path"], "/proxied");
    assert_eq!(values[2]["status_code"], 502);
    assert_eq!(values[2]["timestamp"], "2024-01-02T03:04:05");
    assert_eq!(values[2]["fields"]["X-Forwarded-For"], "10.1.1.1");
    Ok(())
}

#[test]
fn exported_records_read_back() -> Result<()> {
    let (dir, path) = temp_log_file(&numbered_log(5))?;
    let parsed = parse_file(&path)?;
    let out = dir.path().join("records.jsonl");
    write_jsonl(&out, &parsed.records)?;

    let back: Vec<LogRecord> = std::fs::read_to_string(&out)?
        .lines()
        .map(serde_json::from_str)
        .collect::<std::result::Result<_, _>>()?;
    assert_eq!(back, parsed.records);
    Ok(())
}

#[test]
fn legacy_shape_uses_w3c_names() -> Result<()> {
    let (dir, path) = temp_log_file(&numbered_log(1))?;
    let legacy: Vec<LegacyLogRecord> = parse_file(&path)?
        .records
        .into_iter()
        .map(LogRecord::into_legacy)
        .collect();
    let out = dir.path().join("legacy.jsonl");
    write_jsonl(&out, &legacy)?;

    let value: serde_json::Value = serde_json::from_str(std::fs::read_to_string(&out)?.trim())?;
    assert_eq!(value["cs-uri-stem"], "/index0.html");
    assert_eq!(value["sc-status"], 200);
    assert_eq!(value["date-time"], "2024-01-01T00:00:00");
    Ok(())
}
