//! Read passes: schema handling, read strategies, the record cap and bounded memory.

use anyhow::Result;
use w3clog::testing::*;
use w3clog::*;

fn uris(records: &[LogRecord]) -> Vec<String> {
    records.iter().map(|r| r.uri_path.clone().unwrap_or_default()).collect()
}

#[test]
fn lines_before_the_first_schema_are_ignored() -> Result<()> {
    let text = "2024-01-01 00:00:00 /orphan\n\
                #Software: Microsoft Internet Information Services 10.0\n\
                #Fields: date time cs-uri-stem\n\
                2024-01-01 00:00:01 /kept\n";
    let (_dir, path) = temp_log_file(text)?;
    let parsed = parse_file(&path)?;
    assert_uri_paths(&parsed.records, &["/kept"]);
    Ok(())
}

#[test]
fn second_fields_directive_replaces_the_schema() -> Result<()> {
    let text = "#Fields: date time cs-uri-stem sc-status\n\
                2024-01-01 00:00:00 /a 200\n\
                #fields: sc-status cs-uri-stem X-New\n\
                404 /b extra\n";
    let (_dir, path) = temp_log_file(text)?;
    let records = parse_file(&path)?.records;
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].status_code, Some(200));
    assert_eq!(records[1].status_code, Some(404));
    assert_eq!(records[1].uri_path.as_deref(), Some("/b"));
    assert_eq!(records[1].field("X-New"), Some("extra"));
    // no date/time under the second schema
    assert_eq!(records[1].timestamp, Some(LogRecord::MIN_TIMESTAMP));
    Ok(())
}

#[test]
fn comments_blank_lines_and_crlf() -> Result<()> {
    let text = "#Version: 1.0\r\n\
                #Fields: date time cs-uri-stem sc-status\r\n\
                # a comment\r\n\
                \r\n\
                2024-01-01 00:00:00 /a 200\r\n\
                #Remark: rotated\r\n\
                2024-01-01 00:00:01 /b 500\r\n";
    let (_dir, path) = temp_log_file(text)?;
    let parsed = parse_file(&path)?;
    assert_uri_paths(&parsed.records, &["/a", "/b"]);
    assert_eq!(parsed.records[1].status_code, Some(500));
    assert_eq!(parsed.header.version.as_deref(), Some("1.0"));
    Ok(())
}

#[test]
fn both_strategies_produce_identical_records() -> Result<()> {
    let text = format!("{}\r\n#Fields: cs-uri-stem\r\n/tail\r\n", numbered_log(500).trim_end());
    let (_dir, path) = temp_log_file(&text)?;

    let mut quick = LogEngine::open(&path)?;
    let mut stream =
        LogEngine::with_options(&path, ParserOptions::new().with_quick_path_threshold(1))?;
    assert_eq!(quick.strategy(), ReadStrategy::Quick);
    assert_eq!(stream.strategy(), ReadStrategy::Stream);

    let a = quick.collect()?;
    let b = stream.collect()?;
    assert_eq!(a.records.len(), 501);
    assert_eq!(a.records, b.records);
    assert_eq!(a.header, b.header);
    Ok(())
}

#[test]
fn truncation_flag_follows_the_cap() -> Result<()> {
    let (_dir, path) = temp_log_file(&numbered_log(100))?;

    let mut capped = LogEngine::with_options(&path, ParserOptions::new().with_max_records(30))?;
    let parsed = capped.collect()?;
    assert_eq!(parsed.records.len(), 30);
    assert!(parsed.truncated);
    assert_eq!(uris(&parsed.records).last().map(String::as_str), Some("/index29.html"));

    let mut exact = LogEngine::with_options(&path, ParserOptions::new().with_max_records(100))?;
    assert!(!exact.collect()?.truncated);

    assert!(!parse_file(&path)?.truncated);
    Ok(())
}

#[test]
fn window_memory_stays_bounded() -> Result<()> {
    let (_dir, path) = temp_log_file(&numbered_log(100_000))?;
    let streaming = ParserOptions::new().with_quick_path_threshold(1);

    let options = streaming.clone().with_window(WindowSpec::last(7));
    let mut engine = LogEngine::with_options(&path, options)?;
    let mut records = engine.parse_all();
    let tail: Vec<_> = records.by_ref().collect::<w3clog::Result<_>>()?;
    assert_eq!(tail.len(), 7);
    assert_eq!(tail[6].uri_path.as_deref(), Some("/index99999.html"));
    assert_eq!(records.produced(), 100_000);
    assert!(records.peak_buffered() <= 7);
    drop(records);

    let options = streaming.with_window(WindowSpec::skip_last(12));
    let mut engine = LogEngine::with_options(&path, options)?;
    let mut records = engine.parse_all();
    let mut count = 0usize;
    for record in records.by_ref() {
        record?;
        count += 1;
    }
    assert_eq!(count, 100_000 - 12);
    assert!(records.peak_buffered() <= 13);
    Ok(())
}

#[test]
fn first_stops_reading_early() -> Result<()> {
    let (_dir, path) = temp_log_file(&numbered_log(10_000))?;
    let options = ParserOptions::new()
        .with_quick_path_threshold(1)
        .with_window(WindowSpec::first(5));
    let mut engine = LogEngine::with_options(&path, options)?;
    let mut records = engine.parse_all();
    assert_eq!(records.by_ref().count(), 5);
    assert_eq!(records.produced(), 5);
    Ok(())
}

#[test]
fn abandoned_pass_releases_the_file() -> Result<()> {
    let (dir, path) = temp_log_file(&numbered_log(1_000))?;
    let options = ParserOptions::new().with_quick_path_threshold(1);
    let mut engine = LogEngine::with_options(&path, options)?;
    {
        let mut records = engine.parse_all();
        assert!(records.next().is_some());
    }
    std::fs::remove_file(&path)?;
    assert!(!path.exists());

    // a fresh pass on the removed file now fails on the first pull
    let first = engine.parse_all().next();
    assert!(matches!(first, Some(Err(Error::Parse { .. }))));
    drop(dir);
    Ok(())
}

#[test]
fn each_pass_starts_fresh() -> Result<()> {
    let text = format!("{}#Fields: cs-uri-stem X-Late\n/late v\n", numbered_log(3));
    let (_dir, path) = temp_log_file(&text)?;
    let mut engine = LogEngine::open(&path)?;
    let first = engine.collect()?;
    let second = engine.collect()?;
    assert_eq!(first.records.len(), 4);
    assert_eq!(first.records, second.records);
    assert_eq!(second.records[0].uri_path.as_deref(), Some("/index0.html"));
    Ok(())
}
