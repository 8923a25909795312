use anyhow::Result;
use w3clog::options::MAX_RECORDS_ENV;
use w3clog::testing::*;
use w3clog::*;

#[test]
fn options_file_drives_the_engine() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let log = write_log_file(dir.path(), "u_ex240101.log", &numbered_log(1000))?;
    let conf = write_log_file(
        dir.path(),
        "w3clog.toml",
        "max_records = 500\n\
         quick_path_threshold = 1\n\
         \n\
         [window]\n\
         skip = 10\n\
         first = 50\n\
         last = 5\n",
    )?;

    let options = ParserOptions::from_file(&conf)?;
    let mut engine = LogEngine::with_options(&log, options)?;
    assert_eq!(engine.strategy(), ReadStrategy::Stream);
    let parsed = engine.collect()?;
    assert_eq!(parsed.records[0].uri_path.as_deref(), Some("/index55.html"));
    assert_eq!(parsed.records.len(), 5);
    // first() stopped the pass long before the cap
    assert!(!parsed.truncated);
    Ok(())
}

#[test]
fn environment_overrides_the_file() -> Result<()> {
    let options = ParserOptions::from_toml_str("max_records = 500")?
        .with_overrides_from(|key| (key == MAX_RECORDS_ENV).then(|| "3".to_string()))?;
    assert_eq!(options.max_records, 3);

    let (_dir, path) = temp_log_file(&numbered_log(10))?;
    let parsed = LogEngine::with_options(&path, options)?.collect()?;
    assert_eq!(parsed.records.len(), 3);
    assert!(parsed.truncated);
    Ok(())
}

#[test]
fn invalid_options_are_configuration_errors() {
    for doc in [
        "max_records = 0",
        "[window]\nfirst = 1\nskip_last = 1",
        "window = \"all\"",
        "threads = 4",
    ] {
        let err = ParserOptions::from_toml_str(doc).expect_err(doc);
        assert!(err.is_configuration(), "{doc}: {err}");
    }
    assert!(ParserOptions::from_file("/no/such/w3clog.toml").unwrap_err().is_configuration());
}
