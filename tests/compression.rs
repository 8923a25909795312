#[cfg(any(
    feature = "compression-gzip",
    feature = "compression-zstd",
    feature = "compression-bzip2",
    feature = "compression-xz"
))]
mod compression_tests {
    use anyhow::Result;
    use std::io::Write;
    use std::path::{Path, PathBuf};
    use w3clog::io::compression::encoding_writer;
    use w3clog::testing::*;
    use w3clog::*;

    fn write_compressed(dir: &Path, name: &str, text: &str) -> Result<PathBuf> {
        let path = dir.join(name);
        let mut w = encoding_writer(std::fs::File::create(&path)?, &path)?;
        w.write_all(text.as_bytes())?;
        w.flush()?;
        drop(w);
        Ok(path)
    }

    fn check_round_trip(name: &str) -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = write_compressed(dir.path(), name, &numbered_log(200))?;
        for threshold in [u64::MAX, 1] {
            let options = ParserOptions::new()
                .with_quick_path_threshold(threshold)
                .with_window(WindowSpec::last(2));
            let mut engine = LogEngine::with_options(&path, options)?;
            assert_eq!(engine.strategy(), ReadStrategy::Stream, "{name}");
            let records = engine.collect()?.records;
            assert_uri_paths(&records, &["/index198.html", "/index199.html"]);
        }
        Ok(())
    }

    #[cfg(feature = "compression-gzip")]
    #[test]
    fn gzip_log() -> Result<()> {
        check_round_trip("u_ex240101.log.gz")
    }

    #[cfg(feature = "compression-zstd")]
    #[test]
    fn zstd_log() -> Result<()> {
        check_round_trip("u_ex240101.log.zst")
    }

    #[cfg(feature = "compression-bzip2")]
    #[test]
    fn bzip2_log() -> Result<()> {
        check_round_trip("u_ex240101.log.bz2")
    }

    #[cfg(feature = "compression-xz")]
    #[test]
    fn xz_log() -> Result<()> {
        check_round_trip("u_ex240101.log.xz")
    }

    #[cfg(feature = "compression-gzip")]
    #[test]
    fn renamed_gzip_is_detected_by_magic() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let gz = write_compressed(dir.path(), "u_ex240101.log.gz", &numbered_log(3))?;
        let renamed = dir.path().join("u_ex240101.log");
        std::fs::rename(&gz, &renamed)?;
        let engine = LogEngine::with_options(&renamed, ParserOptions::new())?;
        assert_eq!(engine.strategy(), ReadStrategy::Stream);
        assert_uri_paths(
            &parse_file(&renamed)?.records,
            &["/index0.html", "/index1.html", "/index2.html"],
        );
        Ok(())
    }
}
