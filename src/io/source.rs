//! Size-adaptive line source.
//!
//! ```text
//! Start --(size < threshold)--> Quick  --+
//!   |                                    +--> Exhausted
//!   +---(size >= threshold)---> Stream --+
//! ```
//!
//! `Quick` reads the whole file into memory on the first pull and closes it
//! immediately; `Stream` keeps a shared-read handle open and reads one line
//! per pull. Either way nothing touches storage before the first `next()`,
//! and the handle is released exactly once: when the source reaches
//! `Exhausted`, fails, or is dropped.
//!
//! Compressed files always take the `Stream` path. A UTF-8 byte order mark in
//! front of the first line is removed on both paths.

use crate::io::compression::{decoding_reader, is_compressed};
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::{self, BufRead, Read};
use std::path::{Path, PathBuf};
use tracing::debug;

/// File size at which the engine switches from buffering to streaming.
pub const QUICK_PATH_THRESHOLD: u64 = 50 * 1024 * 1024;

const BYTE_ORDER_MARK: char = '\u{feff}';

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReadStrategy {
    /// Buffer every line, then iterate the buffer.
    Quick,
    /// Single forward pass, one line in memory at a time.
    Stream,
}

impl ReadStrategy {
    #[inline]
    pub fn for_size(len: u64, threshold: u64) -> Self {
        if len < threshold {
            ReadStrategy::Quick
        } else {
            ReadStrategy::Stream
        }
    }

    /// Strategy for the file at `path` of length `len`.
    ///
    /// Compressed input is always streamed: its size on disk does not bound
    /// the decoded size.
    pub fn for_file(path: &Path, len: u64, threshold: u64) -> io::Result<Self> {
        if is_compressed(path)? {
            return Ok(ReadStrategy::Stream);
        }
        Ok(Self::for_size(len, threshold))
    }
}

enum Input {
    Path(PathBuf),
    Reader(Box<dyn Read>),
}

enum State {
    Start(Input, ReadStrategy),
    Quick(std::vec::IntoIter<String>),
    Stream(Box<dyn BufRead>),
    Exhausted,
}

/// Lazy sequence of lines behind either read strategy.
///
/// Lines are yielded without their terminator (`\n` or `\r\n`). Invalid UTF-8
/// is replaced rather than reported.
pub struct LineSource {
    state: State,
    at_start: bool,
}

impl LineSource {
    pub fn open(path: impl Into<PathBuf>, strategy: ReadStrategy) -> Self {
        Self {
            state: State::Start(Input::Path(path.into()), strategy),
            at_start: true,
        }
    }

    /// Read lines from an arbitrary reader, decoding compressed input by magic bytes.
    pub fn from_reader<R: Read + 'static>(reader: R, strategy: ReadStrategy) -> Self {
        Self {
            state: State::Start(Input::Reader(Box::new(reader)), strategy),
            at_start: true,
        }
    }

    /// Release the underlying handle; further pulls yield nothing.
    pub fn close(&mut self) {
        self.state = State::Exhausted;
    }

    pub fn is_exhausted(&self) -> bool {
        matches!(self.state, State::Exhausted)
    }

    fn start(input: Input, strategy: ReadStrategy) -> io::Result<State> {
        let reader = match input {
            Input::Path(path) => {
                let file = open_shared(&path)?;
                decoding_reader(file, &path)?
            }
            Input::Reader(reader) => decoding_reader(reader, "")?,
        };
        match strategy {
            ReadStrategy::Quick => {
                let lines = buffer_lines(reader)?;
                debug!(lines = lines.len(), "quick path buffered input");
                Ok(State::Quick(lines.into_iter()))
            }
            ReadStrategy::Stream => Ok(State::Stream(reader)),
        }
    }

    fn pull(&mut self) -> Option<io::Result<String>> {
        loop {
            match &mut self.state {
                State::Start(..) => {
                    let State::Start(input, strategy) =
                        std::mem::replace(&mut self.state, State::Exhausted)
                    else {
                        unreachable!("state checked above")
                    };
                    match Self::start(input, strategy) {
                        Ok(next) => self.state = next,
                        Err(e) => return Some(Err(e)),
                    }
                }
                State::Quick(lines) => {
                    let line = lines.next();
                    if line.is_none() {
                        self.state = State::Exhausted;
                    }
                    return line.map(Ok);
                }
                State::Stream(reader) => {
                    return match read_line_lossy(reader.as_mut()) {
                        Ok(Some(line)) => Some(Ok(line)),
                        Ok(None) => {
                            self.state = State::Exhausted;
                            None
                        }
                        Err(e) => {
                            self.state = State::Exhausted;
                            Some(Err(e))
                        }
                    };
                }
                State::Exhausted => return None,
            }
        }
    }
}

impl Iterator for LineSource {
    type Item = io::Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        let mut line = match self.pull()? {
            Ok(line) => line,
            Err(e) => return Some(Err(e)),
        };
        if std::mem::take(&mut self.at_start) && line.starts_with(BYTE_ORDER_MARK) {
            line.drain(..BYTE_ORDER_MARK.len_utf8());
        }
        Some(Ok(line))
    }
}

/// Open `path` for reading without blocking concurrent writers or readers.
pub fn open_shared(path: &Path) -> io::Result<File> {
    let mut options = OpenOptions::new();
    options.read(true);
    #[cfg(windows)]
    {
        use std::os::windows::fs::OpenOptionsExt;
        // FILE_SHARE_READ | FILE_SHARE_WRITE | FILE_SHARE_DELETE
        options.share_mode(0x1 | 0x2 | 0x4);
    }
    options.open(path)
}

fn buffer_lines(mut reader: Box<dyn BufRead>) -> io::Result<Vec<String>> {
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes)?;
    drop(reader);

    let mut lines: Vec<String> = bytes
        .split(|b| *b == b'\n')
        .map(|raw| decode_line(raw.strip_suffix(b"\r").unwrap_or(raw)))
        .collect();
    // a trailing newline leaves one empty segment behind
    if bytes.last() == Some(&b'\n') || bytes.is_empty() {
        lines.pop();
    }
    Ok(lines)
}

fn read_line_lossy(reader: &mut dyn BufRead) -> io::Result<Option<String>> {
    let mut buf = Vec::new();
    if reader.read_until(b'\n', &mut buf)? == 0 {
        return Ok(None);
    }
    if buf.last() == Some(&b'\n') {
        buf.pop();
        if buf.last() == Some(&b'\r') {
            buf.pop();
        }
    }
    Ok(Some(decode_line(&buf)))
}

fn decode_line(raw: &[u8]) -> String {
    String::from_utf8_lossy(raw).into_owned()
}
