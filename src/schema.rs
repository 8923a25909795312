//! Schema discovery from `#`-prefixed directive lines.
//!
//! A W3C log declares its columns with a `#Fields:` directive. Every directive
//! replaces the previous column list in full; there is no merging. Any other
//! `#` line is a comment as far as the data is concerned, although a few
//! well-known header directives are remembered in [`LogHeader`].

use serde::{Deserialize, Serialize};

/// Prefix of the directive that declares the active column list.
pub const FIELDS_DIRECTIVE: &str = "#Fields:";

/// Marker that starts every directive or comment line.
pub const COMMENT_MARKER: char = '#';

/// Ordered list of column names declared by the most recent `#Fields:` line.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    columns: Vec<String>,
}

impl Schema {
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
        }
    }

    /// Parse the column list that follows the `#Fields:` prefix.
    ///
    /// Columns are separated by single spaces. One leading space after the
    /// prefix is the normal form and is not a column.
    pub fn from_directive_body(body: &str) -> Self {
        let body = body.strip_prefix(' ').unwrap_or(body);
        let body = body.trim_end_matches(['\r', '\n']);
        if body.is_empty() {
            return Self::default();
        }
        Self::new(body.split(' '))
    }

    #[inline]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Case-insensitive position of `name` in the column list.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.eq_ignore_ascii_case(name))
    }
}

/// Classification of a single raw line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Directive<'a> {
    /// `#Fields:` line carrying the replacement schema.
    Fields(Schema),
    /// A header directive the engine remembers but otherwise ignores.
    Header(HeaderKind, &'a str),
    /// Any other `#` line.
    Comment,
    /// Whitespace-only line.
    Blank,
    /// Positional values for the active schema.
    Data(&'a str),
}

/// Header directives kept for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderKind {
    Software,
    Version,
    Date,
}

impl HeaderKind {
    const PREFIXES: [(&'static str, HeaderKind); 3] = [
        ("#Software:", HeaderKind::Software),
        ("#Version:", HeaderKind::Version),
        ("#Date:", HeaderKind::Date),
    ];
}

impl<'a> Directive<'a> {
    pub fn classify(line: &'a str) -> Self {
        let line = line.strip_suffix('\r').unwrap_or(line);
        if !line.starts_with(COMMENT_MARKER) {
            if line.trim().is_empty() {
                return Directive::Blank;
            }
            return Directive::Data(line);
        }
        if let Some(body) = strip_prefix_ignore_case(line, FIELDS_DIRECTIVE) {
            return Directive::Fields(Schema::from_directive_body(body));
        }
        for (prefix, kind) in HeaderKind::PREFIXES {
            if let Some(body) = strip_prefix_ignore_case(line, prefix) {
                return Directive::Header(kind, body.trim());
            }
        }
        Directive::Comment
    }
}

fn strip_prefix_ignore_case<'a>(line: &'a str, prefix: &str) -> Option<&'a str> {
    let head = line.get(..prefix.len())?;
    if head.eq_ignore_ascii_case(prefix) {
        Some(&line[prefix.len()..])
    } else {
        None
    }
}

/// Last values seen for the `#Software`, `#Version` and `#Date` directives.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogHeader {
    pub software: Option<String>,
    pub version: Option<String>,
    pub date: Option<String>,
}

impl LogHeader {
    pub(crate) fn record(&mut self, kind: HeaderKind, value: &str) {
        let value = Some(value.to_string());
        match kind {
            HeaderKind::Software => self.software = value,
            HeaderKind::Version => self.version = value,
            HeaderKind::Date => self.date = value,
        }
    }
}
