//! Lazy record windowing: skip / first / last / skip-last.
//!
//! Two mutually exclusive shapes are supported, see [`WindowSpec`]. All
//! adapters work on any iterator of `Result<T, E>`:
//!
//! - errors are passed through immediately and never counted or buffered;
//! - after an error the buffered adapters discard what they hold, the
//!   sequence is over;
//! - memory is bounded by the window: `last(L)` holds at most `L` records,
//!   `skip_last(K)` at most `K + 1`.
//!
//! ```
//! use w3clog::window::WindowExt;
//!
//! let out: Vec<_> = (0..1000)
//!     .map(Ok::<_, ()>)
//!     .skip_records(10)
//!     .first_records(50)
//!     .last_records(5)
//!     .collect::<Result<_, _>>()
//!     .unwrap();
//! assert_eq!(out, vec![55, 56, 57, 58, 59]);
//! ```

use crate::error::Error;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

// upper bound on buffer space reserved before any record arrives
const MAX_INITIAL_BUFFER: usize = 1024;

/// Which slice of the record sequence to keep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "WindowConfig", into = "WindowConfig")]
pub enum WindowSpec {
    /// Drop `skip`, cap to `first`, then keep the trailing `last`, in that order.
    Range {
        skip: usize,
        first: Option<usize>,
        last: Option<usize>,
    },
    /// Everything except the final `k` records.
    SkipLast(usize),
}

impl Default for WindowSpec {
    fn default() -> Self {
        WindowSpec::ALL
    }
}

impl WindowSpec {
    /// Pass every record through.
    pub const ALL: WindowSpec = WindowSpec::Range {
        skip: 0,
        first: None,
        last: None,
    };

    #[must_use]
    pub fn range(skip: usize, first: Option<usize>, last: Option<usize>) -> Self {
        WindowSpec::Range { skip, first, last }
    }

    #[must_use]
    pub fn skip(n: usize) -> Self {
        Self::range(n, None, None)
    }

    #[must_use]
    pub fn first(n: usize) -> Self {
        Self::range(0, Some(n), None)
    }

    #[must_use]
    pub fn last(n: usize) -> Self {
        Self::range(0, None, Some(n))
    }

    #[must_use]
    pub fn skip_last(k: usize) -> Self {
        WindowSpec::SkipLast(k)
    }

    pub fn is_passthrough(&self) -> bool {
        matches!(self, WindowSpec::SkipLast(0)) || *self == WindowSpec::ALL
    }
}

/// Flat, serde-facing form of [`WindowSpec`].
///
/// `skip`/`first`/`last` and `skip_last` are separate groups; a document that
/// sets keys from both is rejected.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WindowConfig {
    #[serde(default)]
    pub skip: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skip_last: Option<usize>,
}

impl TryFrom<WindowConfig> for WindowSpec {
    type Error = Error;

    fn try_from(c: WindowConfig) -> Result<Self, Self::Error> {
        match c.skip_last {
            Some(_) if c.skip != 0 || c.first.is_some() || c.last.is_some() => {
                Err(Error::configuration(
                    "`skip_last` cannot be combined with `skip`, `first` or `last`",
                ))
            }
            Some(k) => Ok(WindowSpec::SkipLast(k)),
            None => Ok(WindowSpec::Range {
                skip: c.skip,
                first: c.first,
                last: c.last,
            }),
        }
    }
}

impl From<WindowSpec> for WindowConfig {
    fn from(spec: WindowSpec) -> Self {
        match spec {
            WindowSpec::Range { skip, first, last } => WindowConfig {
                skip,
                first,
                last,
                skip_last: None,
            },
            WindowSpec::SkipLast(k) => WindowConfig {
                skip_last: Some(k),
                ..WindowConfig::default()
            },
        }
    }
}

/// Drops the first `n` successful items.
pub struct SkipRecords<I> {
    inner: I,
    remaining: usize,
}

impl<I, T, E> Iterator for SkipRecords<I>
where
    I: Iterator<Item = Result<T, E>>,
{
    type Item = Result<T, E>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let item = self.inner.next()?;
            if self.remaining > 0 && item.is_ok() {
                self.remaining -= 1;
                continue;
            }
            return Some(item);
        }
    }
}

/// Yields at most `n` successful items, then stops pulling upstream.
pub struct FirstRecords<I> {
    inner: I,
    remaining: Option<usize>,
}

impl<I, T, E> Iterator for FirstRecords<I>
where
    I: Iterator<Item = Result<T, E>>,
{
    type Item = Result<T, E>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.remaining {
            Some(0) => None,
            Some(n) => {
                let item = self.inner.next()?;
                if item.is_ok() {
                    self.remaining = Some(n - 1);
                }
                Some(item)
            }
            None => self.inner.next(),
        }
    }
}

/// Yields only the trailing `n` successful items, via a ring buffer of
/// capacity `n`.
pub struct LastRecords<I, R> {
    inner: I,
    capacity: Option<usize>,
    buffer: VecDeque<R>,
    filled: bool,
    peak: usize,
}

impl<I, T, E> Iterator for LastRecords<I, Result<T, E>>
where
    I: Iterator<Item = Result<T, E>>,
{
    type Item = Result<T, E>;

    fn next(&mut self) -> Option<Self::Item> {
        let Some(capacity) = self.capacity else {
            return self.inner.next();
        };
        if capacity == 0 {
            return None;
        }
        while !self.filled {
            match self.inner.next() {
                None => self.filled = true,
                Some(Err(e)) => {
                    self.buffer.clear();
                    self.filled = true;
                    return Some(Err(e));
                }
                Some(ok) => {
                    if self.buffer.len() == capacity {
                        self.buffer.pop_front();
                    }
                    self.buffer.push_back(ok);
                    self.peak = self.peak.max(self.buffer.len());
                }
            }
        }
        self.buffer.pop_front()
    }
}

/// Yields everything except the final `k` successful items, holding at most
/// `k + 1` at a time.
pub struct SkipLastRecords<I, R> {
    inner: I,
    k: usize,
    buffer: VecDeque<R>,
    peak: usize,
    done: bool,
}

impl<I, T, E> Iterator for SkipLastRecords<I, Result<T, E>>
where
    I: Iterator<Item = Result<T, E>>,
{
    type Item = Result<T, E>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        loop {
            match self.inner.next() {
                None => {
                    self.buffer.clear();
                    self.done = true;
                    return None;
                }
                Some(Err(e)) => {
                    self.buffer.clear();
                    self.done = true;
                    return Some(Err(e));
                }
                Some(ok) => {
                    self.buffer.push_back(ok);
                    self.peak = self.peak.max(self.buffer.len());
                    if self.buffer.len() > self.k {
                        return self.buffer.pop_front();
                    }
                }
            }
        }
    }
}

/// A [`WindowSpec`] applied to an iterator.
pub enum Windowed<I: Iterator> {
    Range(LastRecords<FirstRecords<SkipRecords<I>>, I::Item>),
    SkipLast(SkipLastRecords<I, I::Item>),
}

impl<I: Iterator> Windowed<I> {
    /// The upstream iterator.
    pub fn get_ref(&self) -> &I {
        match self {
            Windowed::Range(last) => &last.inner.inner.inner,
            Windowed::SkipLast(skip_last) => &skip_last.inner,
        }
    }

    pub fn get_mut(&mut self) -> &mut I {
        match self {
            Windowed::Range(last) => &mut last.inner.inner.inner,
            Windowed::SkipLast(skip_last) => &mut skip_last.inner,
        }
    }

    /// Most records buffered at once so far.
    pub fn peak_buffered(&self) -> usize {
        match self {
            Windowed::Range(last) => last.peak,
            Windowed::SkipLast(skip_last) => skip_last.peak,
        }
    }
}

impl<I, T, E> Iterator for Windowed<I>
where
    I: Iterator<Item = Result<T, E>>,
{
    type Item = Result<T, E>;

    fn next(&mut self) -> Option<Self::Item> {
        match self {
            Windowed::Range(it) => it.next(),
            Windowed::SkipLast(it) => it.next(),
        }
    }
}

impl<I, R> LastRecords<I, R> {
    pub fn peak_buffered(&self) -> usize {
        self.peak
    }
}

impl<I, R> SkipLastRecords<I, R> {
    pub fn peak_buffered(&self) -> usize {
        self.peak
    }
}

/// Windowing adapters for fallible record streams.
pub trait WindowExt<T, E>: Iterator<Item = Result<T, E>> + Sized {
    fn skip_records(self, n: usize) -> SkipRecords<Self> {
        SkipRecords {
            inner: self,
            remaining: n,
        }
    }

    fn first_records(self, n: usize) -> FirstRecords<Self> {
        FirstRecords {
            inner: self,
            remaining: Some(n),
        }
    }

    fn last_records(self, n: usize) -> LastRecords<Self, Result<T, E>> {
        LastRecords {
            inner: self,
            capacity: Some(n),
            buffer: VecDeque::with_capacity(n.min(MAX_INITIAL_BUFFER)),
            filled: false,
            peak: 0,
        }
    }

    fn skip_last_records(self, k: usize) -> SkipLastRecords<Self, Result<T, E>> {
        SkipLastRecords {
            inner: self,
            k,
            buffer: VecDeque::with_capacity(k.saturating_add(1).min(MAX_INITIAL_BUFFER)),
            peak: 0,
            done: false,
        }
    }

    /// Apply `spec`, honoring the fixed skip → first → last order.
    fn windowed(self, spec: WindowSpec) -> Windowed<Self> {
        match spec {
            WindowSpec::Range { skip, first, last } => {
                let first = FirstRecords {
                    inner: self.skip_records(skip),
                    remaining: first,
                };
                Windowed::Range(LastRecords {
                    inner: first,
                    capacity: last,
                    buffer: VecDeque::with_capacity(last.unwrap_or(0).min(MAX_INITIAL_BUFFER)),
                    filled: false,
                    peak: 0,
                })
            }
            WindowSpec::SkipLast(k) => Windowed::SkipLast(self.skip_last_records(k)),
        }
    }
}

impl<I, T, E> WindowExt<T, E> for I where I: Iterator<Item = Result<T, E>> {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn nums(n: usize) -> impl Iterator<Item = Result<usize, &'static str>> {
        (0..n).map(Ok)
    }

    fn ok<I: Iterator<Item = Result<usize, &'static str>>>(it: I) -> Vec<usize> {
        it.map(|r| r.unwrap()).collect()
    }

    #[test]
    fn skip_first_last_compose_in_fixed_order() {
        let out = ok(nums(1000).windowed(WindowSpec::range(10, Some(50), Some(5))));
        assert_eq!(out, vec![55, 56, 57, 58, 59]);
    }

    #[test]
    fn skip_last_omits_the_tail() {
        let out = ok(nums(1000).windowed(WindowSpec::skip_last(10)));
        assert_eq!(out.len(), 990);
        assert_eq!(out.last(), Some(&989));
    }

    #[test]
    fn last_alone_keeps_the_tail() {
        let out = ok(nums(1000).windowed(WindowSpec::last(5)));
        assert_eq!(out, vec![995, 996, 997, 998, 999]);
    }

    #[test]
    fn zero_sized_windows() {
        assert!(ok(nums(10).windowed(WindowSpec::first(0))).is_empty());
        assert!(ok(nums(10).windowed(WindowSpec::last(0))).is_empty());
        assert_eq!(ok(nums(10).windowed(WindowSpec::skip_last(0))).len(), 10);
        assert!(ok(nums(10).windowed(WindowSpec::skip(20))).is_empty());
        assert!(ok(nums(3).windowed(WindowSpec::skip_last(5))).is_empty());
    }

    #[test]
    fn first_stops_pulling_upstream() {
        let pulled = Cell::new(0usize);
        let src = (0..1_000_000usize).map(|i| {
            pulled.set(pulled.get() + 1);
            Ok::<_, ()>(i)
        });
        let out: Vec<_> = src.first_records(5).collect();
        assert_eq!(out.len(), 5);
        assert_eq!(pulled.get(), 5);
    }

    #[test]
    fn buffers_stay_bounded_over_large_inputs() {
        let mut last = nums(100_000).windowed(WindowSpec::last(7));
        assert_eq!(last.by_ref().count(), 7);
        assert_eq!(last.peak_buffered(), 7);

        let mut skip_last = nums(100_000).windowed(WindowSpec::skip_last(7));
        assert_eq!(skip_last.by_ref().count(), 100_000 - 7);
        assert!(skip_last.peak_buffered() <= 8);
    }

    #[test]
    fn errors_pass_through_uncounted() {
        let src = vec![Ok(0), Err("boom"), Ok(1), Ok(2)].into_iter();
        let out: Vec<_> = src.skip_records(1).first_records(1).collect();
        assert_eq!(out, vec![Err("boom"), Ok(1)]);
    }

    #[test]
    fn error_discards_buffered_tail() {
        let src = vec![Ok(0), Ok(1), Err("boom"), Ok(2)].into_iter();
        let mut it = src.last_records(2);
        assert_eq!(it.next(), Some(Err("boom")));
        assert_eq!(it.next(), None);
    }

    #[test]
    fn config_rejects_mixed_groups() {
        let mixed = WindowConfig {
            skip: 1,
            skip_last: Some(2),
            ..WindowConfig::default()
        };
        assert!(WindowSpec::try_from(mixed).is_err());

        let skip_last = WindowConfig {
            skip_last: Some(2),
            ..WindowConfig::default()
        };
        assert_eq!(WindowSpec::try_from(skip_last).unwrap(), WindowSpec::SkipLast(2));
        assert_eq!(WindowSpec::try_from(WindowConfig::default()).unwrap(), WindowSpec::ALL);
    }

    fn tail_of<I>(records: I, spec: WindowSpec) -> Vec<Result<u32, String>>
    where
        I: Iterator<Item = Result<u32, String>>,
    {
        records.windowed(spec).collect()
    }

    #[test]
    fn windowed_accepts_any_fallible_iterator() {
        let src = (0..20u32).map(|i| if i == 3 { Err(format!("bad {i}")) } else { Ok(i) });
        let out = tail_of(src, WindowSpec::range(1, Some(4), None));
        assert_eq!(out, vec![Ok(1), Ok(2), Err("bad 3".to_string()), Ok(4), Ok(5)]);

        let out = tail_of((0..5u32).map(Ok), WindowSpec::skip_last(2));
        assert_eq!(out, vec![Ok(0), Ok(1), Ok(2)]);
    }

    #[test]
    fn last_zero_reads_nothing() {
        let pulled = Cell::new(0usize);
        let src = (0..1_000usize).map(|i| {
            pulled.set(pulled.get() + 1);
            Ok::<_, ()>(i)
        });
        let mut it = src.windowed(WindowSpec::last(0));
        assert!(it.next().is_none());
        assert_eq!(pulled.get(), 0);
        assert_eq!(it.peak_buffered(), 0);
    }

    #[test]
    fn skip_last_stops_after_an_error() {
        let pulled = Cell::new(0usize);
        let src = vec![Ok(0), Err("boom"), Ok(1), Ok(2), Ok(3)].into_iter().inspect(|_| {
            pulled.set(pulled.get() + 1);
        });
        let mut it = src.skip_last_records(1);
        assert_eq!(it.next(), Some(Err("boom")));
        assert_eq!(pulled.get(), 2);
        assert_eq!(it.next(), None);
        assert_eq!(it.next(), None);
        assert_eq!(pulled.get(), 2);
    }

    #[test]
    fn huge_window_does_not_reserve_upfront() {
        let out = ok(nums(3).windowed(WindowSpec::last(usize::MAX)));
        assert_eq!(out, vec![0, 1, 2]);
        let out = ok(nums(3).windowed(WindowSpec::skip_last(usize::MAX)));
        assert!(out.is_empty());
    }

    #[test]
    fn passthrough_detection() {
        assert!(WindowSpec::default().is_passthrough());
        assert!(WindowSpec::skip_last(0).is_passthrough());
        assert!(!WindowSpec::last(3).is_passthrough());
    }
}
