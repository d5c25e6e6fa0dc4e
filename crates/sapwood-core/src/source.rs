//! Immutable source text.
//!
//! A [`SourceBuffer`] is the byte substrate every node span indexes into.
//! Clones share the same allocation, so trees produced by repeated edits can
//! hold their buffers without copying.

use std::fmt;
use std::ops::{Deref, Range};
use std::str::Utf8Error;
use std::sync::{Arc, OnceLock};

/// Zero-based row and byte column.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Point {
    pub row: usize,
    pub column: usize,
}

impl Point {
    pub const fn new(row: usize, column: usize) -> Self {
        Self { row, column }
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.row + 1, self.column + 1)
    }
}

#[derive(Default)]
struct Inner {
    bytes: Box<[u8]>,
    /// Byte offset of each line start; built on first use.
    line_starts: OnceLock<Vec<usize>>,
}

/// Shared, immutable source bytes.
///
/// Equality and hashing are by content.
#[derive(Clone, Default)]
pub struct SourceBuffer {
    inner: Arc<Inner>,
}

impl SourceBuffer {
    pub fn new(bytes: impl Into<Box<[u8]>>) -> Self {
        Self {
            inner: Arc::new(Inner {
                bytes: bytes.into(),
                line_starts: OnceLock::new(),
            }),
        }
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.inner.bytes
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.inner.bytes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.inner.bytes.is_empty()
    }

    /// Bytes in `range`, clamped to the buffer.
    pub fn slice(&self, range: Range<usize>) -> &[u8] {
        let end = range.end.min(self.len());
        let start = range.start.min(end);
        &self.inner.bytes[start..end]
    }

    pub fn text(&self, range: Range<usize>) -> Result<&str, Utf8Error> {
        std::str::from_utf8(self.slice(range))
    }

    /// Whether two handles share one allocation.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    fn line_starts(&self) -> &[usize] {
        self.inner.line_starts.get_or_init(|| {
            let mut starts = vec![0];
            starts.extend(
                self.inner
                    .bytes
                    .iter()
                    .enumerate()
                    .filter(|&(_, &b)| b == b'\n')
                    .map(|(i, _)| i + 1),
            );
            starts
        })
    }

    pub fn line_count(&self) -> usize {
        self.line_starts().len()
    }

    /// Row/column of a byte offset. Offsets past the end map to the end.
    pub fn point_at(&self, byte: usize) -> Point {
        let byte = byte.min(self.len());
        let starts = self.line_starts();
        let row = match starts.binary_search(&byte) {
            Ok(row) => row,
            Err(next) => next - 1,
        };
        Point::new(row, byte - starts[row])
    }

    /// Byte offset of a point. Columns past the end of a line clamp to the
    /// line end; rows past the last line clamp to the buffer end.
    pub fn byte_at(&self, point: Point) -> usize {
        let starts = self.line_starts();
        let Some(&line_start) = starts.get(point.row) else {
            return self.len();
        };
        let line_end = starts
            .get(point.row + 1)
            .map_or(self.len(), |&next| next - 1);
        (line_start + point.column).min(line_end)
    }
}

impl Deref for SourceBuffer {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        self.as_bytes()
    }
}

impl AsRef<[u8]> for SourceBuffer {
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}

impl PartialEq for SourceBuffer {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other) || self.as_bytes() == other.as_bytes()
    }
}

impl Eq for SourceBuffer {}

impl std::hash::Hash for SourceBuffer {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.as_bytes().hash(state);
    }
}

impl fmt::Debug for SourceBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SourceBuffer")
            .field("len", &self.len())
            .finish()
    }
}

impl From<&str> for SourceBuffer {
    fn from(s: &str) -> Self {
        Self::new(s.as_bytes())
    }
}

impl From<String> for SourceBuffer {
    fn from(s: String) -> Self {
        Self::new(s.into_bytes())
    }
}

impl From<&[u8]> for SourceBuffer {
    fn from(bytes: &[u8]) -> Self {
        Self::new(bytes)
    }
}

impl From<Vec<u8>> for SourceBuffer {
    fn from(bytes: Vec<u8>) -> Self {
        Self::new(bytes)
    }
}
