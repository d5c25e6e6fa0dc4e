use std::ops::Range;

use sapwood_core::SourceBuffer;

/// A single contiguous replacement, in byte offsets.
///
/// `[start_byte, old_end_byte)` of the old text became
/// `[start_byte, new_end_byte)` of the new text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InputEdit {
    pub start_byte: usize,
    pub old_end_byte: usize,
    pub new_end_byte: usize,
}

impl InputEdit {
    pub fn new(start_byte: usize, old_end_byte: usize, new_end_byte: usize) -> Self {
        Self {
            start_byte,
            old_end_byte,
            new_end_byte,
        }
    }

    /// Replace `range` of `source` with `text`.
    ///
    /// The range is clamped to the buffer. Returns the new buffer together
    /// with the edit that describes the change.
    pub fn splice(
        source: &SourceBuffer,
        range: Range<usize>,
        text: &[u8],
    ) -> (SourceBuffer, Self) {
        let end = range.end.min(source.len());
        let start = range.start.min(end);
        let mut bytes = Vec::with_capacity(source.len() - (end - start) + text.len());
        bytes.extend_from_slice(&source[..start]);
        bytes.extend_from_slice(text);
        bytes.extend_from_slice(&source[end..]);
        let edit = Self::new(start, end, start + text.len());
        (SourceBuffer::from(bytes), edit)
    }

    /// Signed change in length.
    pub fn delta(&self) -> isize {
        self.new_end_byte as isize - self.old_end_byte as isize
    }

    /// Whether the edit describes exactly how `old` became `new`: ordered
    /// offsets inside both buffers and identical bytes outside the edit.
    pub fn is_consistent(&self, old: &[u8], new: &[u8]) -> bool {
        let Self {
            start_byte: start,
            old_end_byte: old_end,
            new_end_byte: new_end,
        } = *self;
        start <= old_end
            && start <= new_end
            && old_end <= old.len()
            && new_end <= new.len()
            && old.len() - old_end == new.len() - new_end
            && old[..start] == new[..start]
            && old[old_end..] == new[new_end..]
    }

    /// Where an offset of the old text lands in the new text, if the byte
    /// there survived the edit.
    pub fn map_old(&self, old: usize) -> Option<usize> {
        if old >= self.old_end_byte {
            Some(old - self.old_end_byte + self.new_end_byte)
        } else if old < self.start_byte {
            Some(old)
        } else {
            None
        }
    }

    /// Offset of the old text that corresponds to `new`, if `new` lies
    /// outside the replaced region. The start of a non-empty replacement
    /// belongs to the new text and has no old counterpart.
    pub fn map_new(&self, new: usize) -> Option<usize> {
        if new >= self.new_end_byte {
            Some(new - self.new_end_byte + self.old_end_byte)
        } else if new < self.start_byte {
            Some(new)
        } else {
            None
        }
    }
}
