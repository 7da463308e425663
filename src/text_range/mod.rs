// ── Range transfer buffer ─────────────────────────────────────────────────────
//
// `SCI_GETTEXTRANGEFULL` and friends take the address of a
// `Sci_TextRangeFull`:
//
//   struct block:  { cp_min: isize, cp_max: isize, text: *mut u8 }
//                                                      │
//   output buffer: [unit; capacity]  ◄─────────────────┘
//
// Two independent allocations; the struct block points at the output
// buffer.  The in-memory `CharacterRange` mirror and the struct block are
// not coherent on their own: every local change is flushed immediately, and
// host-side changes are pulled in with `sync()`.
//
// No `unsafe` here: all byte access goes through `NativeBuffer`.

use std::mem;

use tracing::debug;

use crate::native::{
    self,
    text::{self, TextEncoding},
    NativeBuffer, PTR_WIDTH,
};

/// Document-relative `[cp_min, cp_max)` span.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CharacterRange {
    pub cp_min: isize,
    pub cp_max: isize,
}

impl CharacterRange {
    pub const fn new(cp_min: isize, cp_max: isize) -> Self {
        Self { cp_min, cp_max }
    }

    /// Span length; 0 for an empty or reversed range.
    pub fn len(&self) -> usize {
        usize::try_from(self.cp_max - self.cp_min).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

const CP_MIN_OFFSET: usize = 0;
const CP_MAX_OFFSET: usize = PTR_WIDTH;
const TEXT_OFFSET: usize = 2 * PTR_WIDTH;
const STRUCT_WIDTH: usize = 3 * PTR_WIDTH;

/// Mirror of the host's `Sci_TextRangeFull`; never instantiated.
#[allow(dead_code)]
#[repr(C)]
struct HostTextRange {
    chrg: CharacterRange,
    lpstr_text: usize,
}

const _: () = {
    assert!(mem::offset_of!(HostTextRange, chrg) == CP_MIN_OFFSET);
    assert!(mem::offset_of!(CharacterRange, cp_max) == CP_MAX_OFFSET);
    assert!(mem::offset_of!(HostTextRange, lpstr_text) == TEXT_OFFSET);
    assert!(mem::size_of::<HostTextRange>() == STRUCT_WIDTH);
};

// ── TextRange ─────────────────────────────────────────────────────────────────

/// A range descriptor bundled with an output text buffer, passed to the host
/// as one address.
pub struct TextRange {
    range: CharacterRange,
    block: NativeBuffer,
    output: NativeBuffer,
    encoding: TextEncoding,
    capacity: usize,
}

impl TextRange {
    /// Allocate the output buffer and the struct block, and write the struct.
    ///
    /// `capacity` counts code units *including* the terminator (for a range
    /// of `n` bytes pass `n + 1`); it is raised to at least 1.  The host
    /// writes at most `capacity` units; anything beyond is cut off by the
    /// host without notice.
    pub fn prepare(range: CharacterRange, capacity: usize, encoding: TextEncoding) -> Self {
        let capacity = capacity.max(1);
        let output = NativeBuffer::array(capacity, encoding.unit_width());
        let block = NativeBuffer::zeroed(STRUCT_WIDTH);
        let mut this = Self { range, block, output, encoding, capacity };
        this.flush();
        debug!(cp_min = range.cp_min, cp_max = range.cp_max, capacity, "text range prepared");
        this
    }

    /// Write the mirror and the output pointer into the struct block.
    fn flush(&mut self) {
        let text_addr = self.output.as_ptr() as usize;
        self.block.write_isize(CP_MIN_OFFSET, self.range.cp_min);
        self.block.write_isize(CP_MAX_OFFSET, self.range.cp_max);
        self.block.write_usize(TEXT_OFFSET, text_addr);
    }

    /// Address of the struct block.  Always coherent with the mirror: every
    /// local mutation is flushed as it happens.
    pub fn as_ptr(&self) -> *const u8 {
        self.block.as_ptr()
    }

    /// Struct address as a message word.
    pub fn addr(&self) -> isize {
        self.block.addr()
    }

    /// Re-read the range fields the host may have updated in place.
    pub fn sync(&mut self) {
        if self.block.is_released() {
            return;
        }
        self.range = CharacterRange {
            cp_min: self.block.read_isize(CP_MIN_OFFSET),
            cp_max: self.block.read_isize(CP_MAX_OFFSET),
        };
    }

    /// The range as of the last `prepare`, `set_range` or `sync`.
    pub fn range(&self) -> CharacterRange {
        self.range
    }

    /// Change the range and flush it to native memory.
    pub fn set_range(&mut self, range: CharacterRange) {
        self.range = range;
        if !self.block.is_released() {
            self.flush();
        }
    }

    /// Output capacity in code units, terminator included.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn encoding(&self) -> TextEncoding {
        self.encoding
    }

    /// Decode the output buffer up to its first terminator.  A reused range
    /// never shows what an earlier, longer fill left behind it.
    pub fn text(&self) -> String {
        text::decode_terminated(self.output.as_slice(), self.encoding)
    }

    /// Decode exactly `units` code units (as reported by the host's reply),
    /// clipped to the buffer.
    pub fn text_units(&self, units: usize) -> String {
        text::decode_units(self.output.as_slice(), self.encoding, units)
    }

    /// `true` once `release()` has run.
    pub fn is_released(&self) -> bool {
        self.block.is_released()
    }

    /// Free the output buffer, then the struct block.  Safe to call twice.
    pub fn release(&mut self) {
        self.output.release();
        self.block.release();
    }
}

impl Drop for TextRange {
    fn drop(&mut self) {
        native::dispose("TextRange", || self.release());
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::native::LeakCheck;

    #[test]
    fn struct_is_three_words() {
        assert_eq!(STRUCT_WIDTH, 3 * mem::size_of::<usize>());
        assert_eq!(TEXT_OFFSET, 2 * mem::size_of::<isize>());
    }

    #[test]
    fn prepare_writes_struct_before_use() {
        let tr = TextRange::prepare(CharacterRange::new(10, 25), 16, TextEncoding::Utf8);
        assert_eq!(tr.block.read_isize(CP_MIN_OFFSET), 10);
        assert_eq!(tr.block.read_isize(CP_MAX_OFFSET), 25);
        assert_eq!(tr.block.read_usize(TEXT_OFFSET), tr.output.as_ptr() as usize);
        assert_ne!(tr.as_ptr(), tr.output.as_ptr(), "struct and output are separate blocks");
        assert_eq!(tr.output.len(), 16);
    }

    #[test]
    fn wide_output_is_sized_in_units() {
        let tr = TextRange::prepare(CharacterRange::new(0, 4), 5, TextEncoding::Wide);
        assert_eq!(tr.output.len(), 10);
        assert_eq!(tr.capacity(), 5);
    }

    #[test]
    fn host_writes_are_visible_after_sync() {
        let mut tr = TextRange::prepare(CharacterRange::new(0, 100), 8, TextEncoding::Utf8);
        // Host side: fill the text and narrow the range to the actual match.
        tr.output.write_bytes(0, b"match\0");
        tr.block.write_isize(CP_MIN_OFFSET, 40);
        tr.block.write_isize(CP_MAX_OFFSET, 45);

        assert_eq!(tr.range(), CharacterRange::new(0, 100), "mirror is not refreshed implicitly");
        tr.sync();
        assert_eq!(tr.range(), CharacterRange::new(40, 45));
        assert_eq!(tr.text(), "match");
        assert_eq!(tr.text_units(3), "mat");
    }

    #[test]
    fn shorter_refill_hides_previous_tail() {
        let mut tr = TextRange::prepare(CharacterRange::new(0, 6), 8, TextEncoding::Utf8);
        tr.output.write_bytes(0, b"abcdef\0");
        assert_eq!(tr.text(), "abcdef");

        tr.set_range(CharacterRange::new(0, 2));
        tr.output.write_bytes(0, b"xy\0");
        assert_eq!(tr.text(), "xy");
        assert_eq!(tr.text_units(2), "xy");
    }

    #[test]
    fn set_range_flushes_to_native() {
        let mut tr = TextRange::prepare(CharacterRange::new(0, 1), 2, TextEncoding::Utf8);
        tr.set_range(CharacterRange::new(7, 9));
        assert_eq!(tr.block.read_isize(CP_MIN_OFFSET), 7);
        assert_eq!(tr.block.read_isize(CP_MAX_OFFSET), 9);
        assert_eq!(tr.block.read_usize(TEXT_OFFSET), tr.output.as_ptr() as usize);
    }

    #[test]
    fn zero_capacity_is_raised_to_one() {
        let tr = TextRange::prepare(CharacterRange::default(), 0, TextEncoding::Utf8);
        assert_eq!(tr.capacity(), 1);
        assert_eq!(tr.text(), "");
    }

    #[test]
    fn release_is_idempotent() {
        let leaks = LeakCheck::begin();
        let mut tr = TextRange::prepare(CharacterRange::new(1, 2), 4, TextEncoding::Wide);
        assert_eq!(leaks.outstanding(), 2);
        tr.release();
        tr.release();
        assert!(tr.is_released());
        assert!(tr.as_ptr().is_null());
        assert_eq!(tr.text(), "");
        tr.sync();
        tr.set_range(CharacterRange::new(3, 4));
        drop(tr);
        assert_eq!(leaks.finish(), 0);
    }

    #[test]
    fn range_len_handles_reversed_spans() {
        assert_eq!(CharacterRange::new(3, 10).len(), 7);
        assert!(CharacterRange::new(10, 3).is_empty());
    }
}
