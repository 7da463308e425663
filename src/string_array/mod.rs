// ── Null-terminated wide string array ─────────────────────────────────────────
//
// This is one of the modules where `unsafe` is permitted.
// Every `unsafe` block MUST carry a `// SAFETY:` comment.
//
// Native shape, for N items of capacity C:
//
//   table: [*mut u16; N + 1]      slot N is always null
//      │
//      ├──► item 0: [u16; C + 1]  zero-filled, always terminated
//      ├──► item 1: [u16; C + 1]
//      └──► …
//
// The host fills the items in place (e.g. `NPPM_GETOPENFILENAMES`) or reads
// strings the plugin wrote.  Release order is children first, then the
// table.

#![allow(unsafe_code)]

use tracing::debug;

use crate::{
    native::{
        self,
        text::{self, TextEncoding},
        NativeBuffer, PTR_WIDTH,
    },
    MAX_PATH,
};

/// Width of one wide code unit.
const WCHAR: usize = 2;

/// A contiguous, null-terminated array of pointers to fixed-size wide
/// string buffers.
///
/// Each item holds up to `capacity()` code units plus a terminator.  Longer
/// strings are truncated silently, the same way the host truncates its own
/// paths.
pub struct WideStringArray {
    table: NativeBuffer,
    items: Vec<NativeBuffer>,
    capacity: usize,
}

impl WideStringArray {
    /// Allocate `count` empty items of `capacity` wide characters each,
    /// ready for the host to fill.
    ///
    /// `capacity` is clamped to `1..=MAX_PATH - 1`; the terminator is added on
    /// top.
    pub fn new(count: usize, capacity: usize) -> Self {
        let capacity = capacity.clamp(1, MAX_PATH - 1);
        let mut table = NativeBuffer::array(count + 1, PTR_WIDTH);
        let mut items = Vec::with_capacity(count);
        for slot in 0..count {
            let item = NativeBuffer::array(capacity + 1, WCHAR);
            table.write_usize(slot * PTR_WIDTH, item.as_ptr() as usize);
            items.push(item);
        }
        // Slot `count` stays zero from the zeroed allocation: the sentinel.
        debug!(count, capacity, "wide string array allocated");
        Self { table, items, capacity }
    }

    /// Build an array pre-filled from `strings`, each item `MAX_PATH - 1`
    /// wide characters.  Longer strings are truncated silently.
    pub fn from_strings<S: AsRef<str>>(strings: &[S]) -> Self {
        Self::from_strings_with_capacity(strings, MAX_PATH - 1)
    }

    /// As `from_strings`, with an explicit per-item capacity (clamped as in
    /// `new`).  Longer strings are truncated silently.
    pub fn from_strings_with_capacity<S: AsRef<str>>(strings: &[S], capacity: usize) -> Self {
        let mut array = Self::new(strings.len(), capacity);
        for (index, s) in strings.iter().enumerate() {
            array.set(index, s.as_ref());
        }
        array
    }

    /// Number of items (the sentinel slot is not counted).
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Per-item capacity in wide characters, terminator excluded.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// `true` once `release()` has run.
    pub fn is_released(&self) -> bool {
        self.table.is_released()
    }

    /// Address of the pointer table, for passing to the host.
    pub fn as_ptr(&self) -> *const *mut u16 {
        self.table.as_ptr().cast()
    }

    /// Pointer-table address as a message word.
    pub fn addr(&self) -> isize {
        self.table.addr()
    }

    /// Overwrite item `index` with `value`, truncated to `capacity()` units.
    ///
    /// Returns `false` if `index` is out of range or the array is released.
    pub fn set(&mut self, index: usize, value: &str) -> bool {
        let capacity = self.capacity;
        let Some(item) = self.items.get_mut(index).filter(|b| !b.is_released()) else {
            return false;
        };
        let encoded = text::encode(value, TextEncoding::Wide, capacity);
        let slice = item.as_mut_slice();
        slice.fill(0);
        slice[..encoded.len()].copy_from_slice(&encoded);
        true
    }

    /// Decode item `index`, following the pointer stored in the table.
    pub fn get(&self, index: usize, encoding: TextEncoding) -> Option<String> {
        if index >= self.items.len() || self.is_released() {
            return None;
        }
        let item = self.table.read_usize(index * PTR_WIDTH) as *const u8;
        if item.is_null() {
            return Some(String::new());
        }
        let len = (self.capacity + 1) * WCHAR;
        // SAFETY: the table is live and every non-null slot holds the address
        // of an item buffer of exactly `len` bytes that this array owns.
        let bytes = unsafe { std::slice::from_raw_parts(item, len) };
        // The last unit is reserved for the terminator; never read past it.
        Some(text::decode(&bytes[..len - WCHAR], encoding))
    }

    /// Read back every item.
    ///
    /// `Wide` is the normal path; `Ansi`/`Utf8` reinterpret the bytes of each
    /// item for hosts that write narrow strings into the same buffers.
    pub fn decode(&self, encoding: TextEncoding) -> Vec<String> {
        (0..self.len()).filter_map(|i| self.get(i, encoding)).collect()
    }

    /// Free every item buffer, then the pointer table.  Safe to call twice.
    pub fn release(&mut self) {
        if self.table.is_released() {
            return;
        }
        for item in &mut self.items {
            item.release();
        }
        self.table.release();
        debug!(count = self.items.len(), "wide string array released");
    }
}

impl Drop for WideStringArray {
    fn drop(&mut self) {
        native::dispose("WideStringArray", || self.release());
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::native::LeakCheck;
    use proptest::prelude::*;

    #[test]
    fn sentinel_slot_is_null() {
        for count in [0usize, 1, 2, 7] {
            let array = WideStringArray::new(count, 16);
            assert_eq!(array.table.read_usize(count * PTR_WIDTH), 0, "count = {count}");
            for slot in 0..count {
                assert_ne!(array.table.read_usize(slot * PTR_WIDTH), 0);
            }
        }
    }

    #[test]
    fn new_items_decode_as_empty() {
        let array = WideStringArray::new(3, 10);
        assert_eq!(array.decode(TextEncoding::Wide), vec!["", "", ""]);
    }

    #[test]
    fn capacity_is_clamped() {
        assert_eq!(WideStringArray::new(1, 0).capacity(), 1);
        assert_eq!(WideStringArray::new(1, 100_000).capacity(), MAX_PATH - 1);
        assert_eq!(WideStringArray::new(1, 42).capacity(), 42);
    }

    #[test]
    fn three_paths_with_one_truncated() {
        let long: String = "v".repeat(300);
        let mut array = WideStringArray::new(3, 259);
        assert!(array.set(0, "a.txt"));
        assert!(array.set(1, "b.txt"));
        assert!(array.set(2, &long));
        let decoded = array.decode(TextEncoding::Wide);
        assert_eq!(decoded[0], "a.txt");
        assert_eq!(decoded[1], "b.txt");
        assert_eq!(decoded[2], long[..259]);
    }

    #[test]
    fn shorter_rewrite_clears_old_tail() {
        let mut array = WideStringArray::new(1, 20);
        array.set(0, "long name here");
        array.set(0, "tiny");
        assert_eq!(array.get(0, TextEncoding::Wide).as_deref(), Some("tiny"));
    }

    #[test]
    fn set_out_of_range_is_rejected() {
        let mut array = WideStringArray::new(1, 8);
        assert!(!array.set(1, "x"));
        assert_eq!(array.get(1, TextEncoding::Wide), None);
    }

    #[test]
    fn ansi_view_of_narrow_host_writes() {
        let mut array = WideStringArray::new(1, 8);
        array.items[0].write_bytes(0, b"abc\0");
        assert_eq!(array.decode(TextEncoding::Ansi), vec!["abc"]);
    }

    #[test]
    fn release_is_idempotent_and_frees_everything() {
        let leaks = LeakCheck::begin();
        let mut array = WideStringArray::from_strings(&["one", "two"]);
        assert_eq!(leaks.outstanding(), 3);
        array.release();
        array.release();
        assert!(array.is_released());
        assert!(array.decode(TextEncoding::Wide).is_empty());
        assert!(!array.set(0, "late"));
        drop(array);
        assert_eq!(leaks.finish(), 0);
    }

    #[test]
    fn drop_frees_without_explicit_release() {
        let leaks = LeakCheck::begin();
        drop(WideStringArray::new(4, 32));
        assert_eq!(leaks.finish(), 0);
    }

    proptest! {
        #[test]
        fn roundtrip_within_capacity(list in prop::collection::vec("\\PC{0,40}", 0..8)) {
            let array = WideStringArray::from_strings_with_capacity(&list, 64);
            let fits = list.iter().all(|s| s.encode_utf16().count() <= 64);
            prop_assume!(fits);
            prop_assert_eq!(array.decode(TextEncoding::Wide), list);
        }

        #[test]
        fn truncation_keeps_exact_prefix(s in "[a-z]{0,80}", capacity in 1usize..60) {
            let array = WideStringArray::from_strings_with_capacity(&[s.as_str()], capacity);
            let expected: String = s.chars().take(capacity).collect();
            prop_assert_eq!(array.get(0, TextEncoding::Wide), Some(expected));
        }
    }
}
