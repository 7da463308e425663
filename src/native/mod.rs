// ── Native heap blocks ────────────────────────────────────────────────────────
//
// This is one of the modules where `unsafe` is permitted.
// Every `unsafe` block MUST carry a `// SAFETY:` comment.
//
// ── Ownership model ───────────────────────────────────────────────────────────
//
// `NativeBuffer` is the only type in the crate that calls the allocator.
// Each block has exactly one owner.  The composite owners (`WideStringArray`,
// `FuncItemTable`, `TextRange`) hold `NativeBuffer`s and never free memory
// themselves; they only decide the *order* in which their blocks are
// released.
//
// Release is idempotent: `release()` takes the pointer out of the buffer, so
// the explicit path and the `Drop` backstop can both run without a double
// free.
//
// ── Leak detection ────────────────────────────────────────────────────────────
//
// A thread-local counter tracks live blocks.  Owners are `!Send`, so every
// block is freed on the thread that allocated it and the counter stays
// consistent.  `LeakCheck` snapshots the counter and reports growth.

#![allow(unsafe_code)]

pub mod text;

use std::{
    alloc::{self, Layout},
    cell::Cell,
    mem,
    panic::{self, AssertUnwindSafe},
    ptr::{self, NonNull},
    slice,
};

use tracing::{error, trace, warn};

use crate::error::{BridgeError, Result};

/// Every block is word-aligned so that pointer and `isize` fields can be
/// stored at word offsets.
const BLOCK_ALIGN: usize = mem::align_of::<usize>();

/// Width of a pointer slot in a native table.
pub const PTR_WIDTH: usize = mem::size_of::<usize>();

thread_local! {
    static LIVE_BLOCKS: Cell<usize> = const { Cell::new(0) };
}

/// Number of native blocks currently allocated by this thread.
pub fn live_blocks() -> usize {
    LIVE_BLOCKS.with(Cell::get)
}

// ── NativeBuffer ──────────────────────────────────────────────────────────────

/// An owned, zero-filled, word-aligned block of native heap memory.
///
/// The block address is stable for the buffer's whole lifetime and may be
/// handed to the host as a message parameter.  It is freed by `release()` or
/// on `Drop`, whichever comes first.
pub struct NativeBuffer {
    ptr: Option<NonNull<u8>>,
    len: usize,
    layout: Layout,
}

impl NativeBuffer {
    /// Allocate `len` zeroed bytes, returning an error if the heap is
    /// exhausted.
    ///
    /// A zero-length request still allocates one word so that the buffer has
    /// a real, non-null address.
    pub fn try_zeroed(len: usize) -> Result<Self> {
        let layout = Layout::from_size_align(len.max(BLOCK_ALIGN), BLOCK_ALIGN)
            .map_err(|_| BridgeError::LayoutOverflow { count: len, width: 1 })?;
        // SAFETY: layout has a non-zero size (at least one word) and a valid
        // power-of-two alignment.
        let raw = unsafe { alloc::alloc_zeroed(layout) };
        let ptr = NonNull::new(raw).ok_or(BridgeError::OutOfMemory { size: layout.size() })?;
        LIVE_BLOCKS.with(|n| n.set(n.get() + 1));
        trace!(len, addr = raw as usize, "native block allocated");
        Ok(Self { ptr: Some(ptr), len, layout })
    }

    /// Allocate `len` zeroed bytes.
    ///
    /// Heap exhaustion is fatal here (`handle_alloc_error`); transient
    /// buffers have no fallback path.
    pub fn zeroed(len: usize) -> Self {
        match Self::try_zeroed(len) {
            Ok(buf) => buf,
            Err(BridgeError::OutOfMemory { size }) => {
                alloc::handle_alloc_error(Layout::from_size_align(size, BLOCK_ALIGN).unwrap_or(Layout::new::<usize>()))
            }
            Err(e) => panic!("{e}"),
        }
    }

    /// Allocate room for `count` items of `width` bytes each.
    pub fn try_array(count: usize, width: usize) -> Result<Self> {
        let len = count
            .checked_mul(width)
            .ok_or(BridgeError::LayoutOverflow { count, width })?;
        Self::try_zeroed(len)
    }

    /// Infallible counterpart of `try_array`; overflow is a programmer error.
    pub fn array(count: usize, width: usize) -> Self {
        let len = count
            .checked_mul(width)
            .unwrap_or_else(|| panic!("native array of {count} x {width} bytes overflows"));
        Self::zeroed(len)
    }

    /// Requested length in bytes (0 after release).
    pub fn len(&self) -> usize {
        if self.ptr.is_some() { self.len } else { 0 }
    }

    /// `true` if the buffer holds no bytes or has been released.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// `true` once `release()` has run.
    pub fn is_released(&self) -> bool {
        self.ptr.is_none()
    }

    /// Block address, or null after release.
    pub fn as_ptr(&self) -> *const u8 {
        self.ptr.map_or(ptr::null(), |p| p.as_ptr().cast_const())
    }

    /// Mutable block address, or null after release.
    pub fn as_mut_ptr(&mut self) -> *mut u8 {
        self.ptr.map_or(ptr::null_mut(), NonNull::as_ptr)
    }

    /// Block address as a message word.
    pub fn addr(&self) -> isize {
        self.as_ptr() as isize
    }

    /// View the block as bytes (empty after release).
    pub fn as_slice(&self) -> &[u8] {
        match self.ptr {
            // SAFETY: ptr is live and points to at least `len` initialised
            // (zero-filled or host-written) bytes owned by this buffer.
            Some(p) => unsafe { slice::from_raw_parts(p.as_ptr(), self.len) },
            None => &[],
        }
    }

    /// Mutable byte view of the block (empty after release).
    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        match self.ptr {
            // SAFETY: as for `as_slice`; `&mut self` guarantees exclusivity.
            Some(p) => unsafe { slice::from_raw_parts_mut(p.as_ptr(), self.len) },
            None => &mut [],
        }
    }

    // ── Typed field access ────────────────────────────────────────────────────
    //
    // All values are native-endian, matching what the host reads and writes.
    // Out-of-range offsets panic: layouts are fixed at compile time, so a bad
    // offset is a programmer error.

    /// Copy `bytes` into the block at `offset`.
    pub fn write_bytes(&mut self, offset: usize, bytes: &[u8]) {
        self.as_mut_slice()[offset..offset + bytes.len()].copy_from_slice(bytes);
    }

    pub fn write_i32(&mut self, offset: usize, value: i32) {
        self.write_bytes(offset, &value.to_ne_bytes());
    }

    pub fn read_i32(&self, offset: usize) -> i32 {
        let mut raw = [0u8; 4];
        raw.copy_from_slice(&self.as_slice()[offset..offset + 4]);
        i32::from_ne_bytes(raw)
    }

    pub fn write_usize(&mut self, offset: usize, value: usize) {
        self.write_bytes(offset, &value.to_ne_bytes());
    }

    pub fn read_usize(&self, offset: usize) -> usize {
        let mut raw = [0u8; PTR_WIDTH];
        raw.copy_from_slice(&self.as_slice()[offset..offset + PTR_WIDTH]);
        usize::from_ne_bytes(raw)
    }

    pub fn write_isize(&mut self, offset: usize, value: isize) {
        self.write_usize(offset, value as usize);
    }

    pub fn read_isize(&self, offset: usize) -> isize {
        self.read_usize(offset) as isize
    }

    /// Free the block.  Calling this more than once is a no-op.
    pub fn release(&mut self) {
        if let Some(p) = self.ptr.take() {
            // SAFETY: p was returned by alloc_zeroed with self.layout and has
            // not been freed: `take()` guarantees this runs at most once.
            unsafe { alloc::dealloc(p.as_ptr(), self.layout) };
            LIVE_BLOCKS.with(|n| n.set(n.get().saturating_sub(1)));
            trace!(len = self.len, addr = p.as_ptr() as usize, "native block released");
        }
    }
}

impl Drop for NativeBuffer {
    fn drop(&mut self) {
        self.release();
    }
}

impl std::fmt::Debug for NativeBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NativeBuffer")
            .field("addr", &self.as_ptr())
            .field("len", &self.len())
            .finish()
    }
}

// ── Disposal boundary ─────────────────────────────────────────────────────────

/// Run a release routine from a `Drop` impl without letting a panic escape.
///
/// A failure is logged and swallowed: disposal must never take the host
/// process down with it.
pub(crate) fn dispose<F: FnOnce()>(what: &'static str, release: F) {
    if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(release)) {
        let reason = payload
            .downcast_ref::<&str>()
            .copied()
            .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
            .unwrap_or("unknown panic");
        error!(what, reason, "native release failed; continuing");
    }
}

// ── LeakCheck ─────────────────────────────────────────────────────────────────

/// Scope guard that reports native blocks allocated but not freed since it
/// was created.
///
/// In debug builds a leak found on drop is logged with `warn!`.
pub struct LeakCheck {
    start: usize,
    armed: bool,
}

impl LeakCheck {
    pub fn begin() -> Self {
        Self { start: live_blocks(), armed: true }
    }

    /// Blocks allocated since `begin()` that are still live.
    pub fn outstanding(&self) -> usize {
        live_blocks().saturating_sub(self.start)
    }

    /// Disarm the guard and return the outstanding count.
    pub fn finish(mut self) -> usize {
        self.armed = false;
        self.outstanding()
    }
}

impl Drop for LeakCheck {
    fn drop(&mut self) {
        if self.armed && cfg!(debug_assertions) {
            let leaked = self.outstanding();
            if leaked > 0 {
                warn!(leaked, "native blocks still live at end of scope");
            }
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zeroed_buffer_is_all_zero() {
        let buf = NativeBuffer::zeroed(64);
        assert_eq!(buf.len(), 64);
        assert!(buf.as_slice().iter().all(|&b| b == 0));
    }

    #[test]
    fn zero_length_request_still_has_an_address() {
        let buf = NativeBuffer::zeroed(0);
        assert!(!buf.as_ptr().is_null());
        assert!(buf.is_empty());
    }

    #[test]
    fn address_is_word_aligned() {
        let buf = NativeBuffer::zeroed(3);
        assert_eq!(buf.as_ptr() as usize % BLOCK_ALIGN, 0);
    }

    #[test]
    fn release_twice_frees_once() {
        let leaks = LeakCheck::begin();
        let mut buf = NativeBuffer::zeroed(16);
        assert_eq!(leaks.outstanding(), 1);
        buf.release();
        buf.release();
        assert!(buf.is_released());
        assert!(buf.as_ptr().is_null());
        assert_eq!(buf.len(), 0);
        drop(buf);
        assert_eq!(leaks.finish(), 0);
    }

    #[test]
    fn typed_fields_roundtrip_at_offsets() {
        let mut buf = NativeBuffer::zeroed(32);
        buf.write_i32(4, -7);
        buf.write_usize(8, 0xDEAD);
        buf.write_isize(16, -3);
        assert_eq!(buf.read_i32(4), -7);
        assert_eq!(buf.read_usize(8), 0xDEAD);
        assert_eq!(buf.read_isize(16), -3);
        assert_eq!(buf.read_i32(0), 0);
    }

    #[test]
    fn array_overflow_is_reported() {
        let err = NativeBuffer::try_array(usize::MAX, 2).unwrap_err();
        assert!(matches!(err, BridgeError::LayoutOverflow { .. }));
    }

    #[test]
    fn dispose_swallows_panics() {
        dispose("test", || panic!("boom"));
        let mut ran = false;
        dispose("test", || ran = true);
        assert!(ran);
    }
}
