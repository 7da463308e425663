// ── Unit-test host stand-in ───────────────────────────────────────────────────
//
// Compiled for `cargo test` only.  `poke`/`peek` play the host's side of the
// boundary: writing into and reading from buffers whose addresses arrive as
// message words.

#![allow(unsafe_code)]

use std::{cell::RefCell, ptr};

use crate::channel::MessageChannel;

type Handler = Box<dyn Fn(u32, usize, isize) -> isize>;

/// A scripted host: every `send` is logged and answered by `handler`.
pub(crate) struct FakeHost {
    handler: Handler,
    calls: RefCell<Vec<(u32, usize, isize)>>,
}

impl FakeHost {
    pub(crate) fn new(handler: impl Fn(u32, usize, isize) -> isize + 'static) -> Self {
        Self { handler: Box::new(handler), calls: RefCell::new(Vec::new()) }
    }

    pub(crate) fn calls(&self) -> Vec<(u32, usize, isize)> {
        self.calls.borrow().clone()
    }
}

impl MessageChannel for FakeHost {
    fn send(&self, msg: u32, wparam: usize, lparam: isize) -> isize {
        self.calls.borrow_mut().push((msg, wparam, lparam));
        (self.handler)(msg, wparam, lparam)
    }
}

/// Copy `bytes` to the native address `addr`.
///
/// # Safety
/// `addr` must point to a live, writable block of at least `bytes.len()`
/// bytes.
pub(crate) unsafe fn poke(addr: isize, bytes: &[u8]) {
    ptr::copy_nonoverlapping(bytes.as_ptr(), addr as *mut u8, bytes.len());
}

/// Read one pointer-sized word from the native address `addr`.
///
/// # Safety
/// `addr` must point to a live block holding at least one word.
pub(crate) unsafe fn peek_word(addr: isize) -> usize {
    ptr::read_unaligned(addr as *const usize)
}

/// `s` as native-endian UTF-16 bytes with a terminator unit.
pub(crate) fn wide_z(s: &str) -> Vec<u8> {
    s.encode_utf16().chain(std::iter::once(0)).flat_map(u16::to_ne_bytes).collect()
}
