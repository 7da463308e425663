// ── Message channel abstraction ───────────────────────────────────────────────
//
// Every exchange with the host is one synchronous `send`: a command code and
// two machine words in, one machine word out.  The marshaling core only
// shapes the words; it never interprets a command code.
//
// No `unsafe` lives here.  The Win32 implementation is confined to the
// `win32` sub-module and is compiled on Windows only.

#[cfg(windows)]
pub mod win32;

use tracing::trace;

/// The synchronous command-dispatch mechanism connecting plugin and host.
///
/// Implementations block until the host has processed the message.  Any
/// buffer whose address is passed in `wparam` or `lparam` must stay alive for
/// the duration of the call; the owners in this crate guarantee that by
/// borrowing themselves across the `send`.
pub trait MessageChannel {
    fn send(&self, msg: u32, wparam: usize, lparam: isize) -> isize;
}

impl<C: MessageChannel + ?Sized> MessageChannel for &C {
    fn send(&self, msg: u32, wparam: usize, lparam: isize) -> isize {
        (**self).send(msg, wparam, lparam)
    }
}

/// Send with trace logging.  All crate-internal sends go through here.
pub(crate) fn send_traced<C: MessageChannel + ?Sized>(
    channel: &C,
    msg: u32,
    wparam: usize,
    lparam: isize,
) -> isize {
    let result = channel.send(msg, wparam, lparam);
    trace!(msg, wparam, lparam, result, "host message");
    result
}

// ── NppData ───────────────────────────────────────────────────────────────────

/// Window handles the host passes to the plugin at load time (`setInfo`).
///
/// Layout matches the host's `NppData` struct: three handle-sized words.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NppData {
    pub npp_handle: isize,
    pub scintilla_main_handle: isize,
    pub scintilla_second_handle: isize,
}

// ── Tests ─────────────────────────────────────────────────────────────────────
