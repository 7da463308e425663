// ── Win32 message channel ─────────────────────────────────────────────────────
//
// One of the modules where `unsafe` is permitted.  Every `unsafe` block MUST
// carry a `// SAFETY:` comment that states which invariant makes the call
// sound and what the caller is responsible for maintaining.

#![allow(unsafe_code)]

use std::ffi::c_void;

use windows::Win32::{
    Foundation::{HWND, LPARAM, WPARAM},
    UI::WindowsAndMessaging::SendMessageW,
};

use super::{MessageChannel, NppData};

/// A host window (the main window or an editor child) reached through
/// `SendMessageW`.
///
/// Does **not** own the window: the host creates and destroys it.  The handle
/// must stay valid while the plugin is loaded, which the host guarantees for
/// the handles it passes in `NppData`.
#[derive(Debug, Clone, Copy)]
pub struct HostWindow {
    hwnd: HWND,
}

impl HostWindow {
    /// Wrap a raw handle word as received from the host.
    pub fn from_raw(handle: isize) -> Self {
        Self { hwnd: HWND(handle as *mut c_void) }
    }

    /// The host's main window.
    pub fn main(data: &NppData) -> Self {
        Self::from_raw(data.npp_handle)
    }

    pub fn hwnd(&self) -> HWND {
        self.hwnd
    }
}

impl MessageChannel for HostWindow {
    fn send(&self, msg: u32, wparam: usize, lparam: isize) -> isize {
        // SAFETY: hwnd is a host-owned window that outlives the plugin.
        // Any pointer carried in wparam/lparam is owned by the caller and
        // borrowed across this synchronous call (see `MessageChannel`).
        unsafe { SendMessageW(self.hwnd, msg, WPARAM(wparam), LPARAM(lparam)).0 }
    }
}
