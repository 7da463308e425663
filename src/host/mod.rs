// ── Host gateways ─────────────────────────────────────────────────────────────
//
// Thin, typed front ends over `MessageChannel`: one for the host's main
// window, one per editor child window.  They own no native memory between
// calls.

pub mod messages;
mod notepad;
mod scintilla;

pub use notepad::{decode_version, NotepadGateway, NppVersion, PathKind};
pub use scintilla::ScintillaGateway;
