// ── Safety policy ────────────────────────────────────────────────────────────
// Unsafe code is forbidden everywhere except:
//   • `native`          – heap blocks handed across the host boundary
//   • `string_array`    – following the pointer table back to its items
//   • `channel::win32`  – `SendMessageW`
// Each unsafe block in those modules MUST carry a `// SAFETY:` comment.
#![deny(unsafe_code)]

//! Native-memory marshaling between an editor plugin and its host.
//!
//! The host talks to plugins through synchronous window messages whose
//! parameters are machine words.  This crate shapes those words: it owns the
//! native buffers whose addresses travel in them, lays records out
//! byte-exactly, and decodes what the host wrote back into owned Rust
//! values.
//!
//! * [`protocol`]: the length query, allocate, fill, decode, release cycle for
//!   host-owned strings.
//! * [`string_array::WideStringArray`]: a null-terminated table of wide
//!   string buffers.
//! * [`func_table::FuncItemTable`]: the growable command-record array the
//!   host reads at load time.
//! * [`text_range::TextRange`]: a range descriptor plus output buffer.
//! * [`host`]: typed gateways over the above.

pub mod channel;
pub mod commands;
pub mod error;
pub mod func_table;
pub mod host;
pub mod logging;
pub mod native;
pub mod protocol;
pub mod settings;
pub mod string_array;
pub mod text_range;

#[cfg(test)]
mod testing;

/// Host path buffer size in wide characters, terminator included.
pub const MAX_PATH: usize = 260;

pub use channel::{MessageChannel, NppData};
pub use error::{BridgeError, Result};
pub use func_table::{FuncItem, FuncItemTable, PluginFunc, ShortcutKey};
pub use native::{text::TextEncoding, NativeBuffer};
pub use string_array::WideStringArray;
pub use text_range::{CharacterRange, TextRange};
