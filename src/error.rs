// ── Central error type ────────────────────────────────────────────────────────
//
// Fallible marshaling operations return `error::Result<T>`.  Host-side "no
// data" replies are not errors: they surface as empty values (see
// `protocol`).  Disposal never returns an error; failures there are logged.

use thiserror::Error;

/// Every error that the bridge can produce.
#[derive(Debug, Error)]
pub enum BridgeError {
    /// The native heap could not satisfy an allocation.
    #[error("native allocation of {size} bytes failed")]
    OutOfMemory {
        /// Requested size in bytes.
        size: usize,
    },

    /// `count * width` does not fit in a `usize` or a valid `Layout`.
    #[error("native block of {count} x {width} bytes overflows the address space")]
    LayoutOverflow { count: usize, width: usize },

    /// An owner was used after its native memory was released.
    #[error("{what} was used after release")]
    Released {
        /// Type name of the released owner, for display purposes.
        what: &'static str,
    },

    /// A standard I/O error (settings file, log file).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The settings file could not be serialized or parsed.
    #[error("settings JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, BridgeError>;
