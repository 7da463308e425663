// ── Buffer lifecycle protocol ─────────────────────────────────────────────────
//
// Host-owned strings of unknown length are fetched in two phases:
//
//   QueryLength → Allocate → Fill → Decode → Release
//
// 1. Query: send the command with a null buffer; the reply is the length L
//    in code units (terminator excluded).  L <= 0 means "host has no data".
// 2. Allocate L + 1 units of zeroed native memory.
// 3. Fill: send the command again with the buffer address.
// 4. Decode according to the request's `FillReply` and `TextEncoding`.
// 5. Release the buffer before returning the owned `String`.
//
// Some commands skip the length query and fill a caller-sized buffer in one call
// (`fetch_fixed`).  Either way a failure reply is not an error: it yields an
// empty string and a `warn!` record, because many commands legitimately
// answer "not available".

use tracing::{debug, warn};

use crate::{
    channel::{send_traced, MessageChannel},
    native::{
        text::{decode, decode_units, TextEncoding},
        NativeBuffer,
    },
};

/// What the command expects in `wparam`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WordParam {
    /// The buffer capacity in code units (terminator included); 0 on the length query.
    Capacity,
    /// A fixed context value (line number, buffer id, style) on both calls.
    Context(usize),
}

/// How the fill call's result word is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FillReply {
    /// Non-zero on success, zero on failure.
    SuccessFlag,
    /// Number of code units written, terminator excluded.
    UnitCount,
    /// The reply carries nothing; decode up to the terminator.
    Ignored,
}

/// One string-returning host command and the conventions it follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StringRequest {
    pub msg: u32,
    pub word: WordParam,
    pub encoding: TextEncoding,
    pub reply: FillReply,
}

impl StringRequest {
    /// A request whose `wparam` is the buffer capacity and whose fill reply
    /// is a success flag (the host's usual convention for wide strings).
    pub const fn new(msg: u32, encoding: TextEncoding) -> Self {
        Self { msg, word: WordParam::Capacity, encoding, reply: FillReply::SuccessFlag }
    }

    pub const fn with_context(mut self, context: usize) -> Self {
        self.word = WordParam::Context(context);
        self
    }

    pub const fn with_reply(mut self, reply: FillReply) -> Self {
        self.reply = reply;
        self
    }

    fn wparam(&self, capacity_units: usize) -> usize {
        match self.word {
            WordParam::Capacity => capacity_units,
            WordParam::Context(value) => value,
        }
    }
}

// ── Phases ────────────────────────────────────────────────────────────────────

/// Ask the host for the length of the string, in code units.
///
/// Returns 0 when the host has no data (a zero or negative reply).
pub fn query_length<C: MessageChannel + ?Sized>(channel: &C, request: &StringRequest) -> usize {
    let reply = send_traced(channel, request.msg, request.wparam(0), 0);
    usize::try_from(reply).unwrap_or(0)
}

/// Ask the host to fill `buffer`; returns the raw reply word.
///
/// The capacity passed to the host is the buffer's whole size in code units.
pub fn fill<C: MessageChannel + ?Sized>(
    channel: &C,
    request: &StringRequest,
    buffer: &mut NativeBuffer,
) -> isize {
    let capacity_units = buffer.len() / request.encoding.unit_width();
    send_traced(channel, request.msg, request.wparam(capacity_units), buffer.addr())
}

/// Full two-phase fetch.  An empty string means the host had no data or
/// reported failure.
pub fn fetch_string<C: MessageChannel + ?Sized>(channel: &C, request: &StringRequest) -> String {
    let len = query_length(channel, request);
    if len == 0 {
        debug!(msg = request.msg, "host has no data");
        return String::new();
    }
    fetch_known_length(channel, request, len)
}

/// Allocate, fill, decode and release for a length obtained elsewhere
/// (for example from a dedicated length query such as `SCI_GETLENGTH`).
pub fn fetch_known_length<C: MessageChannel + ?Sized>(
    channel: &C,
    request: &StringRequest,
    len: usize,
) -> String {
    let mut buffer = NativeBuffer::array(len + 1, request.encoding.unit_width());
    let reply = fill(channel, request, &mut buffer);
    let text = decode_reply(request, reply, buffer.as_slice());
    buffer.release();
    text.unwrap_or_default()
}

/// Single-call convention: fill a buffer of `capacity` units plus terminator.
///
/// Text longer than `capacity` is truncated by the host; that is not
/// reported.
pub fn fetch_fixed<C: MessageChannel + ?Sized>(
    channel: &C,
    request: &StringRequest,
    capacity: usize,
) -> String {
    fetch_known_length(channel, request, capacity.max(1))
}

fn decode_reply(request: &StringRequest, reply: isize, bytes: &[u8]) -> Option<String> {
    match request.reply {
        FillReply::SuccessFlag if reply == 0 => {
            warn!(
                msg = request.msg,
                encoding = request.encoding.as_str(),
                "host reported failure filling buffer; discarding"
            );
            None
        }
        FillReply::UnitCount if reply < 0 => {
            warn!(
                msg = request.msg,
                encoding = request.encoding.as_str(),
                reply,
                "host returned a negative length; discarding"
            );
            None
        }
        FillReply::UnitCount => Some(decode_units(bytes, request.encoding, reply as usize)),
        FillReply::SuccessFlag | FillReply::Ignored => Some(decode(bytes, request.encoding)),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
