// ── Editor gateway ────────────────────────────────────────────────────────────
//
// String queries against one Scintilla child window.  Scintilla works in
// UTF-8 bytes: length queries answer with a byte count and fills answer with the
// number of bytes written, so the decoded text is cut at that count and any
// trailing terminators are stripped.

use tracing::warn;

use super::messages::{
    SCI_GETCURLINE, SCI_GETLENGTH, SCI_GETLINE, SCI_GETSELTEXT, SCI_GETTAG, SCI_GETTARGETTEXT,
    SCI_GETTEXT, SCI_GETTEXTRANGEFULL, SCI_GETWORDCHARS, SCI_STYLEGETFONT,
};
use crate::{
    channel::{send_traced, MessageChannel},
    native::text::TextEncoding,
    protocol::{self, FillReply, StringRequest},
    text_range::{CharacterRange, TextRange},
};

/// Typed access to one editor window.
pub struct ScintillaGateway<C> {
    channel: C,
}

impl<C: MessageChannel> ScintillaGateway<C> {
    pub fn new(channel: C) -> Self {
        Self { channel }
    }

    pub fn channel(&self) -> &C {
        &self.channel
    }

    /// Two-phase UTF-8 fetch for a message whose `wparam` is `context` on
    /// both calls.
    fn context_string(&self, msg: u32, context: usize) -> String {
        let request = StringRequest::new(msg, TextEncoding::Utf8)
            .with_context(context)
            .with_reply(FillReply::UnitCount);
        protocol::fetch_string(&self.channel, &request)
    }

    /// Byte length of the document.
    pub fn length(&self) -> usize {
        usize::try_from(send_traced(&self.channel, SCI_GETLENGTH, 0, 0)).unwrap_or(0)
    }

    /// The whole document.
    pub fn text(&self) -> String {
        let len = self.length();
        if len == 0 {
            return String::new();
        }
        let request = StringRequest::new(SCI_GETTEXT, TextEncoding::Utf8)
            .with_reply(FillReply::UnitCount);
        protocol::fetch_known_length(&self.channel, &request, len)
    }

    /// Text of the line holding the caret, line end included.
    pub fn cur_line(&self) -> String {
        let request = StringRequest::new(SCI_GETCURLINE, TextEncoding::Utf8)
            .with_reply(FillReply::Ignored);
        protocol::fetch_string(&self.channel, &request)
    }

    /// Text of line `line` (0-based), line end included.
    pub fn line(&self, line: usize) -> String {
        self.context_string(SCI_GETLINE, line)
    }

    pub fn selected_text(&self) -> String {
        self.context_string(SCI_GETSELTEXT, 0)
    }

    pub fn target_text(&self) -> String {
        self.context_string(SCI_GETTARGETTEXT, 0)
    }

    /// Value of regex tag `tag` from the last search.
    pub fn tag(&self, tag: usize) -> String {
        self.context_string(SCI_GETTAG, tag)
    }

    pub fn word_chars(&self) -> String {
        self.context_string(SCI_GETWORDCHARS, 0)
    }

    /// Font face of style `style`.
    pub fn style_font(&self, style: usize) -> String {
        self.context_string(SCI_STYLEGETFONT, style)
    }

    /// Send `SCI_GETTEXTRANGEFULL` with a prepared range; returns the number
    /// of bytes the editor copied.
    pub fn fill_text_range(&self, range: &mut TextRange) -> isize {
        let copied = send_traced(&self.channel, SCI_GETTEXTRANGEFULL, 0, range.addr());
        range.sync();
        copied
    }

    /// Text between byte positions `start` and `end`.  A reversed or empty
    /// range yields an empty string.
    pub fn text_range(&self, start: isize, end: isize) -> String {
        let span = CharacterRange::new(start, end);
        if span.is_empty() {
            return String::new();
        }
        let mut range = TextRange::prepare(span, span.len() + 1, TextEncoding::Utf8);
        let copied = self.fill_text_range(&mut range);
        let text = match usize::try_from(copied) {
            Ok(units) => range.text_units(units),
            Err(_) => {
                warn!(start, end, copied, "editor rejected text range");
                String::new()
            }
        };
        range.release();
        text
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
