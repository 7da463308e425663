// ── Host main-window gateway ──────────────────────────────────────────────────
//
// String queries against the host's main window.  Every buffer here is
// transient: allocated, filled, decoded and released inside one call.

use tracing::{debug, warn};

use super::messages::{
    ALL_OPEN_FILES, NPPM_GETCURRENTDIRECTORY, NPPM_GETCURRENTSCINTILLA, NPPM_GETCURRENTWORD,
    NPPM_GETFILENAME, NPPM_GETFULLCURRENTPATH, NPPM_GETFULLPATHFROMBUFFERID,
    NPPM_GETNBOPENFILES, NPPM_GETNPPDIRECTORY, NPPM_GETNPPVERSION, NPPM_GETOPENFILENAMES,
    NPPM_GETPLUGINHOMEPATH, NPPM_GETPLUGINSCONFIGDIR,
};
use crate::{
    channel::{send_traced, MessageChannel, NppData},
    native::{text::TextEncoding, NativeBuffer},
    protocol::{self, FillReply, StringRequest},
    string_array::WideStringArray,
    MAX_PATH,
};

/// Which current-document string `NotepadGateway::current_path` asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathKind {
    FullPath,
    Directory,
    FileName,
    CurrentWord,
    NppDirectory,
}

impl PathKind {
    fn message(self) -> u32 {
        match self {
            Self::FullPath => NPPM_GETFULLCURRENTPATH,
            Self::Directory => NPPM_GETCURRENTDIRECTORY,
            Self::FileName => NPPM_GETFILENAME,
            Self::CurrentWord => NPPM_GETCURRENTWORD,
            Self::NppDirectory => NPPM_GETNPPDIRECTORY,
        }
    }
}

/// Host version as `(major, minor, patch)`.
pub type NppVersion = (u32, u32, u32);

/// Split the packed version word.
///
/// The high word is the major version.  The low word holds the remaining
/// digits run together in decimal (`5` for 8.5, `71` for 7.7.1): the first
/// digit is the minor version and the last one the patch.
pub fn decode_version(word: isize) -> NppVersion {
    let word = word as u32;
    let major = word >> 16;
    let mut minor = (word & 0xffff) * 10;
    let mut patch = 0;
    while minor > 9 {
        patch = minor % 10;
        minor /= 10;
    }
    (major, minor, patch)
}

/// Typed access to the host's main window.
pub struct NotepadGateway<C> {
    channel: C,
}

impl<C: MessageChannel> NotepadGateway<C> {
    pub fn new(channel: C) -> Self {
        Self { channel }
    }

    pub fn channel(&self) -> &C {
        &self.channel
    }

    /// Two-phase wide string for a message that takes `(capacity, buffer)`
    /// and answers the fill with a success flag.
    pub fn string(&self, msg: u32) -> String {
        protocol::fetch_string(&self.channel, &StringRequest::new(msg, TextEncoding::Wide))
    }

    pub fn plugin_config_dir(&self) -> String {
        self.string(NPPM_GETPLUGINSCONFIGDIR)
    }

    pub fn plugin_home_path(&self) -> String {
        let request = StringRequest::new(NPPM_GETPLUGINHOMEPATH, TextEncoding::Wide)
            .with_reply(FillReply::UnitCount);
        protocol::fetch_string(&self.channel, &request)
    }

    /// Full path of the document behind `buffer_id`; empty for an unknown id.
    pub fn file_path(&self, buffer_id: usize) -> String {
        let request = StringRequest::new(NPPM_GETFULLPATHFROMBUFFERID, TextEncoding::Wide)
            .with_context(buffer_id)
            .with_reply(FillReply::Ignored);
        protocol::fetch_string(&self.channel, &request)
    }

    /// One of the current-document strings, fetched into a `MAX_PATH`
    /// buffer without a length query.  Longer values are truncated by the host.
    pub fn current_path(&self, kind: PathKind) -> String {
        let request = StringRequest::new(kind.message(), TextEncoding::Wide);
        protocol::fetch_fixed(&self.channel, &request, MAX_PATH - 1)
    }

    /// Paths of every open document, in the host's order.
    ///
    /// Each path is truncated to `MAX_PATH - 1` characters.
    pub fn open_file_names(&self) -> Vec<String> {
        let count = send_traced(&self.channel, NPPM_GETNBOPENFILES, 0, ALL_OPEN_FILES);
        let Ok(count) = usize::try_from(count) else {
            warn!(count, "host reported a negative open-file count");
            return Vec::new();
        };
        if count == 0 {
            return Vec::new();
        }

        let mut names = WideStringArray::new(count, MAX_PATH - 1);
        let filled =
            send_traced(&self.channel, NPPM_GETOPENFILENAMES, names.addr() as usize, count as isize);
        let result = if filled != 0 {
            names.decode(TextEncoding::Wide)
        } else {
            warn!(count, "host did not fill the open-file table");
            Vec::new()
        };
        names.release();
        debug!(count = result.len(), "open file names read");
        result
    }

    pub fn version(&self) -> NppVersion {
        decode_version(send_traced(&self.channel, NPPM_GETNPPVERSION, 0, 0))
    }

    /// Handle of the editor that currently has focus.
    pub fn current_scintilla(&self, data: &NppData) -> isize {
        let mut view = NativeBuffer::zeroed(4);
        send_traced(&self.channel, NPPM_GETCURRENTSCINTILLA, 0, view.addr());
        let which = view.read_i32(0);
        view.release();
        if which == 0 {
            data.scintilla_main_handle
        } else {
            data.scintilla_second_handle
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
