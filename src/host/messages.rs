// ── Host message constants ────────────────────────────────────────────────────
//
// Source of truth: Notepad_plus_msgs.h and Scintilla.h.
// Only the subset used by the gateways is listed here.
// NPPM_* go to the host's main window; SCI_* to an editor child window.

// ── Base offsets ──────────────────────────────────────────────────────────────

const WM_USER: u32 = 0x0400;
/// Base of the general host messages.
pub const NPPMSG: u32 = WM_USER + 1000;
/// Base of the "run command" path messages.
pub const RUNCOMMAND_USER: u32 = WM_USER + 3000;

// ── Host: views and files ─────────────────────────────────────────────────────

/// Which editor has focus.  WPARAM=0; LPARAM=`int*` out (0 = main view).
pub const NPPM_GETCURRENTSCINTILLA: u32 = NPPMSG + 4;
/// Number of open files.  LPARAM = view selector (`ALL_OPEN_FILES`).
pub const NPPM_GETNBOPENFILES: u32 = NPPMSG + 7;
/// Fill a `wchar_t**` table.  WPARAM=table ptr; LPARAM=slot count.
pub const NPPM_GETOPENFILENAMES: u32 = NPPMSG + 8;
/// Plugin configuration directory.  WPARAM=capacity; LPARAM=buffer (null asks for the length).
pub const NPPM_GETPLUGINSCONFIGDIR: u32 = NPPMSG + 46;
/// Packed version word: HIWORD major, LOWORD minor digits.
pub const NPPM_GETNPPVERSION: u32 = NPPMSG + 50;
/// Full path of a buffer.  WPARAM=buffer id; LPARAM=buffer (null asks for the length).
pub const NPPM_GETFULLPATHFROMBUFFERID: u32 = NPPMSG + 58;
/// Plugin installation root.  WPARAM=capacity; LPARAM=buffer (null asks for the length).
pub const NPPM_GETPLUGINHOMEPATH: u32 = NPPMSG + 97;

/// View selector for `NPPM_GETNBOPENFILES`: both views.
pub const ALL_OPEN_FILES: isize = 0;

// ── Host: current document paths (fixed MAX_PATH buffer) ──────────────────────

pub const NPPM_GETFULLCURRENTPATH: u32 = RUNCOMMAND_USER + 1;
pub const NPPM_GETCURRENTDIRECTORY: u32 = RUNCOMMAND_USER + 2;
pub const NPPM_GETFILENAME: u32 = RUNCOMMAND_USER + 3;
pub const NPPM_GETCURRENTWORD: u32 = RUNCOMMAND_USER + 6;
pub const NPPM_GETNPPDIRECTORY: u32 = RUNCOMMAND_USER + 7;

// ── Scintilla: document content ───────────────────────────────────────────────

/// Return byte count of the document (excluding null terminator).
pub const SCI_GETLENGTH: u32 = 2006;
/// Text of the caret line.  WPARAM=buffer len; reply is the caret column.
pub const SCI_GETCURLINE: u32 = 2027;
/// Range copy with `isize` positions.  LPARAM=`Sci_TextRangeFull*`.
pub const SCI_GETTEXTRANGEFULL: u32 = 2039;
/// Text of line WPARAM, EOL included; not terminated by Scintilla.
pub const SCI_GETLINE: u32 = 2153;
/// Selected text; reply is its byte length.
pub const SCI_GETSELTEXT: u32 = 2161;
/// Copy document bytes.  WPARAM=buffer len (incl. null); LPARAM=buffer ptr.
pub const SCI_GETTEXT: u32 = 2182;
/// Text between target start and end.
pub const SCI_GETTARGETTEXT: u32 = 2687;

// ── Scintilla: configuration strings ──────────────────────────────────────────

/// Font face of style WPARAM.
pub const SCI_STYLEGETFONT: u32 = 2486;
/// Characters currently treated as word characters.
pub const SCI_GETWORDCHARS: u32 = 2646;
/// Value of tag WPARAM from the last regex search.
pub const SCI_GETTAG: u32 = 2616;
