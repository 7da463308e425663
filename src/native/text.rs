// ── Host string encodings ─────────────────────────────────────────────────────
//
// The host speaks two string conventions: wide (UTF-16, native-endian
// `wchar_t`) for paths and names, and byte buffers for document text.  The
// caller picks the convention per command; nothing here guesses.

/// How the bytes of a native string buffer are to be interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextEncoding {
    /// UTF-8 bytes (the editor component's document encoding).
    #[default]
    Utf8,
    /// Native-endian UTF-16 code units (`wchar_t` on Windows).
    Wide,
    /// Legacy single-byte text, decoded as Latin-1.
    Ansi,
}

impl TextEncoding {
    /// Byte width of one code unit.
    pub fn unit_width(self) -> usize {
        match self {
            Self::Wide => 2,
            Self::Utf8 | Self::Ansi => 1,
        }
    }

    /// Short display string for log fields.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Utf8 => "UTF-8",
            Self::Wide => "UTF-16",
            Self::Ansi => "ANSI",
        }
    }
}

// ── Encode ────────────────────────────────────────────────────────────────────

/// Encode `text` as native code units, keeping at most `max_units` units.
///
/// No terminator is appended.  Truncation is silent:
/// * UTF-8 stops at the last whole character that fits.
/// * Wide keeps exactly `max_units` code units; a surrogate pair split at the
///   boundary decodes later as U+FFFD.
/// * ANSI maps characters above U+00FF to `?`.
pub fn encode(text: &str, encoding: TextEncoding, max_units: usize) -> Vec<u8> {
    match encoding {
        TextEncoding::Utf8 => {
            let mut end = text.len().min(max_units);
            while !text.is_char_boundary(end) {
                end -= 1;
            }
            text.as_bytes()[..end].to_vec()
        }
        TextEncoding::Wide => text
            .encode_utf16()
            .take(max_units)
            .flat_map(u16::to_ne_bytes)
            .collect(),
        TextEncoding::Ansi => text
            .chars()
            .take(max_units)
            .map(|c| u8::try_from(u32::from(c)).unwrap_or(b'?'))
            .collect(),
    }
}

// ── Decode ────────────────────────────────────────────────────────────────────

/// Drop trailing zero bytes from a UTF-8 buffer.
///
/// Only valid for UTF-8: no UTF-8 sequence other than U+0000 contains a zero
/// byte, so every trailing zero is a terminator or padding.  In UTF-16 a zero
/// byte can be half of a real character.
pub fn strip_trailing_nuls(bytes: &[u8]) -> &[u8] {
    let end = bytes.iter().rposition(|&b| b != 0).map_or(0, |i| i + 1);
    &bytes[..end]
}

/// Decode a native buffer into an owned string.
///
/// * UTF-8: trailing terminators are stripped backwards; interior zeros are
///   kept.  Invalid sequences decode lossily.
/// * Wide / ANSI: decoding stops at the first terminator unit.
pub fn decode(bytes: &[u8], encoding: TextEncoding) -> String {
    match encoding {
        TextEncoding::Utf8 => String::from_utf8_lossy(strip_trailing_nuls(bytes)).into_owned(),
        TextEncoding::Ansi => bytes
            .iter()
            .take_while(|&&b| b != 0)
            .map(|&b| char::from(b))
            .collect(),
        TextEncoding::Wide => {
            let units: Vec<u16> = bytes
                .chunks_exact(2)
                .map(|pair| u16::from_ne_bytes([pair[0], pair[1]]))
                .take_while(|&u| u != 0)
                .collect();
            String::from_utf16_lossy(&units)
        }
    }
}

/// Decode up to the first terminator unit, whatever the encoding.
///
/// For buffers the host may fill more than once: bytes left after the
/// terminator by an earlier, longer fill are never returned.
pub fn decode_terminated(bytes: &[u8], encoding: TextEncoding) -> String {
    let width = encoding.unit_width();
    let end = bytes
        .chunks_exact(width)
        .position(|unit| unit.iter().all(|&b| b == 0))
        .map_or(bytes.len() - bytes.len() % width, |i| i * width);
    decode(&bytes[..end], encoding)
}

/// Decode at most `units` code units from the start of `bytes`.
pub fn decode_units(bytes: &[u8], encoding: TextEncoding, units: usize) -> String {
    let end = units.saturating_mul(encoding.unit_width()).min(bytes.len());
    decode(&bytes[..end], encoding)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
