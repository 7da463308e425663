// Shared host simulator for the integration tests.
//
// Answers the string messages the way the real host and editor do: a null
// buffer is a length query and gets the length, a non-null buffer gets the bytes.

#![allow(dead_code)]

use std::{cell::RefCell, ptr};

use npp_bridge::{host::messages::*, native::PTR_WIDTH, MessageChannel};

pub struct SimulatedHost {
    pub config_dir: String,
    pub open_files: Vec<String>,
    pub document: String,
    pub version: isize,
    pub current_view: i32,
    pub log: RefCell<Vec<u32>>,
}

impl Default for SimulatedHost {
    fn default() -> Self {
        Self {
            config_dir: "C:\\Users\\dev\\AppData\\Roaming\\Notepad++\\plugins\\config".into(),
            open_files: vec!["C:\\src\\main.rs".into(), "C:\\src\\lib.rs".into()],
            document: "first line\nsecond line\n".into(),
            version: (8 << 16) | 64,
            current_view: 0,
            log: RefCell::new(Vec::new()),
        }
    }
}

fn wide_z(s: &str) -> Vec<u8> {
    s.encode_utf16().chain(std::iter::once(0)).flat_map(u16::to_ne_bytes).collect()
}

unsafe fn poke(addr: isize, bytes: &[u8]) {
    ptr::copy_nonoverlapping(bytes.as_ptr(), addr as *mut u8, bytes.len());
}

unsafe fn peek_word(addr: isize) -> usize {
    ptr::read_unaligned(addr as *const usize)
}

impl MessageChannel for SimulatedHost {
    fn send(&self, msg: u32, wparam: usize, lparam: isize) -> isize {
        self.log.borrow_mut().push(msg);
        match msg {
            NPPM_GETPLUGINSCONFIGDIR => {
                if lparam == 0 {
                    return self.config_dir.encode_utf16().count() as isize;
                }
                // SAFETY: the bridge sized the buffer from our length reply.
                unsafe { poke(lparam, &wide_z(&self.config_dir)) };
                1
            }
            NPPM_GETNPPVERSION => self.version,
            NPPM_GETCURRENTSCINTILLA => {
                // SAFETY: lparam is a 4-byte out parameter.
                unsafe { poke(lparam, &self.current_view.to_ne_bytes()) };
                1
            }
            NPPM_GETNBOPENFILES => self.open_files.len() as isize,
            NPPM_GETOPENFILENAMES => {
                let slots = (lparam as usize).min(self.open_files.len());
                for (slot, name) in self.open_files.iter().take(slots).enumerate() {
                    let units: Vec<u16> = name.encode_utf16().take(259).chain([0]).collect();
                    let bytes: Vec<u8> = units.iter().flat_map(|u| u.to_ne_bytes()).collect();
                    // SAFETY: wparam is a table of at least `lparam` slots,
                    // each pointing to a MAX_PATH wide buffer.
                    unsafe {
                        let item = peek_word(wparam as isize + (slot * PTR_WIDTH) as isize);
                        poke(item as isize, &bytes);
                    }
                }
                slots as isize
            }
            NPPM_GETFULLCURRENTPATH => {
                let path = self.open_files.first().cloned().unwrap_or_default();
                let units: Vec<u16> =
                    path.encode_utf16().take(wparam.saturating_sub(1)).chain([0]).collect();
                let bytes: Vec<u8> = units.iter().flat_map(|u| u.to_ne_bytes()).collect();
                // SAFETY: wparam is the buffer capacity in wide units.
                unsafe { poke(lparam, &bytes) };
                1
            }
            SCI_GETLENGTH => self.document.len() as isize,
            SCI_GETTEXT => {
                let n = self.document.len().min(wparam.saturating_sub(1));
                // SAFETY: lparam is a buffer of `wparam` bytes.
                unsafe { poke(lparam, &self.document.as_bytes()[..n]) };
                n as isize
            }
            SCI_GETTEXTRANGEFULL => {
                // SAFETY: lparam is a live Sci_TextRangeFull whose text
                // buffer holds cp_max - cp_min + 1 bytes.
                unsafe {
                    let min = peek_word(lparam);
                    let max = peek_word(lparam + PTR_WIDTH as isize).min(self.document.len());
                    let out = peek_word(lparam + 2 * PTR_WIDTH as isize);
                    let bytes = &self.document.as_bytes()[min.min(max)..max];
                    poke(out as isize, bytes);
                    bytes.len() as isize
                }
            }
            _ => 0,
        }
    }
}
