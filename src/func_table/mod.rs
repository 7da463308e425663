// ── Plugin command table ──────────────────────────────────────────────────────
//
// The host reads the plugin's menu commands from one contiguous native array
// of `FuncItem` records (returned by the `getFuncsArray` export).  The array
// must stay valid for as long as the plugin is loaded, and the host writes
// the real command ids back into it after registration.
//
// Record layout (must match the host byte for byte):
//
//   offset            field        width
//   0                 name         64 × u16 (UTF-16, terminated, zero padded)
//   128               func         pointer
//   128 + P           cmd_id       i32
//   128 + P + 4       checked      i32 (0 / 1)
//   128 + P + 8       shortcut     pointer to a 4-byte ShortcutKey, or null
//   record width      128 + 2P + 8
//
// where P is the pointer width.  The offsets are asserted at compile time
// against a `#[repr(C)]` mirror of the host struct.
//
// No `unsafe` here: all byte access goes through `NativeBuffer`.

use std::mem;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    error::{BridgeError, Result},
    native::{
        self,
        text::{self, TextEncoding},
        NativeBuffer, PTR_WIDTH,
    },
};

/// Length of the fixed name field, in wide characters (terminator included).
pub const MENU_TITLE_LENGTH: usize = 64;

/// A plugin command entry point, as called by the host.
pub type PluginFunc = extern "C" fn();

// ── Layout ────────────────────────────────────────────────────────────────────

pub const NAME_OFFSET: usize = 0;
pub const FUNC_OFFSET: usize = NAME_OFFSET + MENU_TITLE_LENGTH * 2;
pub const CMD_ID_OFFSET: usize = FUNC_OFFSET + PTR_WIDTH;
pub const CHECKED_OFFSET: usize = CMD_ID_OFFSET + 4;
pub const SHORTCUT_OFFSET: usize = CHECKED_OFFSET + 4;
/// Byte width of one record.
pub const RECORD_WIDTH: usize = SHORTCUT_OFFSET + PTR_WIDTH;

/// Byte width of a side-allocated shortcut block.
pub const SHORTCUT_WIDTH: usize = 4;

/// Mirror of the host's `FuncItem`; never instantiated.
#[allow(dead_code)]
#[repr(C)]
struct HostFuncItem {
    item_name: [u16; MENU_TITLE_LENGTH],
    p_func: usize,
    cmd_id: i32,
    init2check: i32,
    p_sh_key: usize,
}

const _: () = {
    assert!(mem::offset_of!(HostFuncItem, item_name) == NAME_OFFSET);
    assert!(mem::offset_of!(HostFuncItem, p_func) == FUNC_OFFSET);
    assert!(mem::offset_of!(HostFuncItem, cmd_id) == CMD_ID_OFFSET);
    assert!(mem::offset_of!(HostFuncItem, init2check) == CHECKED_OFFSET);
    assert!(mem::offset_of!(HostFuncItem, p_sh_key) == SHORTCUT_OFFSET);
    assert!(mem::size_of::<HostFuncItem>() == RECORD_WIDTH);
};

// ── Records ───────────────────────────────────────────────────────────────────

/// A keyboard shortcut, marshaled as `{ctrl, alt, shift, key}` bytes.
///
/// A key code of 0 means "no shortcut".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShortcutKey {
    #[serde(default)]
    pub ctrl: bool,
    #[serde(default)]
    pub alt: bool,
    #[serde(default)]
    pub shift: bool,
    /// Virtual-key code.
    pub key: u8,
}

impl ShortcutKey {
    pub const fn new(ctrl: bool, alt: bool, shift: bool, key: u8) -> Self {
        Self { ctrl, alt, shift, key }
    }

    /// `true` if the shortcut names a key.
    pub fn is_set(&self) -> bool {
        self.key != 0
    }

    /// The 4-byte native representation.
    pub fn to_native(self) -> [u8; SHORTCUT_WIDTH] {
        [u8::from(self.ctrl), u8::from(self.alt), u8::from(self.shift), self.key]
    }
}

/// One plugin command, as the plugin describes it.
#[derive(Debug, Clone)]
pub struct FuncItem {
    /// Menu text.  Truncated to `MENU_TITLE_LENGTH - 1` wide characters when
    /// marshaled.
    pub name: String,
    /// Entry point; `None` for separators.
    pub func: Option<PluginFunc>,
    /// Command id.  The host may overwrite it after registration; see
    /// `FuncItemTable::refresh`.
    pub cmd_id: i32,
    /// Show a check mark next to the menu item at startup.
    pub init_to_check: bool,
    pub shortcut: Option<ShortcutKey>,
}

impl FuncItem {
    pub fn new(name: impl Into<String>, func: Option<PluginFunc>) -> Self {
        Self { name: name.into(), func, cmd_id: 0, init_to_check: false, shortcut: None }
    }

    pub fn with_cmd_id(mut self, cmd_id: i32) -> Self {
        self.cmd_id = cmd_id;
        self
    }

    pub fn with_check(mut self, checked: bool) -> Self {
        self.init_to_check = checked;
        self
    }

    pub fn with_shortcut(mut self, shortcut: ShortcutKey) -> Self {
        self.shortcut = Some(shortcut);
        self
    }
}

// ── FuncItemTable ─────────────────────────────────────────────────────────────

/// Growable native array of `FuncItem` records plus the shortcut blocks they
/// point to.
///
/// Each `append` reallocates the whole array to exactly one more record:
/// registration happens once per command at startup, so byte-exact layout
/// matters more than allocation count.
#[derive(Default)]
pub struct FuncItemTable {
    block: Option<NativeBuffer>,
    items: Vec<FuncItem>,
    shortcuts: Vec<NativeBuffer>,
    released: bool,
}

impl FuncItemTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one record; returns the new record count.
    ///
    /// Atomic: every allocation happens before anything is swapped, so on
    /// error the table (native block and item list) is unchanged.
    pub fn append(&mut self, item: FuncItem) -> Result<usize> {
        if self.released {
            return Err(BridgeError::Released { what: "FuncItemTable" });
        }
        let count = self.items.len();
        let old_len = count * RECORD_WIDTH;

        let mut block = NativeBuffer::try_array(count + 1, RECORD_WIDTH)?;
        let shortcut = match item.shortcut.filter(ShortcutKey::is_set) {
            Some(key) => {
                let mut side = NativeBuffer::try_zeroed(SHORTCUT_WIDTH)?;
                side.write_bytes(0, &key.to_native());
                Some(side)
            }
            None => None,
        };

        if let Some(old) = &self.block {
            block.write_bytes(0, &old.as_slice()[..old_len]);
        }
        let shortcut_addr = shortcut.as_ref().map_or(0, |side| side.as_ptr() as usize);
        write_record(&mut block, old_len, &item, shortcut_addr);

        // Swap.  Nothing below can fail.
        if let Some(mut old) = self.block.replace(block) {
            old.release();
        }
        if let Some(side) = shortcut {
            self.shortcuts.push(side);
        }
        debug!(name = %item.name, cmd_id = item.cmd_id, count = count + 1, "func item appended");
        self.items.push(item);
        Ok(self.items.len())
    }

    /// Re-read every command id from native memory.
    ///
    /// The host assigns real ids after it has read the table; call this once
    /// registration is complete.
    /// A released table has nothing to read; the item list keeps its last ids.
    pub fn refresh(&mut self) {
        let Some(block) = self.block.as_ref().filter(|b| !b.is_released()) else { return };
        for (index, item) in self.items.iter_mut().enumerate() {
            let id = block.read_i32(index * RECORD_WIDTH + CMD_ID_OFFSET);
            if id != item.cmd_id {
                debug!(name = %item.name, old = item.cmd_id, new = id, "host reassigned command id");
                item.cmd_id = id;
            }
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// The in-memory item list (command ids as of the last `refresh`).
    pub fn items(&self) -> &[FuncItem] {
        &self.items
    }

    /// Address of the first record, or null while the table is empty or
    /// after release.
    pub fn as_ptr(&self) -> *const u8 {
        self.block.as_ref().map_or(std::ptr::null(), NativeBuffer::as_ptr)
    }

    /// Record array address as a message word.
    pub fn addr(&self) -> isize {
        self.as_ptr() as isize
    }

    /// The native bytes of record `index`.
    pub fn record_bytes(&self, index: usize) -> Option<&[u8]> {
        if index >= self.items.len() {
            return None;
        }
        let start = index * RECORD_WIDTH;
        self.block
            .as_ref()
            .filter(|b| !b.is_released())
            .map(|b| &b.as_slice()[start..start + RECORD_WIDTH])
    }

    /// Number of live shortcut side blocks.
    pub fn shortcut_blocks(&self) -> usize {
        self.shortcuts.iter().filter(|b| !b.is_released()).count()
    }

    /// `true` once `release()` has run.
    pub fn is_released(&self) -> bool {
        self.released
    }

    /// Free every shortcut block, then the record array.  Safe to call twice.
    pub fn release(&mut self) {
        if self.released {
            return;
        }
        for side in &mut self.shortcuts {
            side.release();
        }
        if let Some(mut block) = self.block.take() {
            block.release();
        }
        self.released = true;
        debug!(count = self.items.len(), shortcuts = self.shortcuts.len(), "func item table released");
    }
}

impl Drop for FuncItemTable {
    fn drop(&mut self) {
        native::dispose("FuncItemTable", || self.release());
    }
}

fn write_record(block: &mut NativeBuffer, base: usize, item: &FuncItem, shortcut_addr: usize) {
    // Leave room for the terminator; the tail of the field is already zero.
    let name = text::encode(&item.name, TextEncoding::Wide, MENU_TITLE_LENGTH - 1);
    block.write_bytes(base + NAME_OFFSET, &name);
    block.write_usize(base + FUNC_OFFSET, item.func.map_or(0, |f| f as usize));
    block.write_i32(base + CMD_ID_OFFSET, item.cmd_id);
    block.write_i32(base + CHECKED_OFFSET, i32::from(item.init_to_check));
    block.write_usize(base + SHORTCUT_OFFSET, shortcut_addr);
}

// ── Tests ─────────────────────────────────────────────────────────────────────
