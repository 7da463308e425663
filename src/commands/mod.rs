// ── Plugin command registration ───────────────────────────────────────────────
//
// Front end over `FuncItemTable` used from the plugin's startup code:
//
//   set_command("Save all", Some(save_all), shortcut, false)?;
//   separator()?;
//   …
//   getFuncsArray export  →  funcs_array()
//   NPPN_READY            →  refresh_ids()
//
// Shortcut and check-mark overrides from `Settings` win over the values the
// plugin passes in code, so users can remap keys without a rebuild.

use tracing::debug;

use crate::{
    error::Result,
    func_table::{FuncItem, FuncItemTable, PluginFunc, ShortcutKey},
    settings::Settings,
};

/// Menu text the host renders as a separator line.
pub const SEPARATOR: &str = "-";

/// The plugin's command menu.
#[derive(Default)]
pub struct PluginCommands {
    table: FuncItemTable,
    settings: Settings,
}

impl PluginCommands {
    pub fn new() -> Self {
        Self::default()
    }

    /// Commands whose shortcut and initial check state are taken from
    /// `settings` where it names them.
    pub fn with_settings(settings: Settings) -> Self {
        Self { table: FuncItemTable::new(), settings }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Register one command; returns the number of registered commands.
    ///
    /// The command id defaults to the item's index.  A shortcut whose key is
    /// 0 counts as none.
    pub fn set_command(
        &mut self,
        name: &str,
        func: Option<PluginFunc>,
        shortcut: Option<ShortcutKey>,
        check_on_init: bool,
    ) -> Result<usize> {
        let shortcut = self.settings.shortcut_for(name).or(shortcut).filter(ShortcutKey::is_set);
        let checked = self.settings.checked_for(name).unwrap_or(check_on_init);

        let mut item = FuncItem::new(name, func)
            .with_cmd_id(self.table.len() as i32)
            .with_check(checked);
        if let Some(key) = shortcut {
            item = item.with_shortcut(key);
        }
        self.table.append(item)
    }

    /// Register a separator line.
    pub fn separator(&mut self) -> Result<usize> {
        self.set_command(SEPARATOR, None, None, false)
    }

    /// Pick up the command ids the host assigned.
    pub fn refresh_ids(&mut self) {
        self.table.refresh();
    }

    /// Command id of the item at `index`, as of the last refresh.
    pub fn cmd_id(&self, index: usize) -> Option<i32> {
        self.table.items().get(index).map(|item| item.cmd_id)
    }

    /// Index of the first command named `name`.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.table.items().iter().position(|item| item.name == name)
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    pub fn table(&self) -> &FuncItemTable {
        &self.table
    }

    /// Record array address and count, as returned from `getFuncsArray`.
    ///
    /// The address stays valid until the next registration or `release`.
    pub fn funcs_array(&self) -> (*const u8, i32) {
        let count = self.table.len() as i32;
        debug!(count, "handing command table to host");
        (self.table.as_ptr(), count)
    }

    /// Free the native table.  Call from the plugin's shutdown path.
    pub fn release(&mut self) {
        self.table.release();
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
