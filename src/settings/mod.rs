// ── Plugin settings ───────────────────────────────────────────────────────────
//
// Reads and writes `<plugin config dir>\<plugin name>.json`.  The directory
// comes from the host (`NotepadGateway::plugin_config_dir`).
// No `unsafe`: pure safe Rust + serde_json.

use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::{error::Result, func_table::ShortcutKey};

// ── Format version ────────────────────────────────────────────────────────────

pub const SETTINGS_VERSION: u32 = 1;

// ── On-disk type ──────────────────────────────────────────────────────────────

/// Root of the JSON settings file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    pub version: u32,
    /// `tracing` filter directive, e.g. `"npp_bridge=debug"`.
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
    /// Shortcut overrides keyed by command name.
    #[serde(default)]
    pub shortcuts: BTreeMap<String, ShortcutKey>,
    /// Initial check-mark overrides keyed by command name.
    #[serde(default)]
    pub checked: BTreeMap<String, bool>,
}

fn default_log_filter() -> String {
    "warn".to_owned()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            version: SETTINGS_VERSION,
            log_filter: default_log_filter(),
            shortcuts: BTreeMap::new(),
            checked: BTreeMap::new(),
        }
    }
}

impl Settings {
    pub fn shortcut_for(&self, command: &str) -> Option<ShortcutKey> {
        self.shortcuts.get(command).copied()
    }

    pub fn checked_for(&self, command: &str) -> Option<bool> {
        self.checked.get(command).copied()
    }
}

// ── Path ──────────────────────────────────────────────────────────────────────

/// `<config_dir>/<plugin_name>.json`.
pub fn settings_path(config_dir: impl AsRef<Path>, plugin_name: &str) -> PathBuf {
    config_dir.as_ref().join(format!("{plugin_name}.json"))
}

// ── Save ──────────────────────────────────────────────────────────────────────

/// Write `settings` to `path`, creating the parent directory if needed.
pub fn save(path: &Path, settings: &Settings) -> Result<()> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)?;
    }
    let file = fs::File::create(path)?;
    serde_json::to_writer_pretty(file, settings)?;
    debug!(path = %path.display(), "settings saved");
    Ok(())
}

// ── Load ──────────────────────────────────────────────────────────────────────

/// Read and parse the settings file.
///
/// Returns `None` on any error: file missing, JSON parse failure, or an
/// unrecognised version number.  The plugin continues with defaults.
pub fn load(path: &Path) -> Option<Settings> {
    let data = fs::read(path).ok()?;
    let settings: Settings = match serde_json::from_slice(&data) {
        Ok(s) => s,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "settings file unreadable; using defaults");
            return None;
        }
    };
    if settings.version != SETTINGS_VERSION {
        warn!(version = settings.version, "unknown settings version; using defaults");
        return None;
    }
    Some(settings)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
