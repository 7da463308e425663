// Startup to shutdown, the way a plugin drives the bridge:
// read settings, register commands, hand the table to the host, let the host
// renumber, release.

use std::ptr;

use npp_bridge::{
    commands::PluginCommands,
    func_table::{CMD_ID_OFFSET, RECORD_WIDTH, SHORTCUT_OFFSET},
    native::LeakCheck,
    settings::{self, Settings},
    ShortcutKey,
};

extern "C" fn about() {}
extern "C" fn run() {}

/// Host side of `getFuncsArray`: assign real command ids in place.
fn host_renumbers(base: *const u8, count: i32, first_id: i32) {
    for index in 0..count as usize {
        // SAFETY: `base` is the live record array of `count` records that the
        // bridge just handed out; the id field is 4 bytes at a fixed offset.
        unsafe {
            let field = base.add(index * RECORD_WIDTH + CMD_ID_OFFSET) as *mut i32;
            ptr::write_unaligned(field, first_id + index as i32);
        }
    }
}

#[test]
fn register_renumber_release() {
    let leaks = LeakCheck::begin();
    let dir = tempfile::tempdir().expect("tempdir");
    let path = settings::settings_path(dir.path(), "Demo");

    let mut stored = Settings::default();
    stored.shortcuts.insert("Run".into(), ShortcutKey::new(true, false, false, 0x74));
    settings::save(&path, &stored).expect("save settings");

    let loaded = settings::load(&path).unwrap_or_default();
    let mut cmds = PluginCommands::with_settings(loaded);
    cmds.set_command("Run", Some(run), None, false).expect("register");
    cmds.separator().expect("register");
    cmds.set_command("About", Some(about), None, false).expect("register");

    let (base, count) = cmds.funcs_array();
    assert_eq!(count, 3);
    host_renumbers(base, count, 22000);

    assert_eq!(cmds.cmd_id(2), Some(2), "ids are stale until refreshed");
    cmds.refresh_ids();
    assert_eq!(cmds.cmd_id(0), Some(22000));
    assert_eq!(cmds.cmd_id(2), Some(22002));

    // Only "Run" got a shortcut block, from settings.
    assert_eq!(cmds.table().shortcut_blocks(), 1);
    let separator = cmds.table().record_bytes(1).expect("record");
    assert!(separator[SHORTCUT_OFFSET..RECORD_WIDTH].iter().all(|&b| b == 0));

    cmds.release();
    drop(cmds);
    assert_eq!(leaks.finish(), 0);
}

#[test]
fn missing_settings_fall_back_to_code_values() {
    let dir = tempfile::tempdir().expect("tempdir");
    let loaded = settings::load(&settings::settings_path(dir.path(), "None")).unwrap_or_default();
    let mut cmds = PluginCommands::with_settings(loaded);
    cmds.set_command("Run", Some(run), Some(ShortcutKey::new(false, true, false, b'R')), true)
        .expect("register");
    let item = &cmds.table().items()[0];
    assert_eq!(item.shortcut, Some(ShortcutKey::new(false, true, false, b'R')));
    assert!(item.init_to_check);
}
