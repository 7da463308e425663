// ── Logging setup ─────────────────────────────────────────────────────────────
//
// The crate itself only emits `tracing` events.  A plugin installs a
// subscriber once, usually from `setInfo`:
//
//   let settings = settings::load(&path).unwrap_or_default();
//   logging::init_to_file(dir.join("MyPlugin.log"), &settings.log_filter)?;
//
// A plugin DLL has no console, so the file variant is the normal path;
// `init` (stderr) is for tests and debug hosts.  Both leave an already
// installed global subscriber in place.

use std::{fs::OpenOptions, path::Path, sync::Mutex};

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::error::Result;

/// `RUST_LOG` if set, otherwise `directives`, otherwise `warn`.
fn filter(directives: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(directives))
        .unwrap_or_else(|_| EnvFilter::new("warn"))
}

/// Install a stderr subscriber.  Returns `false` if one was already set.
pub fn init(directives: &str) -> bool {
    tracing_subscriber::registry()
        .with(filter(directives))
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .try_init()
        .is_ok()
}

/// Install a subscriber appending to `path`.  Returns `Ok(false)` if one
/// was already set; fails only if the file cannot be opened.
pub fn init_to_file(path: impl AsRef<Path>, directives: &str) -> Result<bool> {
    let file = OpenOptions::new().create(true).append(true).open(path.as_ref())?;
    let installed = tracing_subscriber::registry()
        .with(filter(directives))
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_target(true)
                .with_writer(Mutex::new(file)),
        )
        .try_init()
        .is_ok();
    Ok(installed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bad_directives_fall_back() {
        // Must not panic on garbage.
        let _ = filter("=[not a filter");
    }

    #[test]
    fn second_init_is_harmless() {
        let dir = tempfile::tempdir().expect("tempdir");
        let first = init_to_file(dir.path().join("a.log"), "debug").expect("open log");
        let second = init("debug");
        // Whichever test installed first wins; a repeat never panics.
        assert!(!(first && second));
        assert!(!init("info"));
    }

    #[test]
    fn unopenable_log_file_is_an_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        assert!(init_to_file(dir.path(), "info").is_err());
    }
}
