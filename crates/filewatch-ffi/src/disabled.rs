//! The no-op watcher: accepts every registration and never produces
//! events. Lets the host runtime start on platforms where the real
//! notification facility is unavailable or deliberately switched off.

use std::path::Path;

/// Watcher backend with the full session surface and no behavior.
#[derive(Debug, Default)]
pub struct DisabledWatcher;

impl DisabledWatcher {
    pub fn new() -> Self {
        Self
    }

    pub fn watch(&self, _path: &Path) {}

    pub fn unwatch(&self, _path: &Path) {}

    /// Never yields an event.
    pub fn poll_next(&self) -> Option<filewatch::FsEvent> {
        None
    }

    pub fn close(&self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_watcher_accepts_everything_and_stays_silent() {
        let watcher = DisabledWatcher::new();
        watcher.watch(Path::new("/anywhere"));
        assert!(watcher.poll_next().is_none());
        watcher.unwatch(Path::new("/anywhere"));
        watcher.close();
        assert!(watcher.poll_next().is_none());
    }
}
