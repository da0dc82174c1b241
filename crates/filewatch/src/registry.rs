//! Bidirectional mapping between kernel watch descriptors and the
//! paths they refer to.
//!
//! The kernel reuses watch descriptors after removal, so a stale
//! entry would mis-translate a later event to the wrong path. Every
//! mutation keeps both directions in sync.

use std::path::{Path, PathBuf};

use fnv::FnvHashMap;

/// wd↔path mapping for one session. Owned exclusively by the session
/// and only touched under its lock.
#[derive(Debug, Default)]
pub struct WatchRegistry {
    by_wd: FnvHashMap<i32, PathBuf>,
    by_path: FnvHashMap<PathBuf, i32>,
}

impl WatchRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a watch. Replaces any previous entry for the same wd,
    /// which cannot belong to a live watch anymore.
    pub fn insert(&mut self, wd: i32, path: PathBuf) {
        if let Some(stale) = self.by_wd.insert(wd, path.clone()) {
            self.by_path.remove(&stale);
        }
        self.by_path.insert(path, wd);
    }

    /// Returns the wd for an already-registered path, if any.
    pub fn watch_id_for(&self, path: &Path) -> Option<i32> {
        self.by_path.get(path).copied()
    }

    /// Removes the entry for `path`, returning its wd. `None` means
    /// the path was never registered (not an error).
    pub fn remove_path(&mut self, path: &Path) -> Option<i32> {
        let wd = self.by_path.remove(path)?;
        self.by_wd.remove(&wd);
        Some(wd)
    }

    /// Resolves a wd to its watched path. `None` legitimately occurs
    /// for records delivered after the watch was removed; callers
    /// drop the event.
    pub fn resolve(&self, wd: i32) -> Option<&Path> {
        self.by_wd.get(&wd).map(PathBuf::as_path)
    }

    pub fn len(&self) -> usize {
        self.by_wd.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_wd.is_empty()
    }

    pub fn clear(&mut self) {
        self.by_wd.clear();
        self.by_path.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_then_resolve_both_directions() {
        let mut registry = WatchRegistry::new();
        registry.insert(3, PathBuf::from("/tmp/a"));
        assert_eq!(registry.resolve(3), Some(Path::new("/tmp/a")));
        assert_eq!(registry.watch_id_for(Path::new("/tmp/a")), Some(3));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn remove_clears_both_directions() {
        let mut registry = WatchRegistry::new();
        registry.insert(3, PathBuf::from("/tmp/a"));
        assert_eq!(registry.remove_path(Path::new("/tmp/a")), Some(3));
        assert_eq!(registry.resolve(3), None);
        assert_eq!(registry.watch_id_for(Path::new("/tmp/a")), None);
        assert!(registry.is_empty());
    }

    #[test]
    fn remove_of_unknown_path_is_a_noop() {
        let mut registry = WatchRegistry::new();
        assert_eq!(registry.remove_path(Path::new("/nope")), None);
    }

    #[test]
    fn reused_wd_does_not_leave_a_stale_path_entry() {
        // The kernel reuses descriptors. If wd 5 is reassigned to a
        // new path, the old path must no longer resolve to it.
        let mut registry = WatchRegistry::new();
        registry.insert(5, PathBuf::from("/tmp/old"));
        registry.insert(5, PathBuf::from("/tmp/new"));
        assert_eq!(registry.resolve(5), Some(Path::new("/tmp/new")));
        assert_eq!(registry.watch_id_for(Path::new("/tmp/old")), None);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn mutation_sequence_reflects_exactly_the_live_set() {
        let mut registry = WatchRegistry::new();
        registry.insert(1, PathBuf::from("/a"));
        registry.insert(2, PathBuf::from("/b"));
        registry.insert(3, PathBuf::from("/c"));
        registry.remove_path(Path::new("/b"));
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.resolve(1), Some(Path::new("/a")));
        assert_eq!(registry.resolve(2), None);
        assert_eq!(registry.resolve(3), Some(Path::new("/c")));
    }
}
