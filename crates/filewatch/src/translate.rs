//! Translation of raw kernel records into logical events.

use std::path::PathBuf;

use crate::cursor::RawRecord;
use crate::mask::EventMask;
use crate::registry::WatchRegistry;

/// Logical kind of a filesystem change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    Created,
    Modified,
    Deleted,
    /// The kernel queue dropped events before they could be read.
    /// The caller's view of watched directories may be stale.
    Overflow,
}

/// A caller-owned change event. No back-reference into session state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FsEvent {
    pub kind: EventKind,
    pub path: PathBuf,
}

/// Maps a raw record to a logical event, reconstructing the full path
/// through the registry.
///
/// Returns `None` (drop, not an error) in two cases: the wd no longer
/// resolves (a legitimate race between delivery and unregistration),
/// or the mask matches none of the logical kinds (e.g. the IGNORED
/// record the kernel emits after a watch removal).
pub fn translate(record: &RawRecord, registry: &WatchRegistry) -> Option<FsEvent> {
    // Overflow records carry wd -1 and no name; classify before any
    // registry lookup.
    if record.mask.contains(EventMask::Q_OVERFLOW) {
        return Some(FsEvent {
            kind: EventKind::Overflow,
            path: PathBuf::new(),
        });
    }

    // First match wins when multiple bits are set.
    let kind = if record
        .mask
        .intersects(EventMask::CREATE | EventMask::MOVED_TO)
    {
        EventKind::Created
    } else if record.mask.contains(EventMask::MODIFY) {
        EventKind::Modified
    } else if record
        .mask
        .intersects(EventMask::DELETE | EventMask::MOVED_FROM)
    {
        EventKind::Deleted
    } else {
        return None;
    };

    let directory = registry.resolve(record.wd)?;
    let path = match &record.name {
        Some(name) => directory.join(name),
        // Nameless records describe the watched entry itself.
        None => directory.to_path_buf(),
    };

    Some(FsEvent { kind, path })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::OsString;
    use std::path::Path;

    fn record(wd: i32, mask: u32, name: Option<&str>) -> RawRecord {
        RawRecord {
            wd,
            mask: EventMask::from_bits_retain(mask),
            name: name.map(OsString::from),
        }
    }

    fn registry_with(wd: i32, path: &str) -> WatchRegistry {
        let mut registry = WatchRegistry::new();
        registry.insert(wd, PathBuf::from(path));
        registry
    }

    #[test]
    fn create_maps_to_created_with_joined_path() {
        let registry = registry_with(4, "/tmp/fw");
        let event = translate(&record(4, libc::IN_CREATE, Some("a.txt")), &registry).unwrap();
        assert_eq!(event.kind, EventKind::Created);
        assert_eq!(event.path, Path::new("/tmp/fw/a.txt"));
    }

    #[test]
    fn moved_to_counts_as_created_and_moved_from_as_deleted() {
        let registry = registry_with(4, "/tmp/fw");
        let created = translate(&record(4, libc::IN_MOVED_TO, Some("in")), &registry).unwrap();
        assert_eq!(created.kind, EventKind::Created);
        let deleted = translate(&record(4, libc::IN_MOVED_FROM, Some("out")), &registry).unwrap();
        assert_eq!(deleted.kind, EventKind::Deleted);
    }

    #[test]
    fn create_bit_wins_over_modify_bit() {
        let registry = registry_with(4, "/tmp/fw");
        let mask = libc::IN_CREATE | libc::IN_MODIFY;
        let event = translate(&record(4, mask, Some("a")), &registry).unwrap();
        assert_eq!(event.kind, EventKind::Created);
    }

    #[test]
    fn nameless_record_resolves_to_the_watched_directory() {
        let registry = registry_with(4, "/tmp/fw");
        let event = translate(&record(4, libc::IN_DELETE, None), &registry).unwrap();
        assert_eq!(event.path, Path::new("/tmp/fw"));
    }

    #[test]
    fn overflow_skips_the_registry_and_carries_an_empty_path() {
        let registry = WatchRegistry::new();
        let event = translate(&record(-1, libc::IN_Q_OVERFLOW, None), &registry).unwrap();
        assert_eq!(event.kind, EventKind::Overflow);
        assert_eq!(event.path, Path::new(""));
    }

    #[test]
    fn stale_wd_is_dropped() {
        let registry = WatchRegistry::new();
        assert!(translate(&record(9, libc::IN_CREATE, Some("late")), &registry).is_none());
    }

    #[test]
    fn ignored_record_is_dropped_not_misreported() {
        let registry = registry_with(4, "/tmp/fw");
        assert!(translate(&record(4, libc::IN_IGNORED, None), &registry).is_none());
    }
}
