//! Typed wrapper over the raw inotify event mask bits.

use bitflags::bitflags;

bitflags! {
    /// Kernel event mask bits, both for watch registration and for
    /// classifying delivered records.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct EventMask: u32 {
        const CREATE = libc::IN_CREATE;
        const DELETE = libc::IN_DELETE;
        const MODIFY = libc::IN_MODIFY;
        const MOVED_FROM = libc::IN_MOVED_FROM;
        const MOVED_TO = libc::IN_MOVED_TO;
        /// Kernel queue dropped events before they could be read.
        const Q_OVERFLOW = libc::IN_Q_OVERFLOW;
        /// The watch was removed (explicitly or because the target
        /// vanished). Informational; never surfaced as an event.
        const IGNORED = libc::IN_IGNORED;
        const ISDIR = libc::IN_ISDIR;

        // Mask bits the kernel may set that we do not interpret are
        // preserved rather than truncated.
        const _ = !0;
    }
}

/// The fixed event-class mask used for every registration: create,
/// delete, modify, move-in, move-out.
pub const WATCH_MASK: EventMask = EventMask::CREATE
    .union(EventMask::DELETE)
    .union(EventMask::MODIFY)
    .union(EventMask::MOVED_FROM)
    .union(EventMask::MOVED_TO);
