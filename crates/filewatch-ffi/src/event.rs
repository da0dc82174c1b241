//! Caller-visible event marshaling.
//!
//! Every `FwEvent` handed out is caller-owned: the path is a freshly
//! allocated NUL-terminated string with no back-reference into
//! session memory, released with [`fw_event_free`].

use std::ffi::CString;
use std::os::raw::{c_char, c_int};
use std::os::unix::ffi::OsStringExt;

use filewatch::{EventKind, FsEvent};

pub const FW_EVENT_CREATED: c_int = 0;
pub const FW_EVENT_MODIFIED: c_int = 1;
pub const FW_EVENT_DELETED: c_int = 2;
pub const FW_EVENT_OVERFLOW: c_int = 3;

/// One filesystem change event crossing the language boundary.
#[repr(C)]
pub struct FwEvent {
    pub kind: c_int,
    /// NUL-terminated absolute path; empty for overflow events.
    pub path: *mut c_char,
}

pub fn kind_code(kind: EventKind) -> c_int {
    match kind {
        EventKind::Created => FW_EVENT_CREATED,
        EventKind::Modified => FW_EVENT_MODIFIED,
        EventKind::Deleted => FW_EVENT_DELETED,
        EventKind::Overflow => FW_EVENT_OVERFLOW,
    }
}

/// Boxes an event for the caller. Unix paths cannot contain interior
/// NULs, so the conversion only fails on a corrupted record; those
/// are dropped rather than delivered mangled.
pub fn into_ffi(event: FsEvent) -> Option<*mut FwEvent> {
    let bytes = event.path.into_os_string().into_vec();
    let path = CString::new(bytes).ok()?;
    let boxed = Box::new(FwEvent {
        kind: kind_code(event.kind),
        path: path.into_raw(),
    });
    Some(Box::into_raw(boxed))
}

/// Releases an event previously returned by `fw_next_event`. Safe to
/// call with null.
///
/// # Safety
/// `event` must be null or a pointer obtained from `fw_next_event`
/// that has not already been freed.
#[no_mangle]
pub unsafe extern "C" fn fw_event_free(event: *mut FwEvent) {
    if event.is_null() {
        return;
    }
    let event = Box::from_raw(event);
    if !event.path.is_null() {
        drop(CString::from_raw(event.path));
    }
}
