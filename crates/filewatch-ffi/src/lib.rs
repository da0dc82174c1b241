//! C-ABI surface for the watcher session.
//!
//! Handle-based API for a managed-runtime host: `fw_create` hands out
//! an opaque pointer, the remaining entry points operate on it, and
//! `fw_destroy` releases it. Every entry point guards against null
//! handles and null paths; no call faults on a closed session.
//!
//! Process-wide configuration (verbose diagnostics, disabled mode) is
//! resolved from the environment exactly once, at first use, and the
//! core session receives it explicitly.

pub mod disabled;
pub mod event;

use std::ffi::CStr;
use std::os::raw::{c_char, c_int};
use std::os::unix::ffi::OsStrExt;
use std::path::Path;

use once_cell::sync::OnceCell;
use tracing::debug;

use filewatch::{WatchConfig, WatchError, WatcherSession};

use crate::disabled::DisabledWatcher;
use crate::event::FwEvent;

/// Environment variable selecting the no-op backend.
pub const ENV_DISABLED: &str = "FW_DISABLED";

pub const FW_OK: c_int = 0;
pub const FW_ERR_INVALID_PATH: c_int = -1;
pub const FW_ERR_EXHAUSTED: c_int = -2;
pub const FW_ERR_NOT_ACTIVE: c_int = -3;
pub const FW_ERR_BAD_HANDLE: c_int = -4;
pub const FW_ERR_IO: c_int = -5;

#[derive(Debug, Clone, Copy)]
struct BindingConfig {
    watch: WatchConfig,
    disabled: bool,
}

static BINDING_CONFIG: OnceCell<BindingConfig> = OnceCell::new();

fn binding_config() -> BindingConfig {
    *BINDING_CONFIG.get_or_init(|| BindingConfig {
        watch: WatchConfig::from_env(),
        disabled: matches!(
            std::env::var(ENV_DISABLED).as_deref().map(str::trim),
            Ok("1") | Ok("true") | Ok("yes") | Ok("on")
        ),
    })
}

/// Opaque watcher handle crossing the language boundary.
pub struct FwWatcher {
    backend: Backend,
}

enum Backend {
    Session(WatcherSession),
    Disabled(DisabledWatcher),
}

fn status_for(error: &WatchError) -> c_int {
    match error {
        WatchError::InvalidPath(_) => FW_ERR_INVALID_PATH,
        WatchError::Exhausted => FW_ERR_EXHAUSTED,
        WatchError::NotActive => FW_ERR_NOT_ACTIVE,
        WatchError::ResourceExhausted(_) => FW_ERR_EXHAUSTED,
        WatchError::Io(_) => FW_ERR_IO,
    }
}

unsafe fn path_arg<'a>(path: *const c_char) -> Option<&'a Path> {
    if path.is_null() {
        return None;
    }
    let bytes = CStr::from_ptr(path).to_bytes();
    Some(Path::new(std::ffi::OsStr::from_bytes(bytes)))
}

/// Creates a watcher. Returns null when the kernel refuses a
/// notification descriptor. Honors `FW_DISABLED` from the one-shot
/// environment read.
#[no_mangle]
pub extern "C" fn fw_create() -> *mut FwWatcher {
    let config = binding_config();
    if config.disabled {
        return fw_create_disabled();
    }
    match WatcherSession::create(config.watch) {
        Ok(session) => Box::into_raw(Box::new(FwWatcher {
            backend: Backend::Session(session),
        })),
        Err(error) => {
            debug!(%error, "session creation failed");
            std::ptr::null_mut()
        }
    }
}

/// Creates a watcher that accepts registrations and never produces
/// events.
#[no_mangle]
pub extern "C" fn fw_create_disabled() -> *mut FwWatcher {
    Box::into_raw(Box::new(FwWatcher {
        backend: Backend::Disabled(DisabledWatcher::new()),
    }))
}

/// Registers a directory on the watcher.
///
/// # Safety
/// `handle` must be null or a live pointer from `fw_create`/
/// `fw_create_disabled`; `path` must be null or a NUL-terminated
/// string.
#[no_mangle]
pub unsafe extern "C" fn fw_watch(handle: *mut FwWatcher, path: *const c_char) -> c_int {
    let Some(watcher) = handle.as_ref() else {
        return FW_ERR_BAD_HANDLE;
    };
    let Some(path) = path_arg(path) else {
        return FW_ERR_INVALID_PATH;
    };
    match &watcher.backend {
        Backend::Session(session) => match session.watch(path) {
            Ok(()) => FW_OK,
            Err(error) => status_for(&error),
        },
        Backend::Disabled(stub) => {
            stub.watch(path);
            FW_OK
        }
    }
}

/// Removes a registration. Never fails beyond a bad handle.
///
/// # Safety
/// Same contract as [`fw_watch`].
#[no_mangle]
pub unsafe extern "C" fn fw_unwatch(handle: *mut FwWatcher, path: *const c_char) -> c_int {
    let Some(watcher) = handle.as_ref() else {
        return FW_ERR_BAD_HANDLE;
    };
    let Some(path) = path_arg(path) else {
        return FW_OK;
    };
    match &watcher.backend {
        Backend::Session(session) => session.unwatch(path),
        Backend::Disabled(stub) => stub.unwatch(path),
    }
    FW_OK
}

/// Returns the next available event, or null when none is pending
/// (or the session is no longer active). The returned event is
/// caller-owned; release it with `fw_event_free`.
///
/// # Safety
/// `handle` must be null or a live watcher pointer.
#[no_mangle]
pub unsafe extern "C" fn fw_next_event(handle: *mut FwWatcher) -> *mut FwEvent {
    let Some(watcher) = handle.as_ref() else {
        return std::ptr::null_mut();
    };
    let next = match &watcher.backend {
        Backend::Session(session) => match session.poll_next() {
            Ok(event) => event,
            Err(_) => None,
        },
        Backend::Disabled(stub) => stub.poll_next(),
    };
    match next.and_then(event::into_ffi) {
        Some(event) => event,
        None => std::ptr::null_mut(),
    }
}

/// Stops monitoring. Idempotent; the handle stays valid until
/// `fw_destroy`.
///
/// # Safety
/// `handle` must be null or a live watcher pointer.
#[no_mangle]
pub unsafe extern "C" fn fw_close(handle: *mut FwWatcher) -> c_int {
    let Some(watcher) = handle.as_ref() else {
        return FW_ERR_BAD_HANDLE;
    };
    match &watcher.backend {
        Backend::Session(session) => session.close(),
        Backend::Disabled(stub) => stub.close(),
    }
    FW_OK
}

/// Releases the watcher and all its resources. The handle must not
/// be used afterwards.
///
/// # Safety
/// `handle` must be null or a live watcher pointer that has not
/// already been destroyed.
#[no_mangle]
pub unsafe extern "C" fn fw_destroy(handle: *mut FwWatcher) -> c_int {
    if handle.is_null() {
        return FW_OK;
    }
    let watcher = Box::from_raw(handle);
    if let Backend::Session(session) = &watcher.backend {
        session.destroy();
    }
    FW_OK
}
