//! Ownership of the kernel notification descriptor and the raw
//! syscall surface: open, add/remove watch, non-blocking fill.

use std::ffi::CString;
use std::io;
use std::os::fd::{AsRawFd, FromRawFd, OwnedFd};
use std::os::unix::ffi::OsStrExt;
use std::path::Path;

use crate::error::{Result, WatchError};
use crate::mask::EventMask;

/// Non-blocking inotify descriptor. `close` is explicit and
/// idempotent; `Drop` covers every unwind path.
#[derive(Debug)]
pub struct EventSource {
    fd: Option<OwnedFd>,
}

impl EventSource {
    /// Acquires a non-blocking, close-on-exec notification handle.
    pub fn open() -> Result<Self> {
        let fd = unsafe { libc::inotify_init1(libc::IN_NONBLOCK | libc::IN_CLOEXEC) };
        if fd < 0 {
            let error = io::Error::last_os_error();
            return Err(match error.raw_os_error() {
                Some(libc::EMFILE) | Some(libc::ENFILE) => WatchError::ResourceExhausted(error),
                _ => WatchError::Io(error),
            });
        }
        // SAFETY: fd is a freshly acquired descriptor we exclusively own.
        let fd = unsafe { OwnedFd::from_raw_fd(fd) };
        Ok(Self { fd: Some(fd) })
    }

    fn raw_fd(&self) -> Result<i32> {
        self.fd
            .as_ref()
            .map(AsRawFd::as_raw_fd)
            .ok_or(WatchError::NotActive)
    }

    /// Requests a kernel watch on `path` for the given event classes.
    pub fn add_watch(&self, path: &Path, mask: EventMask) -> Result<i32> {
        let fd = self.raw_fd()?;
        let c_path = CString::new(path.as_os_str().as_bytes())
            .map_err(|_| WatchError::InvalidPath(path.to_path_buf()))?;
        let wd = unsafe { libc::inotify_add_watch(fd, c_path.as_ptr(), mask.bits()) };
        if wd < 0 {
            let error = io::Error::last_os_error();
            return Err(match error.raw_os_error() {
                Some(libc::ENOENT) | Some(libc::EACCES) | Some(libc::ENOTDIR)
                | Some(libc::ELOOP) => WatchError::InvalidPath(path.to_path_buf()),
                Some(libc::ENOSPC) => WatchError::Exhausted,
                _ => WatchError::Io(error),
            });
        }
        Ok(wd)
    }

    /// Removes a kernel watch. Best effort: the kernel reports EINVAL
    /// when it already dropped the watch (e.g. the target vanished),
    /// which is indistinguishable from success for our purposes.
    pub fn remove_watch(&self, wd: i32) {
        if let Some(fd) = self.fd.as_ref() {
            unsafe {
                libc::inotify_rm_watch(fd.as_raw_fd(), wd);
            }
        }
    }

    /// Attempts a single non-blocking read into `buffer`.
    ///
    /// Returns `0` when no data is available right now (the common
    /// case on every poll). Interrupted reads are retried
    /// transparently and never surface to the caller.
    pub fn fill(&self, buffer: &mut [u8]) -> Result<usize> {
        let fd = self.raw_fd()?;
        loop {
            let read = unsafe { libc::read(fd, buffer.as_mut_ptr().cast(), buffer.len()) };
            if read >= 0 {
                return Ok(read as usize);
            }
            let error = io::Error::last_os_error();
            match error.raw_os_error() {
                Some(libc::EINTR) => continue,
                Some(libc::EAGAIN) => return Ok(0),
                _ => return Err(WatchError::Io(error)),
            }
        }
    }

    /// Releases the descriptor. Safe to call repeatedly.
    pub fn close(&mut self) {
        self.fd = None;
    }

    pub fn is_open(&self) -> bool {
        self.fd.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mask::WATCH_MASK;

    #[test]
    fn fill_on_idle_descriptor_returns_zero() {
        let source = EventSource::open().unwrap();
        let mut buffer = [0u8; 4096];
        assert_eq!(source.fill(&mut buffer).unwrap(), 0);
    }

    #[test]
    fn add_watch_on_missing_path_is_invalid_path() {
        let source = EventSource::open().unwrap();
        let missing = Path::new("/definitely/not/here/filewatch");
        match source.add_watch(missing, WATCH_MASK) {
            Err(WatchError::InvalidPath(path)) => assert_eq!(path, missing),
            other => panic!("expected InvalidPath, got {other:?}"),
        }
    }

    #[test]
    fn close_is_idempotent_and_fill_reports_not_active() {
        let mut source = EventSource::open().unwrap();
        source.close();
        source.close();
        assert!(!source.is_open());
        let mut buffer = [0u8; 64];
        assert!(matches!(
            source.fill(&mut buffer),
            Err(WatchError::NotActive)
        ));
    }
}
