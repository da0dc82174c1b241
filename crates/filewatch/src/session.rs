//! The watcher session: lifecycle state machine and thread-safe
//! access to the shared buffer, cursor and registry.
//!
//! Designed for one polling thread, but `watch`/`unwatch` may come
//! from another: every mutating entry point holds the session lock
//! for its full duration, so registry mutations are linearized
//! against concurrent polls and a freed wd can never be resolved to a
//! stale path. The critical section is bounded: registry work is
//! CPU-only and the single read syscall is non-blocking.

use std::path::Path;

use parking_lot::Mutex;
use tracing::debug;

use crate::config::WatchConfig;
use crate::cursor::EventCursor;
use crate::error::{Result, WatchError};
use crate::mask::WATCH_MASK;
use crate::registry::WatchRegistry;
use crate::source::EventSource;
use crate::translate::{self, FsEvent};

/// Reusable read buffer size. Sized for roughly a thousand records
/// with short names per fill.
pub const EVENT_BUF_LEN: usize = 32 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SessionState {
    Active,
    Closed,
    Destroyed,
}

#[derive(Debug)]
struct SessionInner {
    state: SessionState,
    source: EventSource,
    registry: WatchRegistry,
    buffer: Box<[u8]>,
    cursor: EventCursor,
}

/// A poll-style watcher over a set of registered directories.
///
/// Lifecycle is linear: active on creation, `close` releases the
/// kernel descriptor (registry kept for diagnostics), `destroy`
/// releases everything. Both are idempotent; operations on a closed
/// or destroyed session report [`WatchError::NotActive`] instead of
/// faulting.
#[derive(Debug)]
pub struct WatcherSession {
    inner: Mutex<SessionInner>,
    verbose: bool,
}

impl WatcherSession {
    /// Opens the kernel notification handle and allocates session
    /// state. On failure nothing is retained: a partially built
    /// session cannot escape.
    pub fn create(config: WatchConfig) -> Result<Self> {
        let source = EventSource::open()?;
        Ok(Self {
            inner: Mutex::new(SessionInner {
                state: SessionState::Active,
                source,
                registry: WatchRegistry::new(),
                buffer: vec![0u8; EVENT_BUF_LEN].into_boxed_slice(),
                cursor: EventCursor::new(),
            }),
            verbose: config.verbose,
        })
    }

    /// Registers a directory for change notifications.
    ///
    /// Re-registering an already-watched path is idempotent: the
    /// existing kernel watch is kept and no duplicate is created.
    pub fn watch(&self, path: &Path) -> Result<()> {
        let mut guard = self.inner.lock();
        let inner = &mut *guard;
        if inner.state != SessionState::Active {
            return Err(WatchError::NotActive);
        }
        if let Some(wd) = inner.registry.watch_id_for(path) {
            if self.verbose {
                debug!(wd, path = %path.display(), "watch already registered");
            }
            return Ok(());
        }
        let wd = inner.source.add_watch(path, WATCH_MASK)?;
        inner.registry.insert(wd, path.to_path_buf());
        if self.verbose {
            debug!(wd, path = %path.display(), "watch registered");
        }
        Ok(())
    }

    /// Removes the watch for `path`. Never fails: unknown paths and
    /// non-active sessions are a no-op, which keeps caller cleanup
    /// ordering simple.
    pub fn unwatch(&self, path: &Path) {
        let mut guard = self.inner.lock();
        let inner = &mut *guard;
        if inner.state != SessionState::Active {
            return;
        }
        if let Some(wd) = inner.registry.remove_path(path) {
            inner.source.remove_watch(wd);
            if self.verbose {
                debug!(wd, path = %path.display(), "watch removed");
            }
        }
    }

    /// Returns the next available event, or `None` when nothing is
    /// pending right now. Never blocks.
    ///
    /// Performs at most one kernel read per call: if the buffered
    /// records are exhausted it refills once, and when the translator
    /// drops a record (stale wd, unclassified mask) it only loops
    /// over records already in the buffer.
    pub fn poll_next(&self) -> Result<Option<FsEvent>> {
        let mut guard = self.inner.lock();
        let inner = &mut *guard;
        if inner.state != SessionState::Active {
            return Err(WatchError::NotActive);
        }
        let mut filled = false;
        loop {
            if inner.cursor.is_exhausted() {
                if filled {
                    return Ok(None);
                }
                let read = inner.source.fill(&mut inner.buffer)?;
                filled = true;
                if read == 0 {
                    return Ok(None);
                }
                inner.cursor.reset(read);
            }
            // A malformed tail exhausts the cursor; the loop then
            // refills once or returns.
            let Some(record) = inner.cursor.next_raw(&inner.buffer) else {
                continue;
            };
            match translate::translate(&record, &inner.registry) {
                Some(event) => {
                    if self.verbose {
                        debug!(kind = ?event.kind, path = %event.path.display(), "event delivered");
                    }
                    return Ok(Some(event));
                }
                None => {
                    if self.verbose {
                        debug!(wd = record.wd, mask = record.mask.bits(), "record dropped");
                    }
                }
            }
        }
    }

    /// Releases the kernel descriptor. The registry is kept for
    /// diagnostics until `destroy`. Idempotent.
    pub fn close(&self) {
        let mut guard = self.inner.lock();
        let inner = &mut *guard;
        if inner.state == SessionState::Active {
            inner.source.close();
            inner.state = SessionState::Closed;
            if self.verbose {
                debug!(watches = inner.registry.len(), "session closed");
            }
        }
    }

    /// Releases the descriptor and all session memory. Idempotent,
    /// reachable from any prior state.
    pub fn destroy(&self) {
        let mut guard = self.inner.lock();
        let inner = &mut *guard;
        if inner.state != SessionState::Destroyed {
            inner.source.close();
            inner.registry.clear();
            inner.cursor.reset(0);
            inner.buffer = Box::default();
            inner.state = SessionState::Destroyed;
            if self.verbose {
                debug!("session destroyed");
            }
        }
    }

    /// Number of currently registered watches.
    pub fn watch_count(&self) -> usize {
        self.inner.lock().registry.len()
    }

    pub fn is_active(&self) -> bool {
        self.inner.lock().state == SessionState::Active
    }
}
