//! Poll-style filesystem change notification over Linux inotify.
//!
//! This crate owns the kernel notification descriptor and exposes
//! discrete, typed change events one at a time:
//! - Watch registration with wd↔path bookkeeping
//! - Non-blocking buffer refills with boundary-checked record parsing
//! - Mask→kind translation and full-path reconstruction
//! - A mutex-guarded session state machine safe to drive from
//!   multiple threads
//!
//! Watching is non-recursive and events are delivered uncoalesced, in
//! kernel order. If the consumer falls behind, the kernel's own queue
//! bounds the backlog and a single [`EventKind::Overflow`] event
//! signals the loss.

pub mod config;
pub mod cursor;
pub mod error;
pub mod mask;
pub mod registry;
pub mod session;
pub mod source;
pub mod translate;

pub use config::WatchConfig;
pub use error::{Result, WatchError};
pub use mask::EventMask;
pub use session::WatcherSession;
pub use translate::{EventKind, FsEvent};
