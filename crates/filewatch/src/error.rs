use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum WatchError {
    /// The kernel refused to hand out a notification descriptor
    /// (process or system fd limit).
    #[error("notification descriptor unavailable: {0}")]
    ResourceExhausted(std::io::Error),

    /// The path does not exist or is not accessible.
    #[error("invalid path: {0}")]
    InvalidPath(PathBuf),

    /// The per-user inotify watch limit is reached.
    #[error("watch limit reached")]
    Exhausted,

    /// The session is closed or destroyed.
    #[error("session is not active")]
    NotActive,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, WatchError>;
