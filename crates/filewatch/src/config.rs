//! Session configuration resolved from the process environment.
//!
//! The debug flag is read once when the caller constructs the config
//! and is passed into the session explicitly. Nothing in the core
//! consults the environment after that point.

/// Environment variable enabling verbose diagnostics.
pub const ENV_DEBUG: &str = "FILEWATCH_DEBUG";

/// Configuration for a [`crate::WatcherSession`].
#[derive(Debug, Clone, Copy, Default)]
pub struct WatchConfig {
    /// Emit trace lines for registry mutations and translation
    /// decisions. Has no effect on event semantics.
    pub verbose: bool,
}

impl WatchConfig {
    /// Resolves the configuration from the process environment.
    pub fn from_env() -> Self {
        Self {
            verbose: env_flag(ENV_DEBUG),
        }
    }
}

fn env_flag(name: &str) -> bool {
    match std::env::var(name) {
        Ok(value) => matches!(value.trim(), "1" | "true" | "yes" | "on"),
        Err(_) => false,
    }
}
