//! Store configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Path used to request a private in-memory database.
pub const IN_MEMORY: &str = ":memory:";

/// Configuration for opening a [`Database`](crate::Database).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Database file path, or `":memory:"`.
    pub path: String,
    /// How long a writer waits on SQLite's lock before failing.
    pub busy_timeout_ms: u64,
}

impl StoreConfig {
    /// Configuration for a file-backed database at `path`.
    pub fn at(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }

    /// Configuration for a private in-memory database.
    pub fn in_memory() -> Self {
        Self::at(IN_MEMORY)
    }

    pub fn is_in_memory(&self) -> bool {
        self.path == IN_MEMORY
    }

    pub fn busy_timeout(&self) -> Duration {
        Duration::from_millis(self.busy_timeout_ms)
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: "taskshare.db".to_string(),
            busy_timeout_ms: 5_000,
        }
    }
}
