//! CLI configuration file.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use taskshare_store::StoreConfig;

/// Contents of the `--config` JSON file.
///
/// ```json
/// { "store": { "path": "/var/lib/taskshare/taskshare.db", "busy_timeout_ms": 2000 } }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    pub store: StoreConfig,
}

impl CliConfig {
    /// Loads the config file if one was given, otherwise the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        serde_json::from_str(&contents)
            .with_context(|| format!("failed to parse config file {}", path.display()))
    }

    /// Applies command-line overrides on top of the file.
    #[must_use]
    pub fn with_db(mut self, db: Option<&str>) -> Self {
        if let Some(db) = db {
            self.store.path = db.to_string();
        }
        self
    }
}
