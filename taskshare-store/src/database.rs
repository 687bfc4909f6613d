//! Connection handle and transaction scopes.

use crate::config::StoreConfig;
use crate::error::{StoreError, StoreResult};
use crate::schema;
use rusqlite::{Connection, Transaction, TransactionBehavior};
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::debug;

/// Shared handle to the TaskShare database.
///
/// Every engine operation runs inside one of the two transaction scopes
/// below. Reads use a deferred transaction, which gives them a single
/// consistent snapshot; writes take SQLite's reserved lock up front so the
/// authorization check and the write it guards cannot interleave with
/// another writer.
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    /// Opens (or creates) the database described by `config` and migrates it.
    pub fn open(config: &StoreConfig) -> StoreResult<Self> {
        let conn = if config.is_in_memory() {
            Connection::open_in_memory()?
        } else {
            if let Some(parent) = Path::new(&config.path).parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent)?;
                }
            }
            Connection::open(&config.path)?
        };

        conn.busy_timeout(config.busy_timeout())?;
        // Grant cleanup and project detach rely on the cascades.
        conn.pragma_update(None, "foreign_keys", true)?;
        schema::migrate(&conn)?;

        debug!(path = %config.path, "Opened database");
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Opens a private in-memory database (for testing).
    pub fn open_in_memory() -> StoreResult<Self> {
        Self::open(&StoreConfig::in_memory())
    }

    /// Runs `f` inside a read transaction.
    pub fn read<T, E, F>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce(&Transaction<'_>) -> Result<T, E>,
        E: From<StoreError>,
    {
        self.scoped(TransactionBehavior::Deferred, f)
    }

    /// Runs `f` inside a write transaction.
    ///
    /// The transaction commits only if `f` returns `Ok`; any error rolls back
    /// every write made inside it.
    pub fn write<T, E, F>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce(&Transaction<'_>) -> Result<T, E>,
        E: From<StoreError>,
    {
        self.scoped(TransactionBehavior::Immediate, f)
    }

    fn scoped<T, E, F>(&self, behavior: TransactionBehavior, f: F) -> Result<T, E>
    where
        F: FnOnce(&Transaction<'_>) -> Result<T, E>,
        E: From<StoreError>,
    {
        let mut conn = self.conn.lock().map_err(|_| StoreError::LockPoisoned)?;
        let tx = conn
            .transaction_with_behavior(behavior)
            .map_err(StoreError::from)?;

        // Dropping `tx` on the error path rolls it back.
        let value = f(&tx)?;
        tx.commit().map_err(StoreError::from)?;
        Ok(value)
    }
}
