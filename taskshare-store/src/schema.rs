//! Schema definition and migrations.
//!
//! The schema version lives in `PRAGMA user_version`; each migration step
//! runs once and bumps it.

use crate::error::{StoreError, StoreResult};
use rusqlite::Connection;
use tracing::info;

/// Latest schema version.
pub const SCHEMA_VERSION: i64 = 1;

const SCHEMA_V1: &str = "
    CREATE TABLE IF NOT EXISTS users (
        user_id TEXT PRIMARY KEY,
        name TEXT NOT NULL UNIQUE,
        email TEXT NOT NULL UNIQUE,
        created_at INTEGER NOT NULL
    );

    CREATE TABLE IF NOT EXISTS projects (
        project_id TEXT PRIMARY KEY,
        author_id TEXT NOT NULL REFERENCES users(user_id) ON DELETE CASCADE,
        project_name TEXT NOT NULL,
        project_description TEXT,
        project_completed INTEGER NOT NULL DEFAULT 0,
        completed_at INTEGER,
        created_at INTEGER NOT NULL,
        CHECK ((project_completed = 0) = (completed_at IS NULL))
    );

    CREATE TABLE IF NOT EXISTS tasks (
        task_id TEXT PRIMARY KEY,
        author_id TEXT NOT NULL REFERENCES users(user_id) ON DELETE CASCADE,
        project_id TEXT REFERENCES projects(project_id) ON DELETE SET NULL,
        task_name TEXT NOT NULL,
        task_description TEXT,
        task_completed INTEGER NOT NULL DEFAULT 0,
        completed_at INTEGER,
        date_to_complete INTEGER,
        start_time INTEGER,
        end_time INTEGER,
        created_at INTEGER NOT NULL,
        CHECK ((task_completed = 0) = (completed_at IS NULL))
    );

    CREATE INDEX IF NOT EXISTS idx_tasks_project ON tasks(project_id);

    CREATE TABLE IF NOT EXISTS task_grants (
        user_id TEXT NOT NULL REFERENCES users(user_id) ON DELETE CASCADE,
        task_id TEXT NOT NULL REFERENCES tasks(task_id) ON DELETE CASCADE,
        can_share INTEGER NOT NULL DEFAULT 0,
        can_change_permissions INTEGER NOT NULL DEFAULT 0,
        can_edit INTEGER NOT NULL DEFAULT 0,
        can_delete INTEGER NOT NULL DEFAULT 0,
        granted_at INTEGER NOT NULL,
        PRIMARY KEY (user_id, task_id)
    );

    CREATE INDEX IF NOT EXISTS idx_task_grants_task ON task_grants(task_id);

    CREATE TABLE IF NOT EXISTS project_grants (
        user_id TEXT NOT NULL REFERENCES users(user_id) ON DELETE CASCADE,
        project_id TEXT NOT NULL REFERENCES projects(project_id) ON DELETE CASCADE,
        can_share INTEGER NOT NULL DEFAULT 0,
        can_change_permissions INTEGER NOT NULL DEFAULT 0,
        can_edit INTEGER NOT NULL DEFAULT 0,
        can_delete INTEGER NOT NULL DEFAULT 0,
        granted_at INTEGER NOT NULL,
        PRIMARY KEY (user_id, project_id)
    );

    CREATE INDEX IF NOT EXISTS idx_project_grants_project ON project_grants(project_id);
";

/// Brings the schema up to [`SCHEMA_VERSION`].
pub fn migrate(conn: &Connection) -> StoreResult<()> {
    let current: i64 = conn.query_row("PRAGMA user_version", [], |row| row.get(0))?;

    if current > SCHEMA_VERSION {
        return Err(StoreError::Migration(format!(
            "database schema version {current} is newer than supported {SCHEMA_VERSION}"
        )));
    }

    if current < 1 {
        conn.execute_batch(SCHEMA_V1)
            .map_err(|e| StoreError::Migration(format!("failed to apply schema v1: {e}")))?;
        conn.pragma_update(None, "user_version", 1)?;
        info!(version = 1, "Applied schema migration");
    }

    Ok(())
}
