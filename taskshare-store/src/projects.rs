//! Project repository.

use crate::columns::{caps_at, millis, now, opt_millis, opt_time_at, time_at, uuid_at};
use crate::error::{StoreError, StoreResult};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::{Deserialize, Serialize};
use taskshare_types::{Capabilities, ProjectId, UserId};

/// A stored project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: ProjectId,
    pub author_id: UserId,
    pub name: String,
    pub description: Option<String>,
    pub completed: bool,
    /// Set iff `completed` is true.
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Project {
    /// A fresh, uncompleted project authored by `author_id`.
    pub fn new(author_id: UserId, name: impl Into<String>, description: Option<String>) -> Self {
        Self {
            id: ProjectId::new(),
            author_id,
            name: name.into(),
            description,
            completed: false,
            completed_at: None,
            created_at: now(),
        }
    }
}

/// A project as seen by one user, with that user's grant on it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisibleProject {
    pub project: Project,
    pub author_name: String,
    pub author_email: String,
    /// When the user's grant was made; `None` for an author without a
    /// grant row.
    pub granted_at: Option<DateTime<Utc>>,
    pub capabilities: Capabilities,
}

const PROJECT_COLUMNS: &str = "p.project_id, p.author_id, p.project_name, p.project_description, \
                               p.project_completed, p.completed_at, p.created_at";

/// Index of the first column after [`PROJECT_COLUMNS`].
const AFTER_PROJECT_COLUMNS: usize = 7;

/// Repository for the `projects` table.
pub struct ProjectStore;

impl ProjectStore {
    pub fn insert(conn: &Connection, project: &Project) -> StoreResult<()> {
        conn.execute(
            "INSERT INTO projects (
                project_id, author_id, project_name, project_description,
                project_completed, completed_at, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                project.id.to_string(),
                project.author_id.to_string(),
                project.name,
                project.description,
                project.completed,
                opt_millis(project.completed_at),
                millis(project.created_at),
            ],
        )
        .map_err(|e| StoreError::classify(e, format!("project {}", project.id)))?;
        Ok(())
    }

    pub fn get(conn: &Connection, id: ProjectId) -> StoreResult<Option<Project>> {
        let sql = format!("SELECT {PROJECT_COLUMNS} FROM projects AS p WHERE p.project_id = ?1");
        Ok(conn
            .query_row(&sql, params![id.to_string()], row_to_project)
            .optional()?)
    }

    /// Loads `id` as `user` sees it, with the capabilities already resolved
    /// for them.
    pub fn view(
        conn: &Connection,
        id: ProjectId,
        user: UserId,
        capabilities: Capabilities,
    ) -> StoreResult<Option<VisibleProject>> {
        let sql = format!(
            "SELECT {PROJECT_COLUMNS}, a.name, a.email,
                (SELECT g.granted_at FROM project_grants AS g
                 WHERE g.project_id = p.project_id AND g.user_id = ?2)
             FROM projects AS p
             JOIN users AS a ON a.user_id = p.author_id
             WHERE p.project_id = ?1"
        );
        Ok(conn
            .query_row(&sql, params![id.to_string(), user.to_string()], |row| {
                row_to_view(row, capabilities)
            })
            .optional()?)
    }

    /// Writes the mutable fields of `project` back to its row.
    pub fn update(conn: &Connection, project: &Project) -> StoreResult<()> {
        let changed = conn.execute(
            "UPDATE projects SET
                project_name = ?2,
                project_description = ?3,
                project_completed = ?4,
                completed_at = ?5
             WHERE project_id = ?1",
            params![
                project.id.to_string(),
                project.name,
                project.description,
                project.completed,
                opt_millis(project.completed_at),
            ],
        )?;
        if changed == 0 {
            return Err(StoreError::NotFound(format!("project {}", project.id)));
        }
        Ok(())
    }

    /// Deletes a project. Its grants go with it; its tasks are detached.
    pub fn delete(conn: &Connection, id: ProjectId) -> StoreResult<()> {
        let changed = conn.execute(
            "DELETE FROM projects WHERE project_id = ?1",
            params![id.to_string()],
        )?;
        if changed == 0 {
            return Err(StoreError::NotFound(format!("project {id}")));
        }
        Ok(())
    }

    /// Lists every project `user` authored or holds a grant on.
    pub fn list_visible_to(conn: &Connection, user: UserId) -> StoreResult<Vec<VisibleProject>> {
        let sql = format!(
            "SELECT {PROJECT_COLUMNS}, a.name, a.email, g.granted_at,
                CASE WHEN p.author_id = ?1 THEN 1 ELSE g.can_share END,
                CASE WHEN p.author_id = ?1 THEN 1 ELSE g.can_change_permissions END,
                CASE WHEN p.author_id = ?1 THEN 1 ELSE g.can_edit END,
                CASE WHEN p.author_id = ?1 THEN 1 ELSE g.can_delete END
             FROM projects AS p
             JOIN users AS a ON a.user_id = p.author_id
             LEFT JOIN project_grants AS g
                ON g.project_id = p.project_id AND g.user_id = ?1
             WHERE p.author_id = ?1 OR g.user_id IS NOT NULL
             ORDER BY p.created_at ASC, p.project_id ASC"
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params![user.to_string()], |row| {
            row_to_view(row, caps_at(row, AFTER_PROJECT_COLUMNS + 3)?)
        })?;

        let mut result = Vec::new();
        for row in rows {
            result.push(row?);
        }
        Ok(result)
    }
}

/// Reads a project followed by author name, author email and grant time.
fn row_to_view(row: &Row<'_>, capabilities: Capabilities) -> rusqlite::Result<VisibleProject> {
    Ok(VisibleProject {
        project: row_to_project(row)?,
        author_name: row.get(AFTER_PROJECT_COLUMNS)?,
        author_email: row.get(AFTER_PROJECT_COLUMNS + 1)?,
        granted_at: opt_time_at(row, AFTER_PROJECT_COLUMNS + 2)?,
        capabilities,
    })
}

fn row_to_project(row: &Row<'_>) -> rusqlite::Result<Project> {
    Ok(Project {
        id: ProjectId::from_uuid(uuid_at(row, 0)?),
        author_id: UserId::from_uuid(uuid_at(row, 1)?),
        name: row.get(2)?,
        description: row.get(3)?,
        completed: row.get(4)?,
        completed_at: opt_time_at(row, 5)?,
        created_at: time_at(row, 6)?,
    })
}
