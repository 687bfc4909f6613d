//! Task repository, including the inheritance-aware visibility listing.

use crate::columns::{
    caps_at, millis, now, opt_millis, opt_time_at, opt_uuid_at, time_at, uuid_at,
};
use crate::error::{StoreError, StoreResult};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::{Deserialize, Serialize};
use taskshare_types::{ProjectId, Standing, TaskId, UserId};

/// A stored task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    pub author_id: UserId,
    pub project_id: Option<ProjectId>,
    pub name: String,
    pub description: Option<String>,
    pub completed: bool,
    /// Set iff `completed` is true.
    pub completed_at: Option<DateTime<Utc>>,
    pub date_to_complete: Option<DateTime<Utc>>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Task {
    /// A fresh, uncompleted task authored by `author_id` with no project.
    pub fn new(author_id: UserId, name: impl Into<String>) -> Self {
        Self {
            id: TaskId::new(),
            author_id,
            project_id: None,
            name: name.into(),
            description: None,
            completed: false,
            completed_at: None,
            date_to_complete: None,
            start_time: None,
            end_time: None,
            created_at: now(),
        }
    }
}

/// A task as seen by one user, with the standing that makes it visible.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisibleTask {
    pub task: Task,
    pub author_name: String,
    pub author_email: String,
    pub project_name: Option<String>,
    /// When the grant behind `standing` was made: the task grant for direct
    /// standing, the project grant for inherited standing. `None` for an
    /// author without a grant row.
    pub granted_at: Option<DateTime<Utc>>,
    pub standing: Standing,
}

const TASK_COLUMNS: &str = "t.task_id, t.author_id, t.project_id, t.task_name, t.task_description, \
                            t.task_completed, t.completed_at, t.date_to_complete, t.start_time, \
                            t.end_time, t.created_at";

/// Author and project columns; needs `users AS a` and `projects AS p` joined.
const VIEW_COLUMNS: &str = "a.name, a.email, p.project_name";

const VIEW_JOINS: &str = "JOIN users AS a ON a.user_id = t.author_id
             LEFT JOIN projects AS p ON p.project_id = t.project_id";

/// Index of the first column after [`TASK_COLUMNS`].
const AFTER_TASK_COLUMNS: usize = 11;

/// Index of the first column after [`TASK_COLUMNS`] and [`VIEW_COLUMNS`].
const AFTER_VIEW_COLUMNS: usize = AFTER_TASK_COLUMNS + 3;

/// Repository for the `tasks` table.
pub struct TaskStore;

impl TaskStore {
    pub fn insert(conn: &Connection, task: &Task) -> StoreResult<()> {
        conn.execute(
            "INSERT INTO tasks (
                task_id, author_id, project_id, task_name, task_description,
                task_completed, completed_at, date_to_complete, start_time, end_time, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            params![
                task.id.to_string(),
                task.author_id.to_string(),
                task.project_id.map(|p| p.to_string()),
                task.name,
                task.description,
                task.completed,
                opt_millis(task.completed_at),
                opt_millis(task.date_to_complete),
                opt_millis(task.start_time),
                opt_millis(task.end_time),
                millis(task.created_at),
            ],
        )
        .map_err(|e| StoreError::classify(e, format!("task {}", task.id)))?;
        Ok(())
    }

    pub fn get(conn: &Connection, id: TaskId) -> StoreResult<Option<Task>> {
        let sql = format!("SELECT {TASK_COLUMNS} FROM tasks AS t WHERE t.task_id = ?1");
        Ok(conn
            .query_row(&sql, params![id.to_string()], row_to_task)
            .optional()?)
    }

    /// Loads `id` as `user` sees it, given the standing already resolved for
    /// them.
    pub fn view(
        conn: &Connection,
        id: TaskId,
        user: UserId,
        standing: Standing,
    ) -> StoreResult<Option<VisibleTask>> {
        let sql = format!(
            "SELECT {TASK_COLUMNS}, {VIEW_COLUMNS},
                (SELECT g.granted_at FROM task_grants AS g
                 WHERE g.task_id = t.task_id AND g.user_id = ?2),
                (SELECT pg.granted_at FROM project_grants AS pg
                 WHERE pg.project_id = t.project_id AND pg.user_id = ?2)
             FROM tasks AS t
             {VIEW_JOINS}
             WHERE t.task_id = ?1"
        );
        Ok(conn
            .query_row(&sql, params![id.to_string(), user.to_string()], |row| {
                let granted_at = if standing.is_direct() {
                    opt_time_at(row, AFTER_VIEW_COLUMNS)?
                } else {
                    opt_time_at(row, AFTER_VIEW_COLUMNS + 1)?
                };
                row_to_view(row, standing, granted_at)
            })
            .optional()?)
    }

    /// Returns the task's project link: `None` if the task does not exist,
    /// `Some(None)` if it exists without a project.
    pub fn project_of(conn: &Connection, id: TaskId) -> StoreResult<Option<Option<ProjectId>>> {
        let link = conn
            .query_row(
                "SELECT project_id FROM tasks WHERE task_id = ?1",
                params![id.to_string()],
                |row| opt_uuid_at(row, 0),
            )
            .optional()?;
        Ok(link.map(|project| project.map(ProjectId::from_uuid)))
    }

    /// Writes the mutable fields of `task` back to its row.
    pub fn update(conn: &Connection, task: &Task) -> StoreResult<()> {
        let changed = conn
            .execute(
                "UPDATE tasks SET
                    project_id = ?2,
                    task_name = ?3,
                    task_description = ?4,
                    task_completed = ?5,
                    completed_at = ?6,
                    date_to_complete = ?7,
                    start_time = ?8,
                    end_time = ?9
                 WHERE task_id = ?1",
                params![
                    task.id.to_string(),
                    task.project_id.map(|p| p.to_string()),
                    task.name,
                    task.description,
                    task.completed,
                    opt_millis(task.completed_at),
                    opt_millis(task.date_to_complete),
                    opt_millis(task.start_time),
                    opt_millis(task.end_time),
                ],
            )
            .map_err(|e| StoreError::classify(e, format!("task {}", task.id)))?;
        if changed == 0 {
            return Err(StoreError::NotFound(format!("task {}", task.id)));
        }
        Ok(())
    }

    /// Deletes a task together with its grants.
    pub fn delete(conn: &Connection, id: TaskId) -> StoreResult<()> {
        let changed = conn.execute("DELETE FROM tasks WHERE task_id = ?1", params![id.to_string()])?;
        if changed == 0 {
            return Err(StoreError::NotFound(format!("task {id}")));
        }
        Ok(())
    }

    /// Lists the tasks of one project, oldest first.
    pub fn list_for_project(conn: &Connection, project: ProjectId) -> StoreResult<Vec<Task>> {
        let sql = format!(
            "SELECT {TASK_COLUMNS} FROM tasks AS t
             WHERE t.project_id = ?1
             ORDER BY t.created_at ASC, t.task_id ASC"
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params![project.to_string()], row_to_task)?;

        let mut result = Vec::new();
        for row in rows {
            result.push(row?);
        }
        Ok(result)
    }

    /// Lists every task visible to `user`.
    ///
    /// The result is the union of
    /// - tasks the user authored or holds a direct grant on, and
    /// - tasks under a project the user holds a grant on, for which no direct
    ///   grant exists.
    ///
    /// The `NOT EXISTS` clause keeps a task from appearing twice and lets a
    /// direct grant win over the inherited one even when it is narrower.
    pub fn list_visible_to(conn: &Connection, user: UserId) -> StoreResult<Vec<VisibleTask>> {
        let sql = format!(
            "SELECT {TASK_COLUMNS}, {VIEW_COLUMNS},
                CASE WHEN t.author_id = ?1 THEN 1 ELSE g.can_share END,
                CASE WHEN t.author_id = ?1 THEN 1 ELSE g.can_change_permissions END,
                CASE WHEN t.author_id = ?1 THEN 1 ELSE g.can_edit END,
                CASE WHEN t.author_id = ?1 THEN 1 ELSE g.can_delete END,
                g.granted_at,
                0 AS inherited
             FROM tasks AS t
             {VIEW_JOINS}
             LEFT JOIN task_grants AS g ON g.task_id = t.task_id AND g.user_id = ?1
             WHERE g.user_id IS NOT NULL OR t.author_id = ?1
             UNION ALL
             SELECT {TASK_COLUMNS}, {VIEW_COLUMNS},
                0, 0, pg.can_edit, pg.can_edit,
                pg.granted_at,
                1 AS inherited
             FROM tasks AS t
             {VIEW_JOINS}
             JOIN project_grants AS pg ON pg.project_id = t.project_id AND pg.user_id = ?1
             WHERE t.author_id <> ?1
               AND NOT EXISTS (
                   SELECT 1 FROM task_grants AS d
                   WHERE d.task_id = t.task_id AND d.user_id = ?1
               )
             ORDER BY 11 ASC, 1 ASC"
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params![user.to_string()], |row| {
            let capabilities = caps_at(row, AFTER_VIEW_COLUMNS)?;
            let granted_at = opt_time_at(row, AFTER_VIEW_COLUMNS + 4)?;
            let inherited: bool = row.get(AFTER_VIEW_COLUMNS + 5)?;
            let project = opt_uuid_at(row, 2)?.map(ProjectId::from_uuid);
            let standing = match (inherited, project) {
                (true, Some(project)) => Standing::Inherited {
                    project,
                    capabilities,
                },
                _ => Standing::direct(capabilities),
            };
            row_to_view(row, standing, granted_at)
        })?;

        let mut result = Vec::new();
        for row in rows {
            result.push(row?);
        }
        Ok(result)
    }
}

fn row_to_view(
    row: &Row<'_>,
    standing: Standing,
    granted_at: Option<DateTime<Utc>>,
) -> rusqlite::Result<VisibleTask> {
    Ok(VisibleTask {
        task: row_to_task(row)?,
        author_name: row.get(AFTER_TASK_COLUMNS)?,
        author_email: row.get(AFTER_TASK_COLUMNS + 1)?,
        project_name: row.get(AFTER_TASK_COLUMNS + 2)?,
        granted_at,
        standing,
    })
}

fn row_to_task(row: &Row<'_>) -> rusqlite::Result<Task> {
    Ok(Task {
        id: TaskId::from_uuid(uuid_at(row, 0)?),
        author_id: UserId::from_uuid(uuid_at(row, 1)?),
        project_id: opt_uuid_at(row, 2)?.map(ProjectId::from_uuid),
        name: row.get(3)?,
        description: row.get(4)?,
        completed: row.get(5)?,
        completed_at: opt_time_at(row, 6)?,
        date_to_complete: opt_time_at(row, 7)?,
        start_time: opt_time_at(row, 8)?,
        end_time: opt_time_at(row, 9)?,
        created_at: time_at(row, 10)?,
    })
}
