//! Task operations.

use super::{audited, non_empty, AccessEngine};
use crate::authorizer::require;
use crate::completion;
use crate::error::{AccessError, AccessResult};
use crate::ownership::{authorize_transfer, ProjectAssignment, TransferSide};
use crate::propagation::{fan_out, place_new_task};
use crate::resolver::{resolve_project, resolve_task};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use taskshare_store::{now, Accessor, Connection, GrantStore, Task, TaskStore, VisibleTask};
use taskshare_types::{Capabilities, Capability, Identity, ProjectId, Resource, Standing, TaskId, UserId};
use tracing::info;

/// Fields of a task to create.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTask {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub project_id: Option<ProjectId>,
    #[serde(default)]
    pub date_to_complete: Option<DateTime<Utc>>,
    #[serde(default)]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub end_time: Option<DateTime<Utc>>,
}

impl NewTask {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn in_project(mut self, project: ProjectId) -> Self {
        self.project_id = Some(project);
        self
    }
}

/// A partial task edit. `None` leaves a field untouched; for optional
/// fields `Some(None)` clears it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskChanges {
    pub name: Option<String>,
    pub description: Option<Option<String>>,
    pub completed: Option<bool>,
    pub date_to_complete: Option<Option<DateTime<Utc>>>,
    pub start_time: Option<Option<DateTime<Utc>>>,
    pub end_time: Option<Option<DateTime<Utc>>>,
    pub project: ProjectAssignment,
}

/// One task with everything a detail view shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskDetail {
    #[serde(flatten)]
    pub view: VisibleTask,
    /// Direct grant holders, author first. Only members of the list may see
    /// it, so this is `None` for a caller whose standing is inherited.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accessors: Option<Vec<Accessor>>,
}

fn side(conn: &Connection, user: UserId, project: Option<ProjectId>) -> AccessResult<Option<TransferSide>> {
    let Some(project) = project else {
        return Ok(None);
    };
    let capabilities = resolve_project(conn, user, project)?
        .capabilities()
        .unwrap_or(Capabilities::NONE);
    Ok(Some(TransferSide {
        project,
        capabilities,
    }))
}

fn visible(conn: &Connection, user: UserId, task: TaskId) -> AccessResult<VisibleTask> {
    let standing = resolve_task(conn, user, task)?;
    if standing.is_none() {
        return Err(AccessError::forbidden(format!("no standing on task {task}")));
    }
    view(conn, user, task, standing)
}

fn view(conn: &Connection, user: UserId, task: TaskId, standing: Standing) -> AccessResult<VisibleTask> {
    TaskStore::view(conn, task, user, standing)?
        .ok_or_else(|| AccessError::NotFound(format!("task {task}")))
}

impl AccessEngine {
    /// Every task `user` can see: authored, directly shared, or inherited
    /// through a project grant.
    pub fn tasks_visible_to(&self, user: &Identity) -> AccessResult<Vec<VisibleTask>> {
        Ok(self.db.read(|tx| TaskStore::list_visible_to(tx, user.id))?)
    }

    /// Fetches one task together with the caller's standing on it and, for
    /// direct grant holders, everyone else's access.
    pub fn get_task(&self, user: &Identity, task: TaskId) -> AccessResult<TaskDetail> {
        let result = self.db.read(|tx| {
            let view = visible(tx, user.id, task)?;
            let accessors = GrantStore::list_accessors(tx, Resource::Task(task))?;
            let accessors = accessors
                .iter()
                .any(|a| a.user_id == user.id)
                .then_some(accessors);
            Ok(TaskDetail { view, accessors })
        });
        audited("get_task", user.id, result)
    }

    /// Creates a task authored by `user`.
    ///
    /// If a project is requested but `user` cannot edit it, the task is
    /// created without one. Project members get mirrored task grants in the
    /// same transaction.
    pub fn create_task(&self, user: &Identity, fields: NewTask) -> AccessResult<VisibleTask> {
        let name = non_empty("name", &fields.name)?.to_string();

        let created = self.db.write(|tx| {
            let project_id = place_new_task(tx, user.id, fields.project_id)?;
            let task = Task {
                project_id,
                description: fields.description.clone(),
                date_to_complete: fields.date_to_complete,
                start_time: fields.start_time,
                end_time: fields.end_time,
                ..Task::new(user.id, name)
            };
            TaskStore::insert(tx, &task)?;
            fan_out(tx, &task)?;
            view(tx, user.id, task.id, Standing::direct(Capabilities::FULL))
        })?;

        info!(
            user_id = %user.id,
            task_id = %created.task.id,
            project_id = ?created.task.project_id,
            "Created task"
        );
        Ok(created)
    }

    /// Edits a task. Needs `canEdit` on the task; changing its project also
    /// goes through the transfer rules.
    pub fn edit_task(
        &self,
        user: &Identity,
        task_id: TaskId,
        changes: TaskChanges,
    ) -> AccessResult<VisibleTask> {
        let name = changes
            .name
            .as_deref()
            .map(|name| non_empty("name", name).map(str::to_string))
            .transpose()?;

        let result = self.db.write(|tx| {
            let standing = resolve_task(tx, user.id, task_id)?;
            require(&standing, Capability::CanEdit, Resource::Task(task_id))?;
            let mut task = TaskStore::get(tx, task_id)?
                .ok_or_else(|| AccessError::NotFound(format!("task {task_id}")))?;

            let target = changes.project.target(task.project_id);
            if target != task.project_id {
                authorize_transfer(
                    user.id,
                    task.author_id,
                    side(tx, user.id, task.project_id)?,
                    side(tx, user.id, target)?,
                )?;
                task.project_id = target;
            }

            if let Some(name) = name {
                task.name = name;
            }
            if let Some(description) = changes.description {
                task.description = description;
            }
            if let Some(date) = changes.date_to_complete {
                task.date_to_complete = date;
            }
            if let Some(start) = changes.start_time {
                task.start_time = start;
            }
            if let Some(end) = changes.end_time {
                task.end_time = end;
            }
            (task.completed, task.completed_at) =
                completion::transition(task.completed, task.completed_at, changes.completed, now());

            TaskStore::update(tx, &task)?;
            // Detaching can drop an inherited-only editor's standing to none.
            let standing = resolve_task(tx, user.id, task_id)?;
            view(tx, user.id, task_id, standing)
        });

        let edited = audited("edit_task", user.id, result)?;
        info!(
            user_id = %user.id,
            task_id = %task_id,
            project_id = ?edited.task.project_id,
            "Edited task"
        );
        Ok(edited)
    }

    /// Deletes a task and its grants. Needs `canDelete`.
    pub fn delete_task(&self, user: &Identity, task: TaskId) -> AccessResult<()> {
        let result = self.db.write(|tx| {
            let standing = resolve_task(tx, user.id, task)?;
            require(&standing, Capability::CanDelete, Resource::Task(task))?;
            TaskStore::delete(tx, task)?;
            Ok(())
        });

        audited("delete_task", user.id, result)?;
        info!(user_id = %user.id, task_id = %task, "Deleted task");
        Ok(())
    }
}
