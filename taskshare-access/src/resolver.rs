//! Effective-permission resolution.
//!
//! A user's standing on a task is their direct task grant if one exists,
//! otherwise whatever their grant on the owning project implies. Project
//! standing is always the direct project grant.
//!
//! Both lookups take the connection of an open transaction, so the task's
//! project link and the project grant are read from one snapshot.

use taskshare_store::{Connection, GrantStore, StoreResult, TaskStore};
use taskshare_types::{ProjectId, Resource, Standing, TaskId, UserId};
use tracing::debug;

/// Resolves `user`'s standing on a task.
///
/// A task that does not exist resolves to [`Standing::None`].
pub fn resolve_task(conn: &Connection, user: UserId, task: TaskId) -> StoreResult<Standing> {
    if let Some(grant) = GrantStore::get(conn, user, Resource::Task(task))? {
        debug!(user_id = %user, task_id = %task, capabilities = %grant.capabilities, "Direct task grant");
        return Ok(Standing::direct(grant.capabilities));
    }

    let Some(Some(project)) = TaskStore::project_of(conn, task)? else {
        debug!(user_id = %user, task_id = %task, "No task grant and no project");
        return Ok(Standing::None);
    };

    match GrantStore::get(conn, user, Resource::Project(project))? {
        Some(grant) => {
            let standing = Standing::inherited(project, &grant.capabilities);
            debug!(
                user_id = %user,
                task_id = %task,
                project_id = %project,
                "Task standing inherited from project"
            );
            Ok(standing)
        }
        None => {
            debug!(user_id = %user, task_id = %task, project_id = %project, "No standing");
            Ok(Standing::None)
        }
    }
}

/// Resolves `user`'s standing on a project.
pub fn resolve_project(
    conn: &Connection,
    user: UserId,
    project: ProjectId,
) -> StoreResult<Standing> {
    let standing = GrantStore::get(conn, user, Resource::Project(project))?
        .map(|grant| Standing::direct(grant.capabilities))
        .unwrap_or(Standing::None);
    debug!(user_id = %user, project_id = %project, ?standing, "Resolved project standing");
    Ok(standing)
}

/// Resolves `user`'s standing on either kind of resource.
pub fn resolve(conn: &Connection, user: UserId, resource: Resource) -> StoreResult<Standing> {
    match resource {
        Resource::Task(task) => resolve_task(conn, user, task),
        Resource::Project(project) => resolve_project(conn, user, project),
    }
}
