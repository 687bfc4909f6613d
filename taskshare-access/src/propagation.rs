//! Cascading propagation from a project to the tasks created under it.

use crate::resolver::resolve_project;
use taskshare_store::{Connection, GrantStore, StoreResult, Task};
use taskshare_types::{Capabilities, ProjectId, Resource, UserId};
use tracing::{debug, warn};

/// Decides which project a new task lands in.
///
/// The creator needs `canEdit` on the requested project. Without it the task
/// is still created, just without a project.
pub fn place_new_task(
    conn: &Connection,
    creator: UserId,
    requested: Option<ProjectId>,
) -> StoreResult<Option<ProjectId>> {
    let Some(project) = requested else {
        return Ok(None);
    };

    let standing = resolve_project(conn, creator, project)?;
    if standing.capabilities().is_some_and(|caps| caps.can_edit) {
        Ok(Some(project))
    } else {
        warn!(
            user_id = %creator,
            project_id = %project,
            "Creator cannot edit project; creating task without a project"
        );
        Ok(None)
    }
}

/// Writes the grants of a freshly inserted task: the author's full grant,
/// then one mirrored grant per member of the task's project.
///
/// Returns the number of grants written. Any failure aborts the caller's
/// transaction, task insert included.
pub fn fan_out(conn: &Connection, task: &Task) -> StoreResult<usize> {
    let resource = Resource::Task(task.id);
    let mut grants = vec![(task.author_id, Capabilities::FULL)];

    if let Some(project) = task.project_id {
        let members = GrantStore::list(conn, Resource::Project(project))?;
        grants.extend(
            members
                .into_iter()
                .filter(|grant| grant.user_id != task.author_id)
                .map(|grant| {
                    (
                        grant.user_id,
                        Capabilities::mirrored_from_project(&grant.capabilities),
                    )
                }),
        );
    }

    let written = GrantStore::insert_many(conn, resource, &grants)?;
    debug!(task_id = %task.id, project_id = ?task.project_id, written, "Propagated task grants");
    Ok(written)
}
