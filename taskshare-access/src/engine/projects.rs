//! Project operations.

use super::{audited, non_empty, AccessEngine};
use crate::authorizer::require;
use crate::completion;
use crate::error::{AccessError, AccessResult};
use crate::resolver::resolve_project;
use serde::{Deserialize, Serialize};
use taskshare_store::{now, Connection, GrantStore, Project, ProjectStore, VisibleProject};
use taskshare_types::{Capabilities, Capability, Identity, ProjectId, Resource, UserId};
use tracing::info;

/// Fields of a project to create.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProject {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// A partial project edit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectChanges {
    pub name: Option<String>,
    pub description: Option<Option<String>>,
    pub completed: Option<bool>,
}

fn view(
    conn: &Connection,
    user: UserId,
    project: ProjectId,
    capabilities: Capabilities,
) -> AccessResult<VisibleProject> {
    ProjectStore::view(conn, project, user, capabilities)?
        .ok_or_else(|| AccessError::NotFound(format!("project {project}")))
}

impl AccessEngine {
    /// Every project `user` authored or holds a grant on.
    pub fn projects_visible_to(&self, user: &Identity) -> AccessResult<Vec<VisibleProject>> {
        Ok(self.db.read(|tx| ProjectStore::list_visible_to(tx, user.id))?)
    }

    /// Fetches one project together with the caller's capabilities on it.
    pub fn get_project(&self, user: &Identity, project: ProjectId) -> AccessResult<VisibleProject> {
        let result = self.db.read(|tx| {
            let Some(capabilities) = resolve_project(tx, user.id, project)?.capabilities() else {
                return Err(AccessError::forbidden(format!("no standing on project {project}")));
            };
            view(tx, user.id, project, capabilities)
        });
        audited("get_project", user.id, result)
    }

    /// Creates a project authored by `user`, with the author's grant row.
    pub fn create_project(&self, user: &Identity, fields: NewProject) -> AccessResult<VisibleProject> {
        let name = non_empty("name", &fields.name)?;
        let project = Project::new(user.id, name, fields.description);

        let created = self.db.write(|tx| {
            ProjectStore::insert(tx, &project)?;
            GrantStore::insert(tx, user.id, Resource::Project(project.id), Capabilities::FULL)?;
            view(tx, user.id, project.id, Capabilities::FULL)
        })?;

        info!(user_id = %user.id, project_id = %project.id, "Created project");
        Ok(created)
    }

    /// Edits a project. Needs `canEdit`.
    pub fn edit_project(
        &self,
        user: &Identity,
        project_id: ProjectId,
        changes: ProjectChanges,
    ) -> AccessResult<VisibleProject> {
        let name = changes
            .name
            .as_deref()
            .map(|name| non_empty("name", name).map(str::to_string))
            .transpose()?;

        let result = self.db.write(|tx| {
            let standing = resolve_project(tx, user.id, project_id)?;
            let capabilities = require(&standing, Capability::CanEdit, Resource::Project(project_id))?;
            let mut project = ProjectStore::get(tx, project_id)?
                .ok_or_else(|| AccessError::NotFound(format!("project {project_id}")))?;

            if let Some(name) = name {
                project.name = name;
            }
            if let Some(description) = changes.description {
                project.description = description;
            }
            (project.completed, project.completed_at) = completion::transition(
                project.completed,
                project.completed_at,
                changes.completed,
                now(),
            );

            ProjectStore::update(tx, &project)?;
            view(tx, user.id, project_id, capabilities)
        });

        let edited = audited("edit_project", user.id, result)?;
        info!(user_id = %user.id, project_id = %project_id, "Edited project");
        Ok(edited)
    }

    /// Deletes a project and its grants. Needs `canDelete`.
    ///
    /// Tasks of the project survive, detached; members lose the standing
    /// they inherited through it.
    pub fn delete_project(&self, user: &Identity, project: ProjectId) -> AccessResult<()> {
        let result = self.db.write(|tx| {
            let standing = resolve_project(tx, user.id, project)?;
            require(&standing, Capability::CanDelete, Resource::Project(project))?;
            ProjectStore::delete(tx, project)?;
            Ok(())
        });

        audited("delete_project", user.id, result)?;
        info!(user_id = %user.id, project_id = %project, "Deleted project");
        Ok(())
    }
}
