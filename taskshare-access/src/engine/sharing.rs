//! Grant listing and mutation, shared by tasks and projects.

use super::{audited, AccessEngine};
use crate::authorizer::{authorize_create, authorize_edit, authorize_revoke, GrantContext};
use crate::error::{AccessError, AccessResult};
use crate::resolver::resolve;
use serde::{Deserialize, Serialize};
use taskshare_store::{Accessor, Connection, Grant, GrantStore, StoreError, User, UserStore};
use taskshare_types::{
    CapabilityPatch, Identity, ProjectId, Resource, TargetUser, TaskId, UserId,
};
use tracing::info;

/// Body of a share or edit-access request.
///
/// Names the target by exactly one of id, name or email, plus the
/// capability fields to set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<UserId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_email: Option<String>,
    #[serde(flatten)]
    pub capabilities: CapabilityPatch,
}

impl ShareRequest {
    /// A request aimed at `target` with no capability fields.
    pub fn to(target: TargetUser) -> Self {
        let mut request = Self::default();
        match target {
            TargetUser::Id(id) => request.user_id = Some(id),
            TargetUser::Name(name) => request.user_name = Some(name),
            TargetUser::Email(email) => request.user_email = Some(email),
        }
        request
    }

    /// Sets the capability fields of the request.
    #[must_use]
    pub fn with_capabilities(mut self, capabilities: impl Into<CapabilityPatch>) -> Self {
        self.capabilities = capabilities.into();
        self
    }

    /// The user the request points at.
    pub fn target(&self) -> AccessResult<TargetUser> {
        match (&self.user_id, &self.user_name, &self.user_email) {
            (Some(id), None, None) => Ok(TargetUser::Id(*id)),
            (None, Some(name), None) => Ok(TargetUser::Name(name.clone())),
            (None, None, Some(email)) => Ok(TargetUser::Email(email.clone())),
            (None, None, None) => Err(AccessError::invalid(
                "user",
                "one of userId, userName or userEmail is required",
            )),
            _ => Err(AccessError::invalid(
                "user",
                "only one of userId, userName or userEmail may be given",
            )),
        }
    }
}

fn grant_context(conn: &Connection, requester: UserId, resource: Resource) -> AccessResult<GrantContext> {
    let author = GrantStore::author_of(conn, resource)?
        .ok_or_else(|| AccessError::NotFound(resource.to_string()))?;
    let standing = resolve(conn, requester, resource)?;
    Ok(GrantContext {
        requester,
        resource,
        author,
        standing,
    })
}

fn find_target(conn: &Connection, target: &TargetUser) -> AccessResult<User> {
    UserStore::find(conn, target)?.ok_or_else(|| AccessError::NotFound(format!("user {target}")))
}

impl AccessEngine {
    /// Lists the direct grants on `resource`.
    ///
    /// Only users that appear in the list may see it.
    pub fn accessors(&self, requester: &Identity, resource: Resource) -> AccessResult<Vec<Accessor>> {
        let result = self.db.read(|tx| {
            let accessors = GrantStore::list_accessors(tx, resource)?;
            if !accessors.iter().any(|a| a.user_id == requester.id) {
                return Err(AccessError::forbidden(format!(
                    "requester holds no grant on {resource}"
                )));
            }
            Ok(accessors)
        });
        audited("list_accessors", requester.id, result)
    }

    /// Gives a user access to `resource`.
    pub fn grant_access(
        &self,
        requester: &Identity,
        resource: Resource,
        request: &ShareRequest,
    ) -> AccessResult<Grant> {
        let target = request.target()?;
        let result = self.db.write(|tx| {
            let ctx = grant_context(tx, requester.id, resource)?;
            let capabilities = authorize_create(&ctx, request.capabilities.or_none())?;
            let user = find_target(tx, &target)?;

            GrantStore::insert(tx, user.id, resource, capabilities).map_err(|err| match err {
                StoreError::Conflict(_) => {
                    AccessError::Conflict("user already has access".to_string())
                }
                other => other.into(),
            })
        });

        let grant = audited("grant_access", requester.id, result)?;
        info!(
            requester = %requester.id,
            user_id = %grant.user_id,
            %resource,
            capabilities = %grant.capabilities,
            "Granted access"
        );
        Ok(grant)
    }

    /// Changes the capabilities of an existing grant. Fields omitted from
    /// the request keep their current value.
    pub fn edit_access(
        &self,
        requester: &Identity,
        resource: Resource,
        request: &ShareRequest,
    ) -> AccessResult<Grant> {
        let target = request.target()?;
        let result = self.db.write(|tx| {
            let ctx = grant_context(tx, requester.id, resource)?;
            let user = find_target(tx, &target)?;
            authorize_edit(&ctx, user.id)?;

            let current = GrantStore::get(tx, user.id, resource)?.ok_or_else(|| {
                AccessError::NotFound(format!("grant for user {} on {resource}", user.id))
            })?;
            let capabilities = current.capabilities.apply(&request.capabilities);
            Ok(GrantStore::update(tx, user.id, resource, capabilities)?)
        });

        let grant = audited("edit_access", requester.id, result)?;
        info!(
            requester = %requester.id,
            user_id = %grant.user_id,
            %resource,
            capabilities = %grant.capabilities,
            "Changed access"
        );
        Ok(grant)
    }

    /// Removes a user's grant on `resource`.
    pub fn revoke_access(
        &self,
        requester: &Identity,
        resource: Resource,
        target: &TargetUser,
    ) -> AccessResult<()> {
        let result = self.db.write(|tx| {
            let ctx = grant_context(tx, requester.id, resource)?;
            let user = find_target(tx, target)?;
            authorize_revoke(&ctx, user.id)?;
            GrantStore::delete(tx, user.id, resource)?;
            Ok(user.id)
        });

        let revoked = audited("revoke_access", requester.id, result)?;
        info!(requester = %requester.id, user_id = %revoked, %resource, "Revoked access");
        Ok(())
    }

    // ── Task wrappers ───────────────────────────────────────────

    pub fn task_accessors(&self, requester: &Identity, task: TaskId) -> AccessResult<Vec<Accessor>> {
        self.accessors(requester, Resource::Task(task))
    }

    pub fn grant_task_access(
        &self,
        requester: &Identity,
        task: TaskId,
        request: &ShareRequest,
    ) -> AccessResult<Grant> {
        self.grant_access(requester, Resource::Task(task), request)
    }

    pub fn edit_task_access(
        &self,
        requester: &Identity,
        task: TaskId,
        request: &ShareRequest,
    ) -> AccessResult<Grant> {
        self.edit_access(requester, Resource::Task(task), request)
    }

    pub fn revoke_task_access(
        &self,
        requester: &Identity,
        task: TaskId,
        target: &TargetUser,
    ) -> AccessResult<()> {
        self.revoke_access(requester, Resource::Task(task), target)
    }

    // ── Project wrappers ────────────────────────────────────────

    pub fn project_accessors(
        &self,
        requester: &Identity,
        project: ProjectId,
    ) -> AccessResult<Vec<Accessor>> {
        self.accessors(requester, Resource::Project(project))
    }

    pub fn grant_project_access(
        &self,
        requester: &Identity,
        project: ProjectId,
        request: &ShareRequest,
    ) -> AccessResult<Grant> {
        self.grant_access(requester, Resource::Project(project), request)
    }

    pub fn edit_project_access(
        &self,
        requester: &Identity,
        project: ProjectId,
        request: &ShareRequest,
    ) -> AccessResult<Grant> {
        self.edit_access(requester, Resource::Project(project), request)
    }

    pub fn revoke_project_access(
        &self,
        requester: &Identity,
        project: ProjectId,
        target: &TargetUser,
    ) -> AccessResult<()> {
        self.revoke_access(requester, Resource::Project(project), target)
    }
}
