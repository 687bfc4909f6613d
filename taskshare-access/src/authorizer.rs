//! Grant mutation authorizer.
//!
//! Pure decisions over an already-resolved [`Standing`]; the engine does the
//! lookups and the writes.

use crate::error::{AccessError, AccessResult};
use crate::ownership::protect_grant;
use taskshare_types::{Capabilities, Capability, Resource, Standing, UserId};
use tracing::warn;

/// Who is asking to change grants on which resource, and from what standing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GrantContext {
    pub requester: UserId,
    pub resource: Resource,
    pub author: UserId,
    pub standing: Standing,
}

/// Returns the requester's capabilities if they hold `capability`.
pub fn require(
    standing: &Standing,
    capability: Capability,
    resource: Resource,
) -> AccessResult<Capabilities> {
    match standing.capabilities() {
        Some(caps) if caps.has(capability) => Ok(caps),
        Some(_) => Err(AccessError::forbidden(format!(
            "{capability} required on {resource}"
        ))),
        None => Err(AccessError::forbidden(format!("no standing on {resource}"))),
    }
}

/// Authorizes a new grant and returns the capabilities to store.
///
/// A sharer without `canChangePermissions` can only add view-only
/// collaborators, so the request is clamped to all-false rather than
/// rejected.
pub fn authorize_create(ctx: &GrantContext, requested: Capabilities) -> AccessResult<Capabilities> {
    let caps = require(&ctx.standing, Capability::CanShare, ctx.resource)?;
    if caps.can_change_permissions {
        return Ok(requested);
    }
    if requested != Capabilities::NONE {
        warn!(
            requester = %ctx.requester,
            resource = %ctx.resource,
            %requested,
            "Sharer lacks canChangePermissions; clamping to view-only"
        );
    }
    Ok(Capabilities::NONE)
}

/// Authorizes changing `target`'s existing grant.
pub fn authorize_edit(ctx: &GrantContext, target: UserId) -> AccessResult<()> {
    require(&ctx.standing, Capability::CanChangePermissions, ctx.resource)?;
    protect_grant(ctx.author, ctx.requester, target)
}

/// Authorizes removing `target`'s grant.
///
/// Needs `canChangePermissions`; `canDelete` on the resource is not enough.
pub fn authorize_revoke(ctx: &GrantContext, target: UserId) -> AccessResult<()> {
    require(&ctx.standing, Capability::CanChangePermissions, ctx.resource)?;
    protect_grant(ctx.author, ctx.requester, target)
}
