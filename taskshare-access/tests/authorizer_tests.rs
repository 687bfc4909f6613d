//! Pure authorization decisions: grant mutations, project transfers and
//! completion transitions.

use chrono::{Duration, Utc};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use taskshare_access::authorizer::{
    authorize_create, authorize_edit, authorize_revoke, require, GrantContext,
};
use taskshare_access::completion::transition;
use taskshare_access::ownership::{authorize_transfer, protect_grant, TransferSide};
use taskshare_access::{AccessError, ProjectAssignment};
use taskshare_types::{
    Capabilities, Capability, ProjectId, Resource, Standing, TaskId, UserId,
};

fn caps_strategy() -> impl Strategy<Value = Capabilities> {
    any::<[bool; 4]>().prop_map(|[s, c, e, d]| Capabilities::new(s, c, e, d))
}

fn context(standing: Standing) -> GrantContext {
    GrantContext {
        requester: UserId::new(),
        resource: Resource::Task(TaskId::new()),
        author: UserId::new(),
        standing,
    }
}

fn is_forbidden<T: std::fmt::Debug>(result: Result<T, AccessError>) -> bool {
    matches!(result, Err(AccessError::Forbidden(_)))
}

// ── require ─────────────────────────────────────────────────────

#[test]
fn require_rejects_missing_standing() {
    let resource = Resource::Task(TaskId::new());
    assert!(is_forbidden(require(&Standing::None, Capability::CanEdit, resource)));
}

#[test]
fn require_checks_single_capability() {
    let resource = Resource::Project(ProjectId::new());
    let standing = Standing::direct(Capabilities::new(false, false, true, false));
    assert!(require(&standing, Capability::CanEdit, resource).is_ok());
    assert!(is_forbidden(require(&standing, Capability::CanDelete, resource)));
}

// ── Create ──────────────────────────────────────────────────────

#[test]
fn create_needs_can_share() {
    let ctx = context(Standing::direct(Capabilities::new(false, true, true, true)));
    assert!(is_forbidden(authorize_create(&ctx, Capabilities::NONE)));
}

#[test]
fn create_with_change_permissions_keeps_request() {
    let ctx = context(Standing::direct(Capabilities::new(true, true, false, false)));
    let requested = Capabilities::new(true, false, true, true);
    assert_eq!(authorize_create(&ctx, requested).unwrap(), requested);
}

#[test]
fn inherited_standing_can_never_share() {
    let ctx = context(Standing::inherited(ProjectId::new(), &Capabilities::FULL));
    assert!(is_forbidden(authorize_create(&ctx, Capabilities::NONE)));
}

proptest! {
    /// A sharer without canChangePermissions only ever adds view-only grants.
    #[test]
    fn sharer_without_change_permissions_is_clamped(
        mut held in caps_strategy(),
        requested in caps_strategy(),
    ) {
        held.can_share = true;
        held.can_change_permissions = false;
        let ctx = context(Standing::direct(held));
        prop_assert_eq!(authorize_create(&ctx, requested).unwrap(), Capabilities::NONE);
    }

    /// Edit and revoke aimed at oneself fail whatever the requester holds.
    #[test]
    fn self_edit_and_revoke_always_fail(held in caps_strategy()) {
        let mut ctx = context(Standing::direct(held));
        let me = ctx.requester;
        prop_assert!(is_forbidden(authorize_edit(&ctx, me)));
        prop_assert!(is_forbidden(authorize_revoke(&ctx, me)));

        // Even when the requester is the author.
        ctx.author = me;
        prop_assert!(is_forbidden(authorize_edit(&ctx, me)));
        prop_assert!(is_forbidden(authorize_revoke(&ctx, me)));
    }

    /// The author's grant can never be edited or revoked.
    #[test]
    fn author_grant_is_untouchable(held in caps_strategy()) {
        let ctx = context(Standing::direct(held));
        prop_assert!(is_forbidden(authorize_edit(&ctx, ctx.author)));
        prop_assert!(is_forbidden(authorize_revoke(&ctx, ctx.author)));
    }

    /// Editing and revoking someone else is exactly gated by canChangePermissions.
    #[test]
    fn edit_and_revoke_follow_change_permissions(held in caps_strategy()) {
        let ctx = context(Standing::direct(held));
        let other = UserId::new();
        prop_assert_eq!(authorize_edit(&ctx, other).is_ok(), held.can_change_permissions);
        prop_assert_eq!(authorize_revoke(&ctx, other).is_ok(), held.can_change_permissions);
    }
}

#[test]
fn can_delete_alone_cannot_revoke() {
    let ctx = context(Standing::direct(Capabilities::new(true, false, true, true)));
    assert!(is_forbidden(authorize_revoke(&ctx, UserId::new())));
}

#[test]
fn protect_grant_checks_author_before_self() {
    let author = UserId::new();
    let err = protect_grant(author, author, author).unwrap_err();
    assert!(err.to_string().contains("author"));
    assert!(protect_grant(author, UserId::new(), UserId::new()).is_ok());
}

// ── Transfers ───────────────────────────────────────────────────

fn editable(project: ProjectId) -> Option<TransferSide> {
    Some(TransferSide {
        project,
        capabilities: Capabilities::new(false, false, true, false),
    })
}

fn read_only(project: ProjectId) -> Option<TransferSide> {
    Some(TransferSide {
        project,
        capabilities: Capabilities::NONE,
    })
}

#[test]
fn attach_needs_author_and_edit_on_destination() {
    let author = UserId::new();
    let other = UserId::new();
    let b = ProjectId::new();

    assert!(authorize_transfer(author, author, None, editable(b)).is_ok());
    assert!(is_forbidden(authorize_transfer(author, author, None, read_only(b))));
    assert!(is_forbidden(authorize_transfer(other, author, None, editable(b))));
}

#[test]
fn detach_needs_edit_on_source_only() {
    let author = UserId::new();
    let other = UserId::new();
    let a = ProjectId::new();

    assert!(authorize_transfer(other, author, editable(a), None).is_ok());
    assert!(is_forbidden(authorize_transfer(author, author, read_only(a), None)));
}

#[test]
fn move_needs_author_and_edit_on_both() {
    let author = UserId::new();
    let other = UserId::new();
    let (a, b) = (ProjectId::new(), ProjectId::new());

    assert!(authorize_transfer(author, author, editable(a), editable(b)).is_ok());
    assert!(is_forbidden(authorize_transfer(author, author, read_only(a), editable(b))));
    assert!(is_forbidden(authorize_transfer(author, author, editable(a), read_only(b))));
    // Non-author with edit on both sides is still refused.
    assert!(is_forbidden(authorize_transfer(other, author, editable(a), editable(b))));
}

#[test]
fn no_op_transfer_is_allowed() {
    let a = ProjectId::new();
    let user = UserId::new();
    assert!(authorize_transfer(user, UserId::new(), None, None).is_ok());
    assert!(authorize_transfer(user, UserId::new(), read_only(a), read_only(a)).is_ok());
}

#[test]
fn project_assignment_target() {
    let a = ProjectId::new();
    let b = ProjectId::new();
    assert_eq!(ProjectAssignment::Unchanged.target(Some(a)), Some(a));
    assert_eq!(ProjectAssignment::Assign(b).target(Some(a)), Some(b));
    assert_eq!(ProjectAssignment::Detach.target(Some(a)), None);
    assert_eq!(ProjectAssignment::default(), ProjectAssignment::Unchanged);
}

// ── Completion ──────────────────────────────────────────────────

#[test]
fn completion_timestamp_changes_only_on_transition() {
    let earlier = Utc::now() - Duration::days(3);
    let now = Utc::now();

    assert_eq!(transition(false, None, Some(true), now), (true, Some(now)));
    assert_eq!(transition(true, Some(earlier), Some(false), now), (false, None));
    // Re-completing keeps the original timestamp.
    assert_eq!(
        transition(true, Some(earlier), Some(true), now),
        (true, Some(earlier))
    );
    assert_eq!(transition(false, None, Some(false), now), (false, None));
    assert_eq!(
        transition(true, Some(earlier), None, now),
        (true, Some(earlier))
    );
}
