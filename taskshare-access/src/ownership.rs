//! Resource ownership guard.
//!
//! Keeps grant mutations away from the author's grant and the requester's own
//! grant, and decides who may move a task between projects.

use crate::error::{AccessError, AccessResult};
use taskshare_types::{Capabilities, ProjectId, UserId};

/// Rejects a grant edit or revoke aimed at the resource author or at the
/// requester.
pub fn protect_grant(author: UserId, requester: UserId, target: UserId) -> AccessResult<()> {
    if target == author {
        return Err(AccessError::forbidden("the author's grant cannot be changed"));
    }
    if target == requester {
        return Err(AccessError::forbidden("a requester cannot change their own grant"));
    }
    Ok(())
}

/// What an edit asks to do with a task's project link.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ProjectAssignment {
    /// Leave the link as it is.
    #[default]
    Unchanged,
    /// Link the task to this project.
    Assign(ProjectId),
    /// Remove the task from its project.
    Detach,
}

impl ProjectAssignment {
    /// The project link after applying this assignment to `current`.
    pub fn target(&self, current: Option<ProjectId>) -> Option<ProjectId> {
        match self {
            Self::Unchanged => current,
            Self::Assign(project) => Some(*project),
            Self::Detach => None,
        }
    }
}

/// One side of a project transfer: the project and the editor's capabilities
/// on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferSide {
    pub project: ProjectId,
    pub capabilities: Capabilities,
}

/// Decides whether `editor` may move a task from `from` to `to`.
///
/// - attaching (`None -> B`) needs the task's author with edit on B
/// - detaching (`A -> None`) needs edit on A
/// - moving (`A -> B`) needs the task's author with edit on A and B
pub fn authorize_transfer(
    editor: UserId,
    task_author: UserId,
    from: Option<TransferSide>,
    to: Option<TransferSide>,
) -> AccessResult<()> {
    let is_author = editor == task_author;
    match (from, to) {
        (None, None) => Ok(()),
        (Some(a), Some(b)) if a.project == b.project => Ok(()),
        (None, Some(b)) => {
            if !is_author {
                return Err(AccessError::forbidden("only the author can attach a task"));
            }
            require_edit(&b)
        }
        (Some(a), None) => require_edit(&a),
        (Some(a), Some(b)) => {
            if !is_author {
                return Err(AccessError::forbidden(
                    "only the author can move a task between projects",
                ));
            }
            require_edit(&a)?;
            require_edit(&b)
        }
    }
}

fn require_edit(side: &TransferSide) -> AccessResult<()> {
    if side.capabilities.can_edit {
        Ok(())
    } else {
        Err(AccessError::forbidden(format!(
            "canEdit required on project {}",
            side.project
        )))
    }
}
