//! A user's resolved standing on a resource.

use crate::capability::Capabilities;
use crate::ids::ProjectId;
use serde::{Deserialize, Serialize};

/// How (and whether) a user may act on a task or project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Standing {
    /// An explicit grant on the resource itself.
    Direct { capabilities: Capabilities },
    /// No direct grant; derived from the user's grant on the owning project.
    Inherited {
        project: ProjectId,
        capabilities: Capabilities,
    },
    /// The user has no access at all.
    None,
}

impl Standing {
    pub fn direct(capabilities: Capabilities) -> Self {
        Self::Direct { capabilities }
    }

    /// Inherited standing computed from the user's project grant.
    pub fn inherited(project: ProjectId, project_grant: &Capabilities) -> Self {
        Self::Inherited {
            project,
            capabilities: Capabilities::inherited_from_project(project_grant),
        }
    }

    /// The effective capabilities, or `None` when the user has no standing.
    pub fn capabilities(&self) -> Option<Capabilities> {
        match self {
            Self::Direct { capabilities } | Self::Inherited { capabilities, .. } => {
                Some(*capabilities)
            }
            Self::None => None,
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    pub fn is_direct(&self) -> bool {
        matches!(self, Self::Direct { .. })
    }
}
