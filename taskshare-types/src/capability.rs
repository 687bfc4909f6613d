//! The four-capability grant record.
//!
//! Every grant, direct or inherited, is one [`Capabilities`] value. The
//! capabilities are independent booleans; no ordering between them is
//! enforced here.

use crate::Error;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A single capability a user may hold on a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Capability {
    /// May create new grants for other users.
    CanShare,
    /// May edit or revoke existing grants.
    CanChangePermissions,
    /// May mutate the resource's fields.
    CanEdit,
    /// May delete the resource.
    CanDelete,
}

impl Capability {
    pub const ALL: [Capability; 4] = [
        Capability::CanShare,
        Capability::CanChangePermissions,
        Capability::CanEdit,
        Capability::CanDelete,
    ];

    /// Returns the camelCase wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CanShare => "canShare",
            Self::CanChangePermissions => "canChangePermissions",
            Self::CanEdit => "canEdit",
            Self::CanDelete => "canDelete",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Capability {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Capability::ALL
            .into_iter()
            .find(|cap| cap.as_str() == s)
            .ok_or_else(|| Error::UnknownCapability(s.to_string()))
    }
}

/// The capability set of one grant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Capabilities {
    pub can_share: bool,
    pub can_change_permissions: bool,
    pub can_edit: bool,
    pub can_delete: bool,
}

impl Capabilities {
    /// All four capabilities. Held permanently by a resource's author.
    pub const FULL: Capabilities = Capabilities {
        can_share: true,
        can_change_permissions: true,
        can_edit: true,
        can_delete: true,
    };

    /// View-only: the grant exists but carries no capability.
    pub const NONE: Capabilities = Capabilities {
        can_share: false,
        can_change_permissions: false,
        can_edit: false,
        can_delete: false,
    };

    #[must_use]
    pub const fn new(
        can_share: bool,
        can_change_permissions: bool,
        can_edit: bool,
        can_delete: bool,
    ) -> Self {
        Self {
            can_share,
            can_change_permissions,
            can_edit,
            can_delete,
        }
    }

    /// Returns whether the given capability is held.
    #[must_use]
    pub fn has(&self, capability: Capability) -> bool {
        match capability {
            Capability::CanShare => self.can_share,
            Capability::CanChangePermissions => self.can_change_permissions,
            Capability::CanEdit => self.can_edit,
            Capability::CanDelete => self.can_delete,
        }
    }

    /// Iterates over the capabilities that are held.
    pub fn granted(&self) -> impl Iterator<Item = Capability> + '_ {
        Capability::ALL.into_iter().filter(|cap| self.has(*cap))
    }

    /// Standing a project member has on a task of that project when no
    /// direct task grant exists.
    ///
    /// Sharing and permission management never inherit; delete follows edit.
    #[must_use]
    pub fn inherited_from_project(project: &Capabilities) -> Self {
        Self {
            can_share: false,
            can_change_permissions: false,
            can_edit: project.can_edit,
            can_delete: project.can_edit,
        }
    }

    /// Task grant written for a project member when a task is created under
    /// the project.
    ///
    /// Project-derived task access never exceeds edit level, so delete is
    /// mirrored from the project's edit capability.
    #[must_use]
    pub fn mirrored_from_project(project: &Capabilities) -> Self {
        Self {
            can_share: project.can_share,
            can_change_permissions: project.can_change_permissions,
            can_edit: project.can_edit,
            can_delete: project.can_edit,
        }
    }

    /// Applies a partial update; omitted fields keep their current value.
    #[must_use]
    pub fn apply(&self, patch: &CapabilityPatch) -> Self {
        Self {
            can_share: patch.can_share.unwrap_or(self.can_share),
            can_change_permissions: patch
                .can_change_permissions
                .unwrap_or(self.can_change_permissions),
            can_edit: patch.can_edit.unwrap_or(self.can_edit),
            can_delete: patch.can_delete.unwrap_or(self.can_delete),
        }
    }
}

impl fmt::Display for Capabilities {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.granted().map(|cap| cap.as_str()).collect();
        if names.is_empty() {
            f.write_str("view")
        } else {
            f.write_str(&names.join(","))
        }
    }
}

/// A partial capability update as sent by a sharing request.
///
/// `None` means "field not present in the request".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CapabilityPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub can_share: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub can_change_permissions: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub can_edit: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub can_delete: Option<bool>,
}

impl CapabilityPatch {
    /// Returns true if the request carried no capability field at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.can_share.is_none()
            && self.can_change_permissions.is_none()
            && self.can_edit.is_none()
            && self.can_delete.is_none()
    }

    /// Materializes a patch into a full capability set, defaulting omitted
    /// fields to `false`. Used when creating a grant.
    #[must_use]
    pub fn or_none(&self) -> Capabilities {
        Capabilities::NONE.apply(self)
    }
}

impl From<Capabilities> for CapabilityPatch {
    fn from(caps: Capabilities) -> Self {
        Self {
            can_share: Some(caps.can_share),
            can_change_permissions: Some(caps.can_change_permissions),
            can_edit: Some(caps.can_edit),
            can_delete: Some(caps.can_delete),
        }
    }
}
