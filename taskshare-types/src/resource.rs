//! The two shareable resource kinds.

use crate::ids::{ProjectId, TaskId};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Kind of resource a grant can be attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    Task,
    Project,
}

impl ResourceKind {
    /// Returns the lowercase name of this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Task => "task",
            Self::Project => "project",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A typed handle to a task or a project.
///
/// Grant storage is identical for both kinds; this handle carries the kind
/// alongside the id so one code path serves both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "lowercase")]
pub enum Resource {
    Task(TaskId),
    Project(ProjectId),
}

impl Resource {
    /// Returns the kind of this resource.
    #[must_use]
    pub fn kind(&self) -> ResourceKind {
        match self {
            Self::Task(_) => ResourceKind::Task,
            Self::Project(_) => ResourceKind::Project,
        }
    }

    /// Returns the raw UUID of this resource.
    #[must_use]
    pub fn as_uuid(&self) -> Uuid {
        match self {
            Self::Task(id) => id.as_uuid(),
            Self::Project(id) => id.as_uuid(),
        }
    }
}

impl From<TaskId> for Resource {
    fn from(id: TaskId) -> Self {
        Self::Task(id)
    }
}

impl From<ProjectId> for Resource {
    fn from(id: ProjectId) -> Self {
        Self::Project(id)
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind(), self.as_uuid())
    }
}
