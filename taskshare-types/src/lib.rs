//! Core type definitions for TaskShare.
//!
//! This crate defines the plain types shared by the store and the access
//! engine:
//! - User, task and project identifiers (UUID v7)
//! - The two shareable resource kinds and a typed resource handle
//! - The four-capability grant record and its partial-update patch
//! - The authenticated caller identity handed in by the session layer
//! - A user's resolved standing (direct, inherited, none) on a resource
//!
//! Nothing here touches storage or performs authorization; see
//! `taskshare-store` and `taskshare-access` for that.

mod capability;
mod identity;
mod ids;
mod resource;
mod standing;

pub use capability::{Capabilities, Capability, CapabilityPatch};
pub use identity::{Identity, TargetUser};
pub use ids::{ProjectId, TaskId, UserId};
pub use resource::{Resource, ResourceKind};
pub use standing::Standing;

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in type operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid UUID: {0}")]
    InvalidUuid(#[from] uuid::Error),

    #[error("unknown capability: {0}")]
    UnknownCapability(String),
}
