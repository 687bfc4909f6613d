//! Access-control resolution and mutation engine for TaskShare.
//!
//! Users share tasks and projects under four independent capabilities
//! (`canShare`, `canChangePermissions`, `canEdit`, `canDelete`). This crate
//! decides who may do what:
//!
//! - [`resolver`] computes a user's standing on a task or project, falling
//!   back from a direct task grant to the owning project's grant
//! - [`authorizer`] validates grant creation, edits and revocations,
//!   including the view-only clamp for sharers without
//!   `canChangePermissions`
//! - [`ownership`] protects the author's grant and gates moving a task
//!   between projects
//! - [`propagation`] mirrors project membership into task grants when a
//!   task is created under a project
//! - [`AccessEngine`] ties them together over the store, one transaction
//!   per operation
//!
//! # Example
//!
//! ```
//! use taskshare_access::{AccessEngine, NewProject, NewTask, ShareRequest};
//! use taskshare_types::{Capabilities, TargetUser};
//!
//! let engine = AccessEngine::open_in_memory().unwrap();
//! let alice = engine.register_user("alice", "alice@example.com").unwrap().identity();
//! let bob = engine.register_user("bob", "bob@example.com").unwrap().identity();
//!
//! let project = engine.create_project(&alice, NewProject {
//!     name: "Garden".into(),
//!     description: None,
//! }).unwrap();
//! engine.grant_project_access(
//!     &alice,
//!     project.project.id,
//!     &ShareRequest::to(TargetUser::Name("bob".into()))
//!         .with_capabilities(Capabilities::new(false, false, true, false)),
//! ).unwrap();
//!
//! let task = engine.create_task(&alice, NewTask::named("Water plants").in_project(project.project.id)).unwrap();
//! let seen = engine.get_task(&bob, task.task.id).unwrap();
//! assert_eq!(seen.view.standing.capabilities(), Some(Capabilities::new(false, false, true, true)));
//! ```

pub mod authorizer;
pub mod completion;
mod engine;
mod error;
pub mod ownership;
pub mod propagation;
pub mod resolver;

pub use engine::{
    AccessEngine, NewProject, NewTask, ProjectChanges, ShareRequest, TaskChanges, TaskDetail,
};
pub use error::{AccessError, AccessResult, BAD_REQUEST};
pub use ownership::ProjectAssignment;
