//! SQLite storage layer for TaskShare.
//!
//! Holds users, tasks, projects and the two grant tables. Each repository
//! is a stateless set of functions over a borrowed [`rusqlite::Connection`],
//! so callers compose several of them inside one transaction obtained from
//! [`Database::read`] or [`Database::write`].
//!
//! # Example
//!
//! ```
//! use taskshare_store::{Database, GrantStore, Project, ProjectStore, UserStore};
//! use taskshare_types::{Capabilities, Resource};
//!
//! let db = Database::open_in_memory().unwrap();
//! let grant = db
//!     .write(|tx| {
//!         let alice = UserStore::insert(tx, "alice", "alice@example.com")?;
//!         let project = Project::new(alice.id, "Garden", None);
//!         ProjectStore::insert(tx, &project)?;
//!         GrantStore::get(tx, alice.id, Resource::Project(project.id))
//!     })
//!     .unwrap();
//! assert_eq!(grant.map(|g| g.capabilities), Some(Capabilities::FULL));
//! ```

mod columns;
mod config;
mod database;
mod error;
mod grants;
mod projects;
mod schema;
mod tasks;
mod users;

pub use columns::now;
pub use config::{StoreConfig, IN_MEMORY};
pub use database::Database;
pub use error::{StoreError, StoreResult};
pub use grants::{Accessor, Grant, GrantStore};
pub use projects::{Project, ProjectStore, VisibleProject};
pub use schema::SCHEMA_VERSION;
pub use tasks::{Task, TaskStore, VisibleTask};
pub use users::{User, UserStore};

pub use rusqlite::Connection;
