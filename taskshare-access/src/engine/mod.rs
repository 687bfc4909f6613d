//! The access engine service API.
//!
//! Every operation takes the caller's [`Identity`] as handed over by the
//! session layer and runs in a single store transaction: reads in a deferred
//! one, mutations in an immediate one. An error anywhere inside a mutation
//! rolls back all of its writes.

mod projects;
mod sharing;
mod tasks;

pub use projects::{NewProject, ProjectChanges};
pub use sharing::ShareRequest;
pub use tasks::{NewTask, TaskChanges, TaskDetail};

use crate::error::{AccessError, AccessResult};
use taskshare_store::{Database, StoreConfig, User, UserStore};
use taskshare_types::{Identity, TargetUser, UserId};
use tracing::{info, warn};

/// Access-controlled operations over tasks, projects and their grants.
#[derive(Clone)]
pub struct AccessEngine {
    db: Database,
}

impl AccessEngine {
    /// Wraps an open database.
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Opens the database described by `config`.
    pub fn open(config: &StoreConfig) -> AccessResult<Self> {
        Ok(Self::new(Database::open(config)?))
    }

    /// Opens a private in-memory engine (for testing).
    pub fn open_in_memory() -> AccessResult<Self> {
        Ok(Self::new(Database::open_in_memory()?))
    }

    // ── User directory ──────────────────────────────────────────

    /// Registers a new user. Names and emails are unique.
    pub fn register_user(&self, name: &str, email: &str) -> AccessResult<User> {
        let name = non_empty("name", name)?;
        let email = non_empty("email", email)?;

        let user = self.db.write(|tx| {
            UserStore::insert(tx, name, email).map_err(|err| match AccessError::from(err) {
                AccessError::Conflict(_) => {
                    AccessError::Conflict("user name or email already taken".to_string())
                }
                other => other,
            })
        })?;

        info!(user_id = %user.id, name = %user.name, "Registered user");
        Ok(user)
    }

    /// Looks up a user by id, name or email.
    pub fn find_user(&self, target: &TargetUser) -> AccessResult<User> {
        self.db
            .read(|tx| UserStore::find(tx, target))?
            .ok_or_else(|| AccessError::NotFound(format!("user {target}")))
    }

    /// The identity the session layer would hand over for `target`.
    pub fn identify(&self, target: &TargetUser) -> AccessResult<Identity> {
        Ok(self.find_user(target)?.identity())
    }
}

/// Trims `value` and rejects it if nothing is left.
pub(crate) fn non_empty<'a>(field: &'static str, value: &'a str) -> AccessResult<&'a str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AccessError::invalid(field, "must not be empty"));
    }
    Ok(trimmed)
}

/// Logs a denied operation before handing the result back.
pub(crate) fn audited<T>(
    operation: &'static str,
    user: UserId,
    result: AccessResult<T>,
) -> AccessResult<T> {
    if let Err(err) = &result {
        if err.is_denied() {
            warn!(operation, user_id = %user, error = %err, "Access denied");
        }
    }
    result
}
