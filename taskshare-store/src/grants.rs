//! Grant store: one generic repository over the task and project grant
//! tables.
//!
//! The author of a resource always holds [`Capabilities::FULL`]. Reads
//! overlay that virtual grant on whatever row exists, and writes refuse to
//! touch the author's row, so author capabilities stay permanent no matter
//! which caller reaches the store.

use crate::columns::{caps_at, millis, now, time_at, uuid_at};
use crate::error::{StoreError, StoreResult};
use crate::users::User;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};
use taskshare_types::{Capabilities, Resource, ResourceKind, UserId};
use tracing::debug;

/// One stored (or virtual author) grant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Grant {
    pub user_id: UserId,
    pub resource: Resource,
    pub capabilities: Capabilities,
    pub granted_at: DateTime<Utc>,
    /// True when `user_id` authored the resource.
    pub is_author: bool,
}

/// A grant joined with the user it belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Accessor {
    pub user_id: UserId,
    pub name: String,
    pub email: String,
    pub capabilities: Capabilities,
    pub granted_at: DateTime<Utc>,
    pub is_author: bool,
}

impl Accessor {
    fn from_parts(user: User, grant: Grant) -> Self {
        Self {
            user_id: user.id,
            name: user.name,
            email: user.email,
            capabilities: grant.capabilities,
            granted_at: grant.granted_at,
            is_author: grant.is_author,
        }
    }
}

/// Table names for one resource kind.
struct GrantTable {
    grants: &'static str,
    resources: &'static str,
    id: &'static str,
}

fn table(kind: ResourceKind) -> GrantTable {
    match kind {
        ResourceKind::Task => GrantTable {
            grants: "task_grants",
            resources: "tasks",
            id: "task_id",
        },
        ResourceKind::Project => GrantTable {
            grants: "project_grants",
            resources: "projects",
            id: "project_id",
        },
    }
}

/// Repository for `task_grants` and `project_grants`.
pub struct GrantStore;

impl GrantStore {
    /// Returns the author of `resource`, or `None` if it does not exist.
    pub fn author_of(conn: &Connection, resource: Resource) -> StoreResult<Option<UserId>> {
        let t = table(resource.kind());
        let sql = format!("SELECT author_id FROM {} WHERE {} = ?1", t.resources, t.id);
        let author = conn
            .query_row(&sql, params![resource.as_uuid().to_string()], |row| {
                uuid_at(row, 0)
            })
            .optional()?;
        Ok(author.map(UserId::from_uuid))
    }

    /// Returns `user`'s grant on `resource`, if any.
    ///
    /// The author always gets a full grant back, even without a row.
    pub fn get(conn: &Connection, user: UserId, resource: Resource) -> StoreResult<Option<Grant>> {
        let t = table(resource.kind());
        let sql = format!(
            "SELECT r.author_id, r.created_at,
                    g.can_share, g.can_change_permissions, g.can_edit, g.can_delete, g.granted_at
             FROM {resources} AS r
             LEFT JOIN {grants} AS g ON g.{id} = r.{id} AND g.user_id = ?1
             WHERE r.{id} = ?2",
            resources = t.resources,
            grants = t.grants,
            id = t.id,
        );

        let row = conn
            .query_row(
                &sql,
                params![user.to_string(), resource.as_uuid().to_string()],
                |row| {
                    let author = UserId::from_uuid(uuid_at(row, 0)?);
                    let created_at = time_at(row, 1)?;
                    let granted_at: Option<i64> = row.get(6)?;
                    let stored = match granted_at {
                        Some(_) => Some((caps_at(row, 2)?, time_at(row, 6)?)),
                        None => None,
                    };
                    Ok((author, created_at, stored))
                },
            )
            .optional()?;

        let Some((author, created_at, stored)) = row else {
            return Ok(None);
        };

        if author == user {
            let granted_at = stored.map(|(_, at)| at).unwrap_or(created_at);
            return Ok(Some(Grant {
                user_id: user,
                resource,
                capabilities: Capabilities::FULL,
                granted_at,
                is_author: true,
            }));
        }

        Ok(stored.map(|(capabilities, granted_at)| Grant {
            user_id: user,
            resource,
            capabilities,
            granted_at,
            is_author: false,
        }))
    }

    /// Lists every grant on `resource`, author first, then by grant time.
    ///
    /// If the author's row is missing a virtual full grant is included.
    pub fn list(conn: &Connection, resource: Resource) -> StoreResult<Vec<Grant>> {
        Ok(Self::list_accessors(conn, resource)?
            .into_iter()
            .map(|a| Grant {
                user_id: a.user_id,
                resource,
                capabilities: a.capabilities,
                granted_at: a.granted_at,
                is_author: a.is_author,
            })
            .collect())
    }

    /// Like [`GrantStore::list`], joined with each user's name and email.
    pub fn list_accessors(conn: &Connection, resource: Resource) -> StoreResult<Vec<Accessor>> {
        let t = table(resource.kind());
        let sql = format!(
            "SELECT u.user_id, u.name, u.email, u.created_at,
                    g.can_share, g.can_change_permissions, g.can_edit, g.can_delete, g.granted_at,
                    (u.user_id = r.author_id) AS is_author
             FROM {grants} AS g
             JOIN users AS u ON u.user_id = g.user_id
             JOIN {resources} AS r ON r.{id} = g.{id}
             WHERE g.{id} = ?1
             ORDER BY is_author DESC, g.granted_at ASC, u.name ASC",
            grants = t.grants,
            resources = t.resources,
            id = t.id,
        );

        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params![resource.as_uuid().to_string()], |row| {
            let user = User {
                id: UserId::from_uuid(uuid_at(row, 0)?),
                name: row.get(1)?,
                email: row.get(2)?,
                created_at: time_at(row, 3)?,
            };
            let is_author: bool = row.get(9)?;
            let grant = Grant {
                user_id: user.id,
                resource,
                capabilities: if is_author {
                    Capabilities::FULL
                } else {
                    caps_at(row, 4)?
                },
                granted_at: time_at(row, 8)?,
                is_author,
            };
            Ok(Accessor::from_parts(user, grant))
        })?;

        let mut result = Vec::new();
        for row in rows {
            result.push(row?);
        }

        if !result.iter().any(|a| a.is_author) {
            if let Some(author) = Self::virtual_author(conn, resource)? {
                result.insert(0, author);
            }
        }
        Ok(result)
    }

    /// Inserts a new grant. Fails with [`StoreError::Conflict`] if `user`
    /// already has one on `resource`; never updates an existing row.
    pub fn insert(
        conn: &Connection,
        user: UserId,
        resource: Resource,
        capabilities: Capabilities,
    ) -> StoreResult<Grant> {
        let t = table(resource.kind());
        let granted_at = now();
        let sql = format!(
            "INSERT INTO {grants} (
                user_id, {id}, can_share, can_change_permissions, can_edit, can_delete, granted_at
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            grants = t.grants,
            id = t.id,
        );

        conn.execute(
            &sql,
            params![
                user.to_string(),
                resource.as_uuid().to_string(),
                capabilities.can_share,
                capabilities.can_change_permissions,
                capabilities.can_edit,
                capabilities.can_delete,
                millis(granted_at),
            ],
        )
        .map_err(|e| StoreError::classify(e, format!("grant for user {user} on {resource}")))?;

        debug!(user_id = %user, %resource, %capabilities, "Inserted grant");

        let is_author = Self::author_of(conn, resource)? == Some(user);
        Ok(Grant {
            user_id: user,
            resource,
            capabilities,
            granted_at,
            is_author,
        })
    }

    /// Inserts several grants on one resource with a single prepared
    /// statement. The first failure aborts the batch; callers run this inside
    /// a transaction so nothing partial survives.
    pub fn insert_many(
        conn: &Connection,
        resource: Resource,
        grants: &[(UserId, Capabilities)],
    ) -> StoreResult<usize> {
        if grants.is_empty() {
            return Ok(0);
        }

        let t = table(resource.kind());
        let granted_at = millis(now());
        let sql = format!(
            "INSERT INTO {grants} (
                user_id, {id}, can_share, can_change_permissions, can_edit, can_delete, granted_at
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            grants = t.grants,
            id = t.id,
        );
        let mut stmt = conn.prepare(&sql)?;
        let resource_id = resource.as_uuid().to_string();

        for (user, caps) in grants {
            stmt.execute(params![
                user.to_string(),
                resource_id,
                caps.can_share,
                caps.can_change_permissions,
                caps.can_edit,
                caps.can_delete,
                granted_at,
            ])
            .map_err(|e| StoreError::classify(e, format!("grant for user {user} on {resource}")))?;
        }

        debug!(%resource, count = grants.len(), "Inserted grant batch");
        Ok(grants.len())
    }

    /// Replaces the capabilities of an existing grant.
    pub fn update(
        conn: &Connection,
        user: UserId,
        resource: Resource,
        capabilities: Capabilities,
    ) -> StoreResult<Grant> {
        Self::refuse_author(conn, user, resource)?;

        let t = table(resource.kind());
        let sql = format!(
            "UPDATE {grants} SET
                can_share = ?3, can_change_permissions = ?4, can_edit = ?5, can_delete = ?6
             WHERE user_id = ?1 AND {id} = ?2",
            grants = t.grants,
            id = t.id,
        );
        let changed = conn.execute(
            &sql,
            params![
                user.to_string(),
                resource.as_uuid().to_string(),
                capabilities.can_share,
                capabilities.can_change_permissions,
                capabilities.can_edit,
                capabilities.can_delete,
            ],
        )?;
        if changed == 0 {
            return Err(StoreError::NotFound(format!(
                "grant for user {user} on {resource}"
            )));
        }

        Self::get(conn, user, resource)?.ok_or_else(|| {
            StoreError::NotFound(format!("grant for user {user} on {resource}"))
        })
    }

    /// Removes a grant.
    pub fn delete(conn: &Connection, user: UserId, resource: Resource) -> StoreResult<()> {
        Self::refuse_author(conn, user, resource)?;

        let t = table(resource.kind());
        let sql = format!(
            "DELETE FROM {} WHERE user_id = ?1 AND {} = ?2",
            t.grants, t.id
        );
        let changed = conn.execute(
            &sql,
            params![user.to_string(), resource.as_uuid().to_string()],
        )?;
        if changed == 0 {
            return Err(StoreError::NotFound(format!(
                "grant for user {user} on {resource}"
            )));
        }
        Ok(())
    }

    fn refuse_author(conn: &Connection, user: UserId, resource: Resource) -> StoreResult<()> {
        if Self::author_of(conn, resource)? == Some(user) {
            return Err(StoreError::AuthorGrant(format!(
                "user {user} authored {resource}"
            )));
        }
        Ok(())
    }

    fn virtual_author(conn: &Connection, resource: Resource) -> StoreResult<Option<Accessor>> {
        let t = table(resource.kind());
        let sql = format!(
            "SELECT u.user_id, u.name, u.email, u.created_at, r.created_at
             FROM {resources} AS r
             JOIN users AS u ON u.user_id = r.author_id
             WHERE r.{id} = ?1",
            resources = t.resources,
            id = t.id,
        );
        let row = conn
            .query_row(&sql, params![resource.as_uuid().to_string()], |row| {
                let user = User {
                    id: UserId::from_uuid(uuid_at(row, 0)?),
                    name: row.get(1)?,
                    email: row.get(2)?,
                    created_at: time_at(row, 3)?,
                };
                let created_at = time_at(row, 4)?;
                Ok((user, created_at))
            })
            .optional()?;

        Ok(row.map(|(user, created_at)| {
            let grant = Grant {
                user_id: user.id,
                resource,
                capabilities: Capabilities::FULL,
                granted_at: created_at,
                is_author: true,
            };
            Accessor::from_parts(user, grant)
        }))
    }
}
