//! User directory.
//!
//! Names and emails are unique. Credentials live with the identity layer and
//! are not stored here.

use crate::columns::{millis, now, time_at, uuid_at};
use crate::error::{StoreError, StoreResult};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::{Deserialize, Serialize};
use taskshare_types::{Identity, TargetUser, UserId};

/// A registered user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// The identity the session layer would issue for this user.
    pub fn identity(&self) -> Identity {
        Identity::new(self.id, self.name.clone(), self.email.clone())
    }
}

const USER_COLUMNS: &str = "user_id, name, email, created_at";

/// Repository for the `users` table.
pub struct UserStore;

impl UserStore {
    /// Registers a user. Fails with [`StoreError::Conflict`] when the name or
    /// email is taken.
    pub fn insert(conn: &Connection, name: &str, email: &str) -> StoreResult<User> {
        let user = User {
            id: UserId::new(),
            name: name.to_string(),
            email: email.to_string(),
            created_at: now(),
        };

        conn.execute(
            "INSERT INTO users (user_id, name, email, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![
                user.id.to_string(),
                user.name,
                user.email,
                millis(user.created_at)
            ],
        )
        .map_err(|e| StoreError::classify(e, format!("user with name {name} or email {email}")))?;

        Ok(user)
    }

    pub fn get(conn: &Connection, id: UserId) -> StoreResult<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE user_id = ?1");
        Ok(conn
            .query_row(&sql, params![id.to_string()], row_to_user)
            .optional()?)
    }

    pub fn find_by_name(conn: &Connection, name: &str) -> StoreResult<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE name = ?1");
        Ok(conn.query_row(&sql, params![name], row_to_user).optional()?)
    }

    pub fn find_by_email(conn: &Connection, email: &str) -> StoreResult<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE email = ?1");
        Ok(conn.query_row(&sql, params![email], row_to_user).optional()?)
    }

    /// Looks up the user a sharing request points at.
    pub fn find(conn: &Connection, target: &TargetUser) -> StoreResult<Option<User>> {
        match target {
            TargetUser::Id(id) => Self::get(conn, *id),
            TargetUser::Name(name) => Self::find_by_name(conn, name),
            TargetUser::Email(email) => Self::find_by_email(conn, email),
        }
    }
}

fn row_to_user(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: UserId::from_uuid(uuid_at(row, 0)?),
        name: row.get(1)?,
        email: row.get(2)?,
        created_at: time_at(row, 3)?,
    })
}
