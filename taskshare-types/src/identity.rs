//! Caller and target identities.

use crate::ids::UserId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The authenticated caller, as supplied by the session layer.
///
/// The access engine trusts this value and never re-verifies credentials.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Identity {
    pub id: UserId,
    pub name: String,
    pub email: String,
}

impl Identity {
    pub fn new(id: UserId, name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            email: email.into(),
        }
    }
}

/// How a sharing request names the user who should receive access.
///
/// A request carries exactly one of id, name or email.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TargetUser {
    #[serde(rename = "userId")]
    Id(UserId),
    #[serde(rename = "userName")]
    Name(String),
    #[serde(rename = "userEmail")]
    Email(String),
}

impl From<UserId> for TargetUser {
    fn from(id: UserId) -> Self {
        Self::Id(id)
    }
}

impl fmt::Display for TargetUser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Id(id) => write!(f, "id={id}"),
            Self::Name(name) => write!(f, "name={name}"),
            Self::Email(email) => write!(f, "email={email}"),
        }
    }
}
