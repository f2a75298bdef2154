use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::labelled_enum;

/// The three mutually exclusive account roles.
///
/// Roles are a flat set: no role implies another's permissions. Every guarded
/// operation names the exact roles it admits and checks membership with
/// [`Role::is_in`]; never compare roles by declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    #[default]
    Farmer,
    Expert,
    Admin,
}

labelled_enum!(Role, "role", {
    Farmer => "FARMER",
    Expert => "EXPERT",
    Admin => "ADMIN",
});

impl Role {
    pub fn is_in(self, allowed: &[Role]) -> bool {
        allowed.contains(&self)
    }
}

/// A registered account (the principal behind a session token).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub username: String,
    /// PHC-formatted Argon2 hash. Never serialized.
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub role: Role,
    pub phone: Option<String>,
    pub is_verified: bool,
    pub created_at: DateTime<Utc>,
}

/// Insert payload for a new account; the password is already hashed.
#[derive(Debug, Clone, PartialEq)]
pub struct NewUser {
    pub email: String,
    pub username: String,
    pub password_hash: String,
    pub role: Role,
    pub phone: Option<String>,
}
