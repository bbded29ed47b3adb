//! User Model

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use surrealdb::RecordId;
use surrealdb::sql::Datetime;

pub type UserId = RecordId;

/// User role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Shopkeeper,
    Admin,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Shopkeeper => "shopkeeper",
            Role::Admin => "admin",
        }
    }
}

impl FromStr for Role {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Role::User),
            "shopkeeper" => Ok(Role::Shopkeeper),
            "admin" => Ok(Role::Admin),
            _ => Err(()),
        }
    }
}

/// User model (password stored as Argon2 hash)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<UserId>,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub created_at: Datetime,
}

/// User representation safe to return to clients (no hash)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserView {
    pub id: Option<UserId>,
    pub username: String,
    pub email: String,
    pub role: Role,
}

impl From<User> for UserView {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            username: u.username,
            email: u.email,
            role: u.role,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}
