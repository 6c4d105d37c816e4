//! User and authentication request models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::UserId;

/// User role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Regular storefront customer.
    Customer,
    /// Administrative dashboard access.
    Admin,
}

/// An authenticated user's profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    /// Backend user ID.
    pub id: UserId,
    /// Email address (also the login name).
    pub email: String,
    /// Display name.
    pub name: String,
    /// Role.
    pub role: Role,
    /// Whether an admin has disabled the account.
    #[serde(default)]
    pub disabled: bool,
    /// Registration timestamp.
    pub created_at: DateTime<Utc>,
}

/// Login request body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    /// Email address.
    pub email: String,
    /// Password, sent once over TLS and never persisted client-side.
    pub password: String,
}

/// Registration request body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Registration {
    /// Email address.
    pub email: String,
    /// Display name.
    pub name: String,
    /// Password.
    pub password: String,
}
