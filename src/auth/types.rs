//! Types for authentication and the logged-in identity

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Claims carried by the bearer token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    /// The user ID
    pub id: String,

    /// The user's email address
    pub email: String,

    /// Whether the user may use admin-only routes and actions
    #[serde(default)]
    pub is_admin: bool,

    /// Issued-at, seconds since the epoch
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,

    /// Expiry, seconds since the epoch
    pub exp: i64,
}

impl Identity {
    /// Check whether the token has expired at `now`
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.exp <= now.timestamp()
    }

    /// Check whether the token has expired
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }
}

/// Login request body
#[derive(Debug, Clone, Serialize)]
pub struct LoginCredentials {
    pub email: String,
    pub password: String,
}

/// User record returned by `/users/{id}` and `/users/login`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    /// The user ID
    pub id: String,

    /// The user's email address
    pub email: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub birthdate: Option<String>,

    #[serde(default)]
    pub email_verified: bool,

    #[serde(default)]
    pub is_admin: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub google_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl UserProfile {
    /// Name shown in the navigation bar
    pub fn display_name(&self) -> String {
        match (&self.first_name, &self.last_name, &self.username) {
            (Some(first), Some(last), _) => format!("{} {}", first, last),
            (Some(first), None, _) => first.clone(),
            (None, _, Some(username)) => username.clone(),
            _ => self.email.clone(),
        }
    }
}
