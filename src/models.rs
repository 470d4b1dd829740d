use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Stat {
    pub id: String,
    pub user_id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub measurement_label: String,
    pub created_at: DateTime<Utc>,
}

/// One time-stamped observation recorded against a [`Stat`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StatItem {
    pub id: String,
    pub stat_id: String,
    pub user_id: String,
    pub date_of_entry: DateTime<Utc>,
    pub numeric_value: f64,
    #[serde(default)]
    pub note: Option<String>,
}

/// Everything the service persists, written to disk as one JSON document.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppData {
    #[serde(default)]
    pub users: BTreeMap<String, User>,
    #[serde(default)]
    pub stats: BTreeMap<String, Stat>,
    #[serde(default)]
    pub stat_items: BTreeMap<String, StatItem>,
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct UsernameRequest {
    pub username: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StatRequest {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub measurement_label: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StatItemRequest {
    pub date_of_entry: DateTime<Utc>,
    pub numeric_value: f64,
    #[serde(default)]
    pub note: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RangeQuery {
    pub from: Option<chrono::NaiveDate>,
    pub to: Option<chrono::NaiveDate>,
}

/// A user as shown to its owner; never carries the password hash.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserProfile {
    pub id: String,
    pub username: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

impl From<&User> for UserProfile {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            username: user.username.clone(),
            email: user.email.clone(),
            created_at: user.created_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SessionResponse {
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub user: UserProfile,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StatWithItems {
    #[serde(flatten)]
    pub stat: Stat,
    pub stat_items: Vec<StatItem>,
}

/// Body shape shared by every JSON endpoint.
#[derive(Debug, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub has_errors: bool,
    pub message: String,
    pub data: Option<T>,
}

impl<T> Envelope<T> {
    pub fn ok(message: impl Into<String>, data: T) -> Self {
        Self {
            has_errors: false,
            message: message.into(),
            data: Some(data),
        }
    }
}
