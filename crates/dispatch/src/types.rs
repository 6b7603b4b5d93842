//! Shared value types parsed from every webhook delivery.
//!
//! Unlike the newtype identifiers in [`crate::identifiers`], these types carry
//! structured values deserialised straight from the GitHub payload. Only the
//! fields that every consumer relies on are modelled; type-specific payload
//! content stays in [`crate::Event::payload`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{RepositoryId, UserId};

// ---------------------------------------------------------------------------
// Accounts
// ---------------------------------------------------------------------------

/// The kind of GitHub account that performed an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UserType {
    User,
    Bot,
    Organization,
    /// Any account type GitHub introduces that this crate does not know about.
    #[serde(other)]
    Unknown,
}

/// A GitHub account as it appears in the `sender` and `owner` payload fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub login: String,
    #[serde(rename = "type", default = "default_user_type")]
    pub user_type: UserType,
}

fn default_user_type() -> UserType {
    UserType::User
}

impl User {
    /// Returns `true` if this account is a GitHub App or other bot account.
    pub fn is_bot(&self) -> bool {
        self.user_type == UserType::Bot
    }
}

// ---------------------------------------------------------------------------
// Repository
// ---------------------------------------------------------------------------

/// The repository a delivery relates to, from the `repository` payload field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Repository {
    pub id: RepositoryId,
    pub name: String,
    /// `"owner/repo"` form.
    pub full_name: String,
    #[serde(default)]
    pub private: bool,
    pub owner: User,
    #[serde(default)]
    pub default_branch: Option<String>,
}

impl Repository {
    /// Returns the login of the repository owner.
    pub fn owner_login(&self) -> &str {
        &self.owner.login
    }
}

// ---------------------------------------------------------------------------
// Time
// ---------------------------------------------------------------------------

/// A UTC wall-clock timestamp.
///
/// Wraps [`chrono::DateTime<Utc>`] so callers never depend on `chrono` types
/// directly; the underlying representation can change without affecting the
/// domain API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Returns the current UTC time as a [`Timestamp`].
    pub fn now() -> Self {
        Self(Utc::now())
    }

    /// Creates a [`Timestamp`] from a [`DateTime<Utc>`].
    pub fn from_utc(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }

    /// Returns the underlying [`DateTime<Utc>`].
    pub fn as_datetime(self) -> DateTime<Utc> {
        self.0
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_rfc3339())
    }
}
