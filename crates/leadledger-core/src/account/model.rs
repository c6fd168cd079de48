//! Account model types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Unique identifier for an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AccountId(pub i64);

impl AccountId {
    /// Create a new account ID.
    #[must_use]
    pub const fn new(id: i64) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for AccountId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle status of an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountStatus {
    /// Account in good standing.
    #[default]
    Active,
    /// Account blocked from billable operations.
    Suspended,
}

impl AccountStatus {
    /// Database representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Suspended => "suspended",
        }
    }

    /// Parse the database representation; anything unknown is suspended.
    #[must_use]
    pub fn from_str_lossy(raw: &str) -> Self {
        if raw == "active" {
            Self::Active
        } else {
            Self::Suspended
        }
    }
}

/// A tenant account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    /// Unique identifier.
    pub id: AccountId,
    /// Display name.
    pub full_name: String,
    /// Email address (unique, stored lowercase).
    pub email: String,
    /// Company the account holder works for.
    pub company_name: Option<String>,
    /// Industry of the account holder.
    pub industry: Option<String>,
    /// Job role of the account holder.
    pub role: Option<String>,
    /// Current credit balance. Owned by the ledger; never negative.
    pub credits: i64,
    /// Lifecycle status.
    pub status: AccountStatus,
    /// Whether the email address has been verified.
    pub verified: bool,
    /// When the account was created.
    pub created_at: DateTime<Utc>,
}

/// Data required to create an account at signup.
#[derive(Debug, Clone)]
pub struct NewAccount {
    /// Display name.
    pub full_name: String,
    /// Email address.
    pub email: String,
    /// Plaintext password; hashed before storage.
    pub password: String,
    /// Company the account holder works for.
    pub company_name: Option<String>,
    /// Industry of the account holder.
    pub industry: Option<String>,
    /// Job role of the account holder.
    pub role: Option<String>,
}

/// Partial profile update; `None` fields are left unchanged.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    /// New display name.
    pub full_name: Option<String>,
    /// New company name.
    pub company_name: Option<String>,
    /// New industry.
    pub industry: Option<String>,
    /// New job role.
    pub role: Option<String>,
}
