//! Company model types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::account::AccountId;

/// Unique identifier for a company.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CompanyId(pub i64);

impl std::fmt::Display for CompanyId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An organization tracked by an account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Company {
    /// Unique identifier.
    pub id: CompanyId,
    /// Owning account.
    pub account_id: AccountId,
    /// Company name.
    pub name: String,
    /// Industry.
    pub industry: Option<String>,
    /// Website URL.
    pub website: Option<String>,
    /// Headcount bracket (e.g. "100-500").
    pub size: Option<String>,
    /// Location (city/region).
    pub location: Option<String>,
    /// Free-form description.
    pub description: Option<String>,
    /// Phone number.
    pub phone: Option<String>,
    /// CRM the record is linked to.
    pub crm_source: Option<String>,
    /// Identifier of the record in the linked CRM.
    pub crm_id: Option<String>,
    /// When the record was last synced with the CRM.
    pub crm_synced_at: Option<DateTime<Utc>>,
    /// When the company was created.
    pub created_at: DateTime<Utc>,
}

/// Data required to create a company.
#[derive(Debug, Clone, Default)]
pub struct NewCompany {
    /// Company name.
    pub name: String,
    /// Industry.
    pub industry: Option<String>,
    /// Website URL.
    pub website: Option<String>,
    /// Headcount bracket.
    pub size: Option<String>,
    /// Location.
    pub location: Option<String>,
    /// Free-form description.
    pub description: Option<String>,
    /// Phone number.
    pub phone: Option<String>,
}

/// Partial company update; `None` fields are left unchanged.
#[derive(Debug, Clone, Default)]
pub struct CompanyUpdate {
    /// New industry.
    pub industry: Option<String>,
    /// New website URL.
    pub website: Option<String>,
    /// New headcount bracket.
    pub size: Option<String>,
    /// New location.
    pub location: Option<String>,
    /// New description.
    pub description: Option<String>,
    /// New phone number.
    pub phone: Option<String>,
    /// Link to a CRM.
    pub crm_source: Option<String>,
    /// CRM record id.
    pub crm_id: Option<String>,
    /// CRM sync time.
    pub crm_synced_at: Option<DateTime<Utc>>,
}
