//! Contact model types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::account::AccountId;

/// Unique identifier for a contact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContactId(pub i64);

impl std::fmt::Display for ContactId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A lead or contact owned by an account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    /// Unique identifier.
    pub id: ContactId,
    /// Owning account.
    pub account_id: AccountId,
    /// Display name.
    pub full_name: String,
    /// Email address, if known.
    pub email: Option<String>,
    /// Phone number, if known.
    pub phone: Option<String>,
    /// Job title.
    pub job_title: Option<String>,
    /// Employer name.
    pub company_name: Option<String>,
    /// Industry.
    pub industry: Option<String>,
    /// Location (city/region).
    pub location: Option<String>,
    /// LinkedIn profile URL.
    pub linkedin_url: Option<String>,
    /// Free-form notes.
    pub notes: Option<String>,
    /// Arbitrary tags.
    pub tags: Vec<String>,
    /// Whether enrichment data has been merged in.
    pub is_enriched: bool,
    /// Whether the email address has been verified.
    pub email_verified: bool,
    /// Where the enrichment data came from.
    pub enrichment_source: Option<String>,
    /// When the contact was last enriched.
    pub enrichment_date: Option<DateTime<Utc>>,
    /// CRM the record is linked to ("salesforce", "hubspot").
    pub crm_source: Option<String>,
    /// Identifier of the record in the linked CRM.
    pub crm_id: Option<String>,
    /// When the record was last synced with the CRM.
    pub crm_synced_at: Option<DateTime<Utc>>,
    /// Whether an email has been sent to this contact.
    pub email_sent: bool,
    /// Last outreach interaction.
    pub last_interaction: Option<DateTime<Utc>>,
    /// When the contact was created.
    pub created_at: DateTime<Utc>,
}

/// Data required to create a contact.
#[derive(Debug, Clone, Default)]
pub struct NewContact {
    /// Display name.
    pub full_name: String,
    /// Email address.
    pub email: Option<String>,
    /// Phone number.
    pub phone: Option<String>,
    /// Job title.
    pub job_title: Option<String>,
    /// Employer name.
    pub company_name: Option<String>,
    /// Industry.
    pub industry: Option<String>,
    /// Location.
    pub location: Option<String>,
    /// LinkedIn profile URL.
    pub linkedin_url: Option<String>,
    /// Free-form notes.
    pub notes: Option<String>,
    /// Arbitrary tags.
    pub tags: Vec<String>,
}

/// Partial contact update; `None` fields are left unchanged.
#[derive(Debug, Clone, Default)]
pub struct ContactUpdate {
    /// New email address.
    pub email: Option<String>,
    /// New phone number.
    pub phone: Option<String>,
    /// New LinkedIn URL.
    pub linkedin_url: Option<String>,
    /// New notes.
    pub notes: Option<String>,
    /// Mark the contact as enriched.
    pub is_enriched: Option<bool>,
    /// Mark the email as verified.
    pub email_verified: Option<bool>,
    /// Record the enrichment source.
    pub enrichment_source: Option<String>,
    /// Record the enrichment time.
    pub enrichment_date: Option<DateTime<Utc>>,
    /// Link to a CRM.
    pub crm_source: Option<String>,
    /// CRM record id.
    pub crm_id: Option<String>,
    /// CRM sync time.
    pub crm_synced_at: Option<DateTime<Utc>>,
    /// Mark that an email was sent.
    pub email_sent: Option<bool>,
    /// Record an interaction time.
    pub last_interaction: Option<DateTime<Utc>>,
}

/// Filters for contact search; empty filters match everything.
#[derive(Debug, Clone, Default)]
pub struct ContactFilters {
    /// Substring match on job title.
    pub job_title: Option<String>,
    /// Substring match on employer name.
    pub company: Option<String>,
    /// Substring match on industry.
    pub industry: Option<String>,
    /// Substring match on location.
    pub location: Option<String>,
}
