//! Provider traits for the external collaborators the dispatcher calls
//! after a successful charge.
//!
//! Concrete implementations live outside the core: HTTP clients in the
//! `leadledger-enrich` crate, stubs in tests. Provider latency and failures
//! are independent of the ledger; a provider error after a charge does not
//! roll the charge back.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::Result;
use crate::companies::{Company, NewCompany};
use crate::contacts::{Contact, ContactFilters, NewContact};
use crate::metering::EnrichField;

/// A prospect returned by a search provider, not yet saved as a contact.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Prospect {
    /// Display name.
    pub full_name: String,
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
    /// Email address, when the source already knows it.
    pub email: Option<String>,
}

/// Source of prospect search results.
pub trait ProspectSource {
    /// Search for prospects matching the filters.
    fn search(
        &self,
        filters: &ContactFilters,
    ) -> impl Future<Output = Result<Vec<Prospect>>> + Send;
}

/// Data returned by a contact enrichment provider.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EnrichedData {
    /// Discovered email address.
    pub email: Option<String>,
    /// Discovered phone number.
    pub phone: Option<String>,
    /// Discovered LinkedIn URL.
    pub linkedin_url: Option<String>,
    /// Whether the email was verified by the provider.
    pub email_verified: bool,
    /// Provider name recorded on the contact.
    pub source: String,
}

/// Contact field enrichment provider.
pub trait EnrichmentProvider {
    /// Enrich the requested fields of a contact.
    fn enrich(
        &self,
        contact: &Contact,
        fields: &[EnrichField],
    ) -> impl Future<Output = Result<EnrichedData>> + Send;
}

/// Email discovery and verification provider.
pub trait EmailFinder {
    /// Find an email address from a name and a domain or company name.
    fn find(
        &self,
        first_name: &str,
        last_name: &str,
        domain_or_company: &str,
    ) -> impl Future<Output = Result<Option<String>>> + Send;

    /// Verify whether an email address is deliverable.
    fn verify(&self, email: &str) -> impl Future<Output = Result<bool>> + Send;
}

/// Why an outreach message is being written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessagePurpose {
    /// First contact.
    Introduction,
    /// Nudge after no reply.
    FollowUp,
    /// Ask for a meeting.
    MeetingRequest,
    /// Thank the contact.
    ThankYou,
}

impl FromStr for MessagePurpose {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "introduction" => Ok(Self::Introduction),
            "follow_up" => Ok(Self::FollowUp),
            "meeting_request" => Ok(Self::MeetingRequest),
            "thank_you" => Ok(Self::ThankYou),
            other => Err(format!("Invalid message purpose: {other}")),
        }
    }
}

/// Voice of an outreach message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageTone {
    /// Business formal.
    Professional,
    /// Warm but businesslike.
    Friendly,
    /// Relaxed.
    Casual,
    /// Strictly formal.
    Formal,
}

impl FromStr for MessageTone {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "professional" => Ok(Self::Professional),
            "friendly" => Ok(Self::Friendly),
            "casual" => Ok(Self::Casual),
            "formal" => Ok(Self::Formal),
            other => Err(format!("Invalid message tone: {other}")),
        }
    }
}

/// Everything a message generator needs to write an outreach message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageRequest {
    /// Contact's display name.
    pub contact_full_name: String,
    /// Contact's job title.
    pub contact_job_title: Option<String>,
    /// Contact's employer.
    pub contact_company_name: Option<String>,
    /// Sender's display name.
    pub sender_full_name: String,
    /// Sender's company.
    pub sender_company_name: Option<String>,
    /// Sender's job role.
    pub sender_role: Option<String>,
    /// Why the message is being written.
    pub purpose: MessagePurpose,
    /// Voice of the message.
    pub tone: MessageTone,
    /// Extra instructions from the sender.
    pub custom_prompt: Option<String>,
}

/// AI outreach message generator.
pub trait MessageGenerator {
    /// Generate an outreach message.
    fn generate(&self, request: &MessageRequest) -> impl Future<Output = Result<String>> + Send;
}

/// Outbound email delivery.
pub trait EmailSender {
    /// Send a message to an address.
    fn send(
        &self,
        to: &str,
        subject: &str,
        body: &str,
    ) -> impl Future<Output = Result<()>> + Send;
}

/// A connected CRM system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CrmKind {
    /// Salesforce.
    Salesforce,
    /// HubSpot.
    Hubspot,
}

impl CrmKind {
    /// Name used in descriptions and record linkage.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Salesforce => "salesforce",
            Self::Hubspot => "hubspot",
        }
    }

    /// Display name.
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Salesforce => "Salesforce",
            Self::Hubspot => "HubSpot",
        }
    }
}

impl FromStr for CrmKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "salesforce" => Ok(Self::Salesforce),
            "hubspot" => Ok(Self::Hubspot),
            other => Err(format!("Invalid CRM source: {other}")),
        }
    }
}

/// Health of a CRM connection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrmConnection {
    /// Whether the connection works.
    pub connected: bool,
    /// Provider status message.
    pub message: String,
}

/// Result of exporting one record, index-aligned with the export request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrmExportRecord {
    /// Whether this record was accepted.
    pub success: bool,
    /// Identifier assigned by the CRM.
    pub remote_id: Option<String>,
}

/// A third-party CRM the dispatcher can import from and export to.
///
/// Field mapping is the connector's problem; the core only sees its own
/// models.
pub trait CrmConnector {
    /// Which CRM this connector talks to.
    fn kind(&self) -> CrmKind;

    /// Check the connection.
    fn test_connection(&self) -> impl Future<Output = Result<CrmConnection>> + Send;

    /// Pull contacts from the CRM.
    fn import_contacts(&self) -> impl Future<Output = Result<Vec<NewContact>>> + Send;

    /// Pull companies from the CRM.
    fn import_companies(&self) -> impl Future<Output = Result<Vec<NewCompany>>> + Send;

    /// Push contacts to the CRM.
    fn export_contacts(
        &self,
        contacts: &[Contact],
    ) -> impl Future<Output = Result<Vec<CrmExportRecord>>> + Send;

    /// Push companies to the CRM.
    fn export_companies(
        &self,
        companies: &[Company],
    ) -> impl Future<Output = Result<Vec<CrmExportRecord>>> + Send;
}

/// Built-in prospect source with a small fixed pool, used for development
/// and demos when no search provider is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct SampleProspects;

impl SampleProspects {
    fn pool() -> Vec<Prospect> {
        vec![
            Prospect {
                full_name: "Sarah Johnson".into(),
                job_title: Some("VP of Marketing".into()),
                company_name: Some("TechCorp Inc.".into()),
                industry: Some("Technology".into()),
                location: Some("San Francisco, CA".into()),
                ..Prospect::default()
            },
            Prospect {
                full_name: "Robert Miller".into(),
                job_title: Some("CTO".into()),
                company_name: Some("InnovateSoft".into()),
                industry: Some("Software".into()),
                location: Some("Austin, TX".into()),
                ..Prospect::default()
            },
            Prospect {
                full_name: "Jennifer Lee".into(),
                job_title: Some("Director of Sales".into()),
                company_name: Some("GlobalFinance Ltd.".into()),
                industry: Some("Finance".into()),
                location: Some("New York, NY".into()),
                email: Some("j.lee@globalfinance.example.com".into()),
                ..Prospect::default()
            },
        ]
    }

    fn matches(prospect: &Prospect, filters: &ContactFilters) -> bool {
        let contains = |value: &Option<String>, filter: &Option<String>| {
            filter.as_ref().is_none_or(|f| {
                value
                    .as_ref()
                    .is_some_and(|v| v.to_lowercase().contains(&f.to_lowercase()))
            })
        };

        contains(&prospect.job_title, &filters.job_title)
            && contains(&prospect.company_name, &filters.company)
            && contains(&prospect.industry, &filters.industry)
            && contains(&prospect.location, &filters.location)
    }
}

impl ProspectSource for SampleProspects {
    async fn search(&self, filters: &ContactFilters) -> Result<Vec<Prospect>> {
        Ok(Self::pool()
            .into_iter()
            .filter(|p| Self::matches(p, filters))
            .collect())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_sample_prospects_filtering() {
        let source = SampleProspects;

        let all = source.search(&ContactFilters::default()).await.unwrap();
        assert_eq!(all.len(), 3);

        let hits = source
            .search(&ContactFilters {
                job_title: Some("vp".into()),
                ..ContactFilters::default()
            })
            .await
            .unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].full_name, "Sarah Johnson");

        // Substring match: "cto" hits "CTO" and "Director of Sales".
        let substring = source
            .search(&ContactFilters {
                job_title: Some("cto".into()),
                ..ContactFilters::default()
            })
            .await
            .unwrap();
        assert_eq!(substring.len(), 2);

        let none = source
            .search(&ContactFilters {
                location: Some("Antarctica".into()),
                ..ContactFilters::default()
            })
            .await
            .unwrap();
        assert!(none.is_empty());
    }

    #[test]
    fn test_purpose_and_tone_parsing() {
        assert_eq!(
            "introduction".parse::<MessagePurpose>().unwrap(),
            MessagePurpose::Introduction
        );
        assert!("sales_pitch".parse::<MessagePurpose>().is_err());
        assert_eq!(
            "friendly".parse::<MessageTone>().unwrap(),
            MessageTone::Friendly
        );
        assert!("aggressive".parse::<MessageTone>().is_err());
    }

    #[test]
    fn test_crm_kind_parsing() {
        assert_eq!("salesforce".parse::<CrmKind>().unwrap(), CrmKind::Salesforce);
        assert_eq!("hubspot".parse::<CrmKind>().unwrap(), CrmKind::Hubspot);
        assert!("pipedrive".parse::<CrmKind>().is_err());
    }
}
