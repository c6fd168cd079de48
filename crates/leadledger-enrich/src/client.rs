//! Enrichment provider HTTP client.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use leadledger_core::{Contact, EnrichField, EnrichedData};

use crate::error::{Error, Result};

/// How many times an email search is polled before giving up.
const SEARCH_ATTEMPTS: u32 = 5;
/// Pause between email search polls.
const SEARCH_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Client for an enrichment vendor's JSON API: email discovery, email
/// verification, and contact field enrichment.
#[derive(Debug, Clone)]
pub struct EnrichClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    poll_interval: Duration,
}

#[derive(Debug, Serialize)]
struct SearchRequest<'a> {
    firstname: &'a str,
    lastname: &'a str,
    domain: &'a str,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    success: bool,
    item: Option<SearchItem>,
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    email: Option<String>,
    status: Option<String>,
}

#[derive(Debug, Serialize)]
struct VerifyRequest<'a> {
    email: &'a str,
}

#[derive(Debug, Deserialize)]
struct VerifyResponse {
    #[serde(rename = "isValid", default)]
    is_valid: bool,
}

#[derive(Debug, Serialize)]
struct EnrichRequest<'a> {
    full_name: &'a str,
    company_name: Option<&'a str>,
    job_title: Option<&'a str>,
    fields: Vec<&'static str>,
}

#[derive(Debug, Deserialize)]
struct EnrichResponse {
    email: Option<String>,
    phone: Option<String>,
    linkedin_url: Option<String>,
    #[serde(default)]
    email_verified: bool,
}

impl EnrichClient {
    /// Create a client against the given API base URL.
    #[must_use]
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            api_key: api_key.into(),
            poll_interval: SEARCH_POLL_INTERVAL,
        }
    }

    /// Override the poll interval between email search attempts.
    #[must_use]
    pub const fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Find an email address from a name and a domain.
    ///
    /// The vendor resolves searches asynchronously: a pending search reports
    /// status `NONE` and is polled a bounded number of times before the
    /// search is treated as a miss.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the API reports a failure.
    pub async fn find_email(
        &self,
        first_name: &str,
        last_name: &str,
        domain: &str,
    ) -> Result<Option<String>> {
        let url = format!("{}/email-search", self.base_url);

        for attempt in 1..=SEARCH_ATTEMPTS {
            let response: SearchResponse = self
                .http
                .post(&url)
                .header("Authorization", &self.api_key)
                .json(&SearchRequest {
                    firstname: first_name,
                    lastname: last_name,
                    domain,
                })
                .send()
                .await?
                .json()
                .await?;

            if !response.success {
                let message = response.message.unwrap_or_else(|| "Unknown error".into());
                warn!(%message, "email search rejected");
                return Err(Error::Api(message));
            }

            match response.item {
                Some(SearchItem {
                    email: Some(email), ..
                }) => {
                    debug!(attempt, "email search hit");
                    return Ok(Some(email));
                }
                Some(SearchItem { status, .. }) if status.as_deref() == Some("NONE") => {
                    // Not resolved yet; poll again.
                    debug!(attempt, "email search pending");
                }
                _ => {
                    return Err(Error::InvalidResponse(
                        "email search reply carried no result".into(),
                    ));
                }
            }

            if attempt < SEARCH_ATTEMPTS {
                tokio::time::sleep(self.poll_interval).await;
            }
        }

        Ok(None)
    }

    /// Verify whether an email address is deliverable.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn verify_email(&self, email: &str) -> Result<bool> {
        let url = format!("{}/email-verification", self.base_url);

        let response: VerifyResponse = self
            .http
            .post(&url)
            .header("Authorization", &self.api_key)
            .json(&VerifyRequest { email })
            .send()
            .await?
            .json()
            .await?;

        Ok(response.is_valid)
    }

    /// Enrich the requested fields of a contact.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn enrich_contact(
        &self,
        contact: &Contact,
        fields: &[EnrichField],
    ) -> Result<EnrichedData> {
        let url = format!("{}/contact-enrichment", self.base_url);

        let response: EnrichResponse = self
            .http
            .post(&url)
            .header("Authorization", &self.api_key)
            .json(&EnrichRequest {
                full_name: &contact.full_name,
                company_name: contact.company_name.as_deref(),
                job_title: contact.job_title.as_deref(),
                fields: fields.iter().map(|f| f.as_str()).collect(),
            })
            .send()
            .await?
            .json()
            .await?;

        Ok(EnrichedData {
            email: response.email,
            phone: response.phone,
            linkedin_url: response.linkedin_url,
            email_verified: response.email_verified,
            source: "leadledger-enrich".into(),
        })
    }
}

impl leadledger_core::EmailFinder for EnrichClient {
    async fn find(
        &self,
        first_name: &str,
        last_name: &str,
        domain_or_company: &str,
    ) -> leadledger_core::Result<Option<String>> {
        Ok(self.find_email(first_name, last_name, domain_or_company).await?)
    }

    async fn verify(&self, email: &str) -> leadledger_core::Result<bool> {
        Ok(self.verify_email(email).await?)
    }
}

impl leadledger_core::EnrichmentProvider for EnrichClient {
    async fn enrich(
        &self,
        contact: &Contact,
        fields: &[EnrichField],
    ) -> leadledger_core::Result<EnrichedData> {
        Ok(self.enrich_contact(contact, fields).await?)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    fn client(server: &MockServer) -> EnrichClient {
        EnrichClient::new(server.base_url(), "test-key").with_poll_interval(Duration::ZERO)
    }

    #[tokio::test]
    async fn test_find_email_hit() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/email-search")
                .header("authorization", "test-key")
                .json_body_partial(r#"{"firstname": "Ada", "lastname": "Lovelace"}"#);
            then.status(200)
                .json_body(json!({"success": true, "item": {"email": "ada@example.com"}}));
        });

        let email = client(&server)
            .find_email("Ada", "Lovelace", "example.com")
            .await
            .unwrap();

        mock.assert();
        assert_eq!(email.as_deref(), Some("ada@example.com"));
    }

    #[tokio::test]
    async fn test_find_email_polls_until_found() {
        let server = MockServer::start();
        let pending = server.mock(|when, then| {
            when.method(POST).path("/email-search");
            then.status(200)
                .json_body(json!({"success": true, "item": {"status": "NONE"}}));
        });

        // All attempts stay pending: the search is a miss, not an error.
        let email = client(&server)
            .find_email("Ada", "Lovelace", "example.com")
            .await
            .unwrap();

        assert_eq!(pending.hits(), 5);
        assert!(email.is_none());
    }

    #[tokio::test]
    async fn test_find_email_api_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/email-search");
            then.status(200)
                .json_body(json!({"success": false, "message": "quota exceeded"}));
        });

        let err = client(&server)
            .find_email("Ada", "Lovelace", "example.com")
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Api(message) if message == "quota exceeded"));
    }

    #[tokio::test]
    async fn test_verify_email() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST)
                .path("/email-verification")
                .json_body_partial(r#"{"email": "ada@example.com"}"#);
            then.status(200).json_body(json!({"isValid": true}));
        });

        let is_valid = client(&server).verify_email("ada@example.com").await.unwrap();
        assert!(is_valid);
    }

    #[tokio::test]
    async fn test_enrich_contact_fields() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST)
                .path("/contact-enrichment")
                .json_body_partial(r#"{"fields": ["email", "phone"]}"#);
            then.status(200).json_body(json!({
                "email": "found@example.com",
                "phone": "+1 (555) 000-1111",
                "email_verified": true
            }));
        });

        let storage = leadledger_core::Storage::in_memory().await.unwrap();
        let account = storage
            .accounts()
            .create(
                &leadledger_core::NewAccount {
                    full_name: "Owner".into(),
                    email: "owner@example.com".into(),
                    password: "password123".into(),
                    company_name: None,
                    industry: None,
                    role: None,
                },
                100,
            )
            .await
            .unwrap();
        let contact = storage
            .contacts()
            .create(
                account.id,
                &leadledger_core::NewContact {
                    full_name: "Grace Hopper".into(),
                    ..leadledger_core::NewContact::default()
                },
            )
            .await
            .unwrap();

        let data = client(&server)
            .enrich_contact(&contact, &[EnrichField::Email, EnrichField::Phone])
            .await
            .unwrap();

        assert_eq!(data.email.as_deref(), Some("found@example.com"));
        assert_eq!(data.phone.as_deref(), Some("+1 (555) 000-1111"));
        assert!(data.email_verified);
    }
}
