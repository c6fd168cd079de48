//! AI message writing and email delivery client.

use serde::{Deserialize, Serialize};
use tracing::debug;

use leadledger_core::{MessageGenerator, MessageRequest};

use crate::error::{Error, Result};

/// Client for an AI writing service that drafts outreach messages and
/// relays finished emails.
#[derive(Debug, Clone)]
pub struct WriterClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    message: Option<String>,
    error: Option<String>,
}

#[derive(Debug, Serialize)]
struct SendRequest<'a> {
    to: &'a str,
    subject: &'a str,
    body: &'a str,
}

#[derive(Debug, Deserialize)]
struct SendResponse {
    #[serde(default)]
    sent: bool,
    error: Option<String>,
}

impl WriterClient {
    /// Create a client against the given API base URL.
    #[must_use]
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }

    /// Draft an outreach message for the given request.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the service reports one.
    pub async fn generate_message(&self, request: &MessageRequest) -> Result<String> {
        let url = format!("{}/generate-message", self.base_url);

        let response: GenerateResponse = self
            .http
            .post(&url)
            .header("Authorization", &self.api_key)
            .json(request)
            .send()
            .await?
            .json()
            .await?;

        if let Some(error) = response.error {
            return Err(Error::Api(error));
        }
        response.message.map_or_else(
            || {
                Err(Error::InvalidResponse(
                    "generate reply carried no message".into(),
                ))
            },
            |message| {
                debug!(len = message.len(), "message drafted");
                Ok(message)
            },
        )
    }

    /// Relay a finished email to an address.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the relay refuses the email.
    pub async fn send_email(&self, to: &str, subject: &str, body: &str) -> Result<()> {
        let url = format!("{}/send-email", self.base_url);

        let response: SendResponse = self
            .http
            .post(&url)
            .header("Authorization", &self.api_key)
            .json(&SendRequest { to, subject, body })
            .send()
            .await?
            .json()
            .await?;

        if response.sent {
            Ok(())
        } else {
            Err(Error::Api(
                response.error.unwrap_or_else(|| "email not sent".into()),
            ))
        }
    }
}

impl MessageGenerator for WriterClient {
    async fn generate(&self, request: &MessageRequest) -> leadledger_core::Result<String> {
        Ok(self.generate_message(request).await?)
    }
}

impl leadledger_core::EmailSender for WriterClient {
    async fn send(&self, to: &str, subject: &str, body: &str) -> leadledger_core::Result<()> {
        Ok(self.send_email(to, subject, body).await?)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use leadledger_core::{MessagePurpose, MessageTone};
    use serde_json::json;

    fn request() -> MessageRequest {
        MessageRequest {
            contact_full_name: "Grace Hopper".into(),
            contact_job_title: Some("Rear Admiral".into()),
            contact_company_name: Some("US Navy".into()),
            sender_full_name: "Ada Lovelace".into(),
            sender_company_name: Some("Analytical Engines".into()),
            sender_role: Some("Founder".into()),
            purpose: MessagePurpose::Introduction,
            tone: MessageTone::Professional,
            custom_prompt: None,
        }
    }

    #[tokio::test]
    async fn test_generate_message() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/generate-message")
                .header("authorization", "test-key")
                .json_body_partial(r#"{"purpose": "introduction", "tone": "professional"}"#);
            then.status(200)
                .json_body(json!({"message": "Dear Grace, ..."}));
        });

        let client = WriterClient::new(server.base_url(), "test-key");
        let message = client.generate_message(&request()).await.unwrap();

        mock.assert();
        assert_eq!(message, "Dear Grace, ...");
    }

    #[tokio::test]
    async fn test_generate_message_service_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/generate-message");
            then.status(200).json_body(json!({"error": "model overloaded"}));
        });

        let client = WriterClient::new(server.base_url(), "test-key");
        let err = client.generate_message(&request()).await.unwrap_err();

        assert!(matches!(err, Error::Api(message) if message == "model overloaded"));
    }

    #[tokio::test]
    async fn test_send_email() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/send-email")
                .json_body_partial(r#"{"to": "grace@example.com"}"#);
            then.status(200).json_body(json!({"sent": true}));
        });

        let client = WriterClient::new(server.base_url(), "test-key");
        client
            .send_email("grace@example.com", "Hello", "Body")
            .await
            .unwrap();

        mock.assert();
    }

    #[tokio::test]
    async fn test_send_email_refused() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/send-email");
            then.status(200)
                .json_body(json!({"sent": false, "error": "recipient blocked"}));
        });

        let client = WriterClient::new(server.base_url(), "test-key");
        let err = client
            .send_email("grace@example.com", "Hello", "Body")
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Api(message) if message == "recipient blocked"));
    }
}
