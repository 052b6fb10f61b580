/// Transactional email provider client
///
/// Sends messages via a provider's HTTP API (any service accepting a JSON
/// `{from, to, subject, text}` POST with bearer auth). The provider URL and
/// key come from configuration; provider error bodies are logged but never
/// surfaced to API clients.

use async_trait::async_trait;
use serde::Serialize;
use tracing::{debug, error};

use super::{EmailMessage, MailError, Mailer};

/// Mailer backed by a transactional email provider's HTTP API
#[derive(Clone)]
pub struct HttpMailer {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    from: String,
}

#[derive(Serialize)]
struct SendRequest<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    text: &'a str,
}

impl HttpMailer {
    /// Creates a mailer for the given provider endpoint
    pub fn new(endpoint: String, api_key: String, from: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint,
            api_key,
            from,
        }
    }
}

#[async_trait]
impl Mailer for HttpMailer {
    async fn send(&self, message: EmailMessage) -> Result<(), MailError> {
        debug!(to = %message.to, subject = %message.subject, "Dispatching email");

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&SendRequest {
                from: &self.from,
                to: &message.to,
                subject: &message.subject,
                text: &message.body,
            })
            .send()
            .await
            .map_err(|e| MailError::DispatchFailed(format!("Provider unreachable: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let detail = response.text().await.unwrap_or_default();
            error!(%status, %detail, "Email provider rejected message");
            return Err(MailError::DispatchFailed(format!(
                "Provider returned {}",
                status
            )));
        }

        Ok(())
    }
}
