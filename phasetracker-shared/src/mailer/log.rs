/// Log-backed mailer
///
/// Used when no email provider is configured: messages (including the
/// verification codes) land in the server log instead of an inbox. Never
/// configure this in production.

use async_trait::async_trait;
use tracing::info;

use super::{EmailMessage, MailError, Mailer};

/// Mailer that writes messages to the log
#[derive(Debug, Clone, Copy, Default)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, message: EmailMessage) -> Result<(), MailError> {
        info!(
            to = %message.to,
            subject = %message.subject,
            body = %message.body,
            "Email (log mailer)"
        );

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_log_mailer_always_succeeds() {
        let mailer = LogMailer;
        let result = mailer
            .send(EmailMessage {
                to: "ops@example.com".to_string(),
                subject: "Test".to_string(),
                body: "Body".to_string(),
            })
            .await;

        assert!(result.is_ok());
    }
}
