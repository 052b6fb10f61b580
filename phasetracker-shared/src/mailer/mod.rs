/// Outbound email
///
/// The auth flows only ever hand a rendered message to a [`Mailer`]; which
/// provider actually delivers it is a deployment concern:
///
/// - [`HttpMailer`]: POSTs to a transactional email provider's HTTP API
/// - [`LogMailer`]: writes the message to the log (development fallback so
///   verification codes are visible without a provider account)
///
/// # Example
///
/// ```no_run
/// use phasetracker_shared::mailer::{EmailMessage, LogMailer, Mailer};
///
/// # async fn example() -> Result<(), phasetracker_shared::mailer::MailError> {
/// let mailer = LogMailer;
/// mailer
///     .send(EmailMessage {
///         to: "ops@example.com".to_string(),
///         subject: "Hello".to_string(),
///         body: "World".to_string(),
///     })
///     .await?;
/// # Ok(())
/// # }
/// ```

pub mod http;
pub mod log;
pub mod messages;

pub use http::HttpMailer;
pub use log::LogMailer;

use async_trait::async_trait;

/// Mailer error types
#[derive(Debug, thiserror::Error)]
pub enum MailError {
    /// Provider rejected or failed the request
    #[error("Email dispatch failed: {0}")]
    DispatchFailed(String),
}

/// A rendered outbound message
#[derive(Debug, Clone)]
pub struct EmailMessage {
    /// Recipient address
    pub to: String,

    /// Subject line
    pub subject: String,

    /// Plain-text body
    pub body: String,
}

/// Delivery seam for outbound email
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Dispatches one message
    async fn send(&self, message: EmailMessage) -> Result<(), MailError>;
}
