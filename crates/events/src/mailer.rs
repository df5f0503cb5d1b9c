//! Outbound mail transport.
//!
//! [`MailTransport`] is the seam the notification dispatcher sends
//! through; [`SmtpMailer`] is the production implementation over the
//! `lettre` async SMTP transport. Configuration is loaded from
//! environment variables; if `SMTP_HOST` is not set,
//! [`SmtpConfig::from_env`] returns `None` and no mailer should be
//! constructed.

use async_trait::async_trait;

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

/// Error type for mail delivery failures.
#[derive(Debug, thiserror::Error)]
pub enum MailError {
    /// SMTP transport-level failure (authentication, connection, etc.).
    #[error("SMTP transport error: {0}")]
    Transport(#[from] lettre::transport::smtp::Error),

    /// The recipient or sender address could not be parsed.
    #[error("Email address parse error: {0}")]
    Address(#[from] lettre::address::AddressError),

    /// The MIME message could not be assembled.
    #[error("Email build error: {0}")]
    Build(String),
}

// ---------------------------------------------------------------------------
// MailTransport
// ---------------------------------------------------------------------------

/// Fire-and-forget mail seam: `send(address, subject, body)`.
#[async_trait]
pub trait MailTransport: Send + Sync {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), MailError>;
}

// ---------------------------------------------------------------------------
// SmtpConfig
// ---------------------------------------------------------------------------

/// Default SMTP port (STARTTLS).
const DEFAULT_SMTP_PORT: u16 = 587;

/// Default sender address when `SMTP_FROM` is not set.
const DEFAULT_FROM_ADDRESS: &str = "support@deskpilot.local";

/// Configuration for the SMTP mailer.
#[derive(Debug, Clone)]
pub struct SmtpConfig {
    /// SMTP server hostname.
    pub smtp_host: String,
    /// SMTP server port (defaults to 587).
    pub smtp_port: u16,
    /// RFC 5322 "From" address.
    pub from_address: String,
    /// Optional SMTP username.
    pub smtp_user: Option<String>,
    /// Optional SMTP password.
    pub smtp_password: Option<String>,
}

impl SmtpConfig {
    /// Load configuration from environment variables.
    ///
    /// Returns `None` if `SMTP_HOST` is not set, signalling that mail
    /// delivery is not configured and should be skipped.
    ///
    /// | Variable        | Required | Default                   |
    /// |-----------------|----------|---------------------------|
    /// | `SMTP_HOST`     | yes      | —                         |
    /// | `SMTP_PORT`     | no       | `587`                     |
    /// | `SMTP_FROM`     | no       | `support@deskpilot.local` |
    /// | `SMTP_USER`     | no       | —                         |
    /// | `SMTP_PASSWORD` | no       | —                         |
    pub fn from_env() -> Option<Self> {
        let smtp_host = std::env::var("SMTP_HOST").ok()?;
        Some(Self {
            smtp_host,
            smtp_port: std::env::var("SMTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(DEFAULT_SMTP_PORT),
            from_address: std::env::var("SMTP_FROM")
                .unwrap_or_else(|_| DEFAULT_FROM_ADDRESS.to_string()),
            smtp_user: std::env::var("SMTP_USER").ok(),
            smtp_password: std::env::var("SMTP_PASSWORD").ok(),
        })
    }
}

// ---------------------------------------------------------------------------
// SmtpMailer
// ---------------------------------------------------------------------------

/// Sends plain-text notification emails via SMTP.
pub struct SmtpMailer {
    config: SmtpConfig,
}

impl SmtpMailer {
    /// Create a new mailer with the given configuration.
    pub fn new(config: SmtpConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl MailTransport for SmtpMailer {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), MailError> {
        use lettre::{
            message::header::ContentType, transport::smtp::authentication::Credentials,
            AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
        };

        let email = Message::builder()
            .from(self.config.from_address.parse()?)
            .to(to.parse()?)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body.to_string())
            .map_err(|e| MailError::Build(e.to_string()))?;

        let mut transport_builder =
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&self.config.smtp_host)?
                .port(self.config.smtp_port);

        if let (Some(user), Some(pass)) = (&self.config.smtp_user, &self.config.smtp_password) {
            transport_builder =
                transport_builder.credentials(Credentials::new(user.clone(), pass.clone()));
        }

        let mailer = transport_builder.build();
        mailer.send(email).await?;

        tracing::info!(to, subject, "Notification email sent");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// NoopMailer
// ---------------------------------------------------------------------------

/// Transport for deployments without SMTP configured: logs the would-be
/// delivery at debug level and reports success.
pub struct NoopMailer;

#[async_trait]
impl MailTransport for NoopMailer {
    async fn send(&self, to: &str, subject: &str, _body: &str) -> Result<(), MailError> {
        tracing::debug!(to, subject, "Mail transport not configured, dropping notification");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_env_returns_none_without_smtp_host() {
        // Ensure SMTP_HOST is not set in the test environment.
        std::env::remove_var("SMTP_HOST");
        assert!(SmtpConfig::from_env().is_none());
    }

    #[test]
    fn mail_error_display_build() {
        let err = MailError::Build("missing body".to_string());
        assert_eq!(err.to_string(), "Email build error: missing body");
    }

    #[test]
    fn mail_error_display_address() {
        let addr_err: Result<lettre::Address, _> = "not-an-email".parse();
        let err = MailError::Address(addr_err.unwrap_err());
        assert!(err.to_string().contains("Email address parse error"));
    }
}
