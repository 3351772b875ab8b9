//! Send capability — the seam between the engine and whoever owns mail
//! credentials.
//!
//! The cascade only ever asks two things: "can I send right now" and
//! "send this". Token refresh, OAuth scopes, and account selection live
//! with the caller, behind this trait.

use async_trait::async_trait;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use tracing::debug;

use crate::error::SendError;

/// Opaque send capability supplied by the caller.
#[async_trait]
pub trait EmailSender: Send + Sync {
    /// Whether a send is currently possible (valid session, scopes, …).
    fn can_send(&self) -> bool;

    /// Compose and dispatch a minimal plain-text message.
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), SendError>;
}

// ── SMTP implementation ─────────────────────────────────────────────

/// SMTP connection settings, built from environment variables.
#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub from_address: String,
}

impl SmtpConfig {
    /// Build config from environment variables.
    /// Returns `None` if `UNSUB_SMTP_HOST` is not set (capability disabled).
    pub fn from_env() -> Option<Self> {
        let host = std::env::var("UNSUB_SMTP_HOST").ok()?;

        let port: u16 = std::env::var("UNSUB_SMTP_PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(587);

        let username = std::env::var("UNSUB_SMTP_USERNAME").unwrap_or_default();
        let password = std::env::var("UNSUB_SMTP_PASSWORD").unwrap_or_default();
        let from_address =
            std::env::var("UNSUB_FROM_ADDRESS").unwrap_or_else(|_| username.clone());

        Some(Self {
            host,
            port,
            username,
            password,
            from_address,
        })
    }
}

/// Send capability backed by an SMTP relay via lettre.
pub struct SmtpSender {
    config: SmtpConfig,
}

impl SmtpSender {
    pub fn new(config: SmtpConfig) -> Self {
        Self { config }
    }

    /// Build and send the message (blocking — run in spawn_blocking).
    fn send_blocking(
        config: &SmtpConfig,
        to: &str,
        subject: &str,
        body: &str,
    ) -> Result<(), SendError> {
        let creds = Credentials::new(config.username.clone(), config.password.clone());

        let transport = SmtpTransport::relay(&config.host)
            .map_err(|e| SendError::Transport(format!("SMTP relay error: {e}")))?
            .port(config.port)
            .credentials(creds)
            .build();

        let email = Message::builder()
            .from(
                config
                    .from_address
                    .parse()
                    .map_err(|e| SendError::InvalidAddress(format!("from address: {e}")))?,
            )
            .to(to
                .parse()
                .map_err(|e| SendError::InvalidAddress(format!("to address: {e}")))?)
            .subject(subject)
            .body(body.to_string())
            .map_err(|e| SendError::Transport(format!("failed to build email: {e}")))?;

        transport
            .send(&email)
            .map_err(|e| SendError::Transport(format!("SMTP send failed: {e}")))?;

        Ok(())
    }
}

#[async_trait]
impl EmailSender for SmtpSender {
    fn can_send(&self) -> bool {
        !self.config.host.is_empty() && !self.config.from_address.is_empty()
    }

    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), SendError> {
        let config = self.config.clone();
        let to = to.to_string();
        let subject = subject.to_string();
        let body = body.to_string();

        let relay = config.host.clone();
        tokio::task::spawn_blocking(move || {
            Self::send_blocking(&config, &to, &subject, &body)
        })
        .await
        .map_err(|e| SendError::Transport(format!("send task failed: {e}")))??;

        debug!(relay = %relay, "unsubscribe email dispatched");
        Ok(())
    }
}
