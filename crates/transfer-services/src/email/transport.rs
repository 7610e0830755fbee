//! SMTP transport

use async_trait::async_trait;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use std::time::Duration;
use transfer_core::{Config, SmtpTlsMode};

use super::dispatcher::DeliveryError;

const SMTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Sends a fully built message. One attempt, no retry.
#[async_trait]
pub trait MailTransport: Send + Sync {
    async fn send(&self, message: Message) -> Result<(), DeliveryError>;
}

/// Authenticated relay built from the portal configuration. A new connection is
/// opened for every message.
#[derive(Clone)]
pub struct SmtpMailTransport {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpMailTransport {
    pub fn from_config(config: &Config) -> Result<Self, DeliveryError> {
        let host = config.smtp_host();
        let port = config.smtp_port();
        let credentials = Credentials::new(
            config.sender_email().to_string(),
            config.sender_password().to_string(),
        );

        let builder = match config.smtp_tls() {
            SmtpTlsMode::Implicit => AsyncSmtpTransport::<Tokio1Executor>::relay(host),
            SmtpTlsMode::StartTls => AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host),
        }
        .map_err(|e| DeliveryError::Transport(e.to_string()))?;

        let mailer = builder
            .port(port)
            .credentials(credentials)
            .timeout(Some(SMTP_TIMEOUT))
            .build();

        tracing::info!(
            host = %host,
            port = port,
            tls = ?config.smtp_tls(),
            "Email transport initialized"
        );

        Ok(Self { mailer })
    }
}

#[async_trait]
impl MailTransport for SmtpMailTransport {
    async fn send(&self, message: Message) -> Result<(), DeliveryError> {
        self.mailer
            .send(message)
            .await
            .map_err(|e| DeliveryError::Transport(e.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use transfer_core::PortalConfig;

    fn config(tls: &str) -> Config {
        let pairs = [
            ("SENDER_EMAIL", "portal@example.org"),
            ("APP_PASSWORD", "secret"),
            ("FACILITY_EMAIL", "ccm@example.org"),
            ("ACCESS_KEYS", "alpha"),
            ("SMTP_HOST", "smtp.example.org"),
            ("SMTP_TLS", tls),
        ];
        let portal = PortalConfig::from_lookup(|key| {
            pairs
                .iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| v.to_string())
        })
        .expect("config");
        Config(Box::new(portal))
    }

    #[tokio::test]
    async fn test_builds_for_both_tls_modes() {
        assert!(SmtpMailTransport::from_config(&config("implicit")).is_ok());
        assert!(SmtpMailTransport::from_config(&config("starttls")).is_ok());
    }
}
