use std::time::Duration;

use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::transport::smtp::client::{Tls, TlsParameters};
use lettre::{Message, SmtpTransport, Transport};
use serde::{Deserialize, Serialize};

use super::templates::Notification;
use crate::modules::credentials::Credential;
use crate::modules::error::{Result, WatchError};

/// Default SMTP server used when none is configured
pub const DEFAULT_SMTP_HOST: &str = "smtp.gmail.com";
/// Default submission port (STARTTLS)
pub const DEFAULT_SMTP_PORT: u16 = 587;
/// Per-connection timeout for a single send attempt
const SMTP_TIMEOUT: Duration = Duration::from_secs(10);

/// How the SMTP connection is secured
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum TransportSecurity {
    /// Plain connection upgraded with STARTTLS; upgrade is mandatory
    #[default]
    #[serde(alias = "starttls")]
    StartTls,
    /// TLS from the first byte (usually port 465)
    Tls,
    /// No encryption at all
    None,
}

impl TransportSecurity {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "starttls" | "start-tls" => Some(TransportSecurity::StartTls),
            "tls" | "ssl" => Some(TransportSecurity::Tls),
            "none" | "plain" => Some(TransportSecurity::None),
            _ => None,
        }
    }
}

/// SMTP server parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SmtpSettings {
    pub host: String,
    pub port: u16,
    pub security: TransportSecurity,
}

impl Default for SmtpSettings {
    fn default() -> Self {
        Self {
            host: DEFAULT_SMTP_HOST.to_string(),
            port: DEFAULT_SMTP_PORT,
            security: TransportSecurity::default(),
        }
    }
}

/// Outbound mail channel. One call is one attempt; callers never retry.
pub trait MailTransport: Send + Sync {
    fn send(
        &self,
        notification: &Notification,
        settings: &SmtpSettings,
        credential: &Credential,
    ) -> Result<()>;
}

/// Transport sending through `lettre`'s blocking SMTP client
#[derive(Default)]
pub struct LettreTransport;

impl LettreTransport {
    fn build_message(notification: &Notification) -> std::result::Result<Message, String> {
        Message::builder()
            .from(
                notification
                    .from
                    .parse()
                    .map_err(|e| format!("Invalid from address: {}", e))?,
            )
            .to(notification
                .to
                .parse()
                .map_err(|e| format!("Invalid to address: {}", e))?)
            .subject(notification.subject.as_str())
            .header(ContentType::TEXT_PLAIN)
            .body(notification.body.clone())
            .map_err(|e| format!("Failed to create email: {}", e))
    }

    fn build_mailer(
        settings: &SmtpSettings,
        credential: &Credential,
    ) -> std::result::Result<SmtpTransport, String> {
        let tls = match settings.security {
            TransportSecurity::None => Tls::None,
            security => {
                let parameters = TlsParameters::builder(settings.host.clone())
                    .build()
                    .map_err(|e| format!("Failed to build TLS parameters: {}", e))?;
                if security == TransportSecurity::Tls {
                    Tls::Wrapper(parameters)
                } else {
                    Tls::Required(parameters)
                }
            }
        };

        Ok(SmtpTransport::builder_dangerous(settings.host.as_str())
            .port(settings.port)
            .tls(tls)
            .credentials(Credentials::new(
                credential.username.clone(),
                credential.secret.expose().to_string(),
            ))
            .timeout(Some(SMTP_TIMEOUT))
            .build())
    }
}

impl MailTransport for LettreTransport {
    fn send(
        &self,
        notification: &Notification,
        settings: &SmtpSettings,
        credential: &Credential,
    ) -> Result<()> {
        let delivery_error = |reason: String| WatchError::Delivery {
            path: notification.path.clone(),
            reason,
        };

        let email = Self::build_message(notification).map_err(delivery_error)?;
        let mailer = Self::build_mailer(settings, credential).map_err(delivery_error)?;

        mailer.send(&email).map(|_| ()).map_err(|e| {
            delivery_error(format!(
                "SMTP send via {}:{} failed: {}",
                settings.host, settings.port, e
            ))
        })
    }
}
