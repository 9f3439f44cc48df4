use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::modules::credentials::{Credential, PersistenceScope};
use crate::modules::email::{SmtpSettings, TransportSecurity, DEFAULT_SMTP_HOST, DEFAULT_SMTP_PORT};
use crate::modules::error::{Result, WatchError};
use crate::modules::utils::io::is_valid_email;

/// Sender used when none is configured
pub const DEFAULT_EMAIL_FROM: &str = "noreply@folder-notify.local";
/// Identifier the SMTP credential is stored under by default
pub const DEFAULT_CREDENTIAL_IDENTIFIER: &str = "folder-notify-smtp";
/// How often the wait loop checks for cancellation
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 1000;

/// Immutable settings for one watcher run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchConfiguration {
    /// Directory watched recursively.
    pub root: PathBuf,

    /// Explicit sender; `DEFAULT_EMAIL_FROM` when unset.
    pub email_from: Option<String>,

    /// Explicit recipient; the credential's username when unset.
    pub email_to: Option<String>,

    pub smtp: SmtpSettings,

    /// Name of the SMTP credential in the secret store.
    pub credential_identifier: String,

    pub poll_interval: Duration,

    /// Where a newly entered credential is saved if the user agrees.
    pub persistence_scope: PersistenceScope,
}

/// Sender and recipient after defaults are applied
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Addresses {
    pub from: String,
    pub to: String,
}

impl WatchConfiguration {
    /// Configuration with every default applied.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            email_from: None,
            email_to: None,
            smtp: SmtpSettings::default(),
            credential_identifier: DEFAULT_CREDENTIAL_IDENTIFIER.to_string(),
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
            persistence_scope: PersistenceScope::default(),
        }
    }

    /// Set the sender address.
    pub fn with_from(mut self, from: impl Into<String>) -> Self {
        self.email_from = Some(from.into());
        self
    }

    /// Set the recipient address.
    pub fn with_to(mut self, to: impl Into<String>) -> Self {
        self.email_to = Some(to.into());
        self
    }

    /// Set the SMTP server.
    pub fn with_smtp(mut self, smtp: SmtpSettings) -> Self {
        self.smtp = smtp;
        self
    }

    /// Set the credential identifier.
    pub fn with_credential(mut self, identifier: impl Into<String>) -> Self {
        self.credential_identifier = identifier.into();
        self
    }

    /// Set the cancellation poll interval.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Apply address defaults against the resolved credential.
    pub fn resolve_addresses(&self, credential: &Credential) -> Addresses {
        Addresses {
            from: self
                .email_from
                .clone()
                .unwrap_or_else(|| DEFAULT_EMAIL_FROM.to_string()),
            to: self
                .email_to
                .clone()
                .unwrap_or_else(|| credential.username.clone()),
        }
    }

    /// Check the configuration and make the root absolute.
    pub fn validate(mut self) -> Result<Self> {
        if !self.root.is_dir() {
            return Err(WatchError::Config(format!(
                "watch path {} is not an existing directory",
                self.root.display()
            )));
        }
        self.root = self.root.canonicalize().map_err(|e| {
            WatchError::Config(format!("cannot resolve {}: {}", self.root.display(), e))
        })?;

        for (label, address) in [("sender", &self.email_from), ("recipient", &self.email_to)] {
            if let Some(address) = address {
                if !is_valid_email(address) {
                    return Err(WatchError::Config(format!(
                        "invalid {} address '{}'",
                        label, address
                    )));
                }
            }
        }

        if self.smtp.host.trim().is_empty() {
            return Err(WatchError::Config("SMTP host cannot be empty".to_string()));
        }
        if self.smtp.port == 0 {
            return Err(WatchError::Config("SMTP port must be non-zero".to_string()));
        }
        if self.credential_identifier.trim().is_empty() {
            return Err(WatchError::Config(
                "credential identifier cannot be empty".to_string(),
            ));
        }
        if self.poll_interval.is_zero() {
            return Err(WatchError::Config(
                "poll interval must be non-zero".to_string(),
            ));
        }

        Ok(self)
    }
}

/// One source of settings (config file or command line); every field optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigLayer {
    pub root: Option<PathBuf>,
    pub email_from: Option<String>,
    pub email_to: Option<String>,
    pub smtp_host: Option<String>,
    pub smtp_port: Option<u16>,
    pub security: Option<TransportSecurity>,
    pub credential: Option<String>,
    pub poll_interval_ms: Option<u64>,
    pub persist: Option<PersistenceScope>,
}

impl ConfigLayer {
    /// Read a JSON config file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        serde_json::from_str(&contents)
            .map_err(|e| WatchError::Config(format!("{}: {}", path.display(), e)))
    }

    /// Combine two layers; values set in `top` win.
    pub fn overlay(self, top: ConfigLayer) -> ConfigLayer {
        ConfigLayer {
            root: top.root.or(self.root),
            email_from: top.email_from.or(self.email_from),
            email_to: top.email_to.or(self.email_to),
            smtp_host: top.smtp_host.or(self.smtp_host),
            smtp_port: top.smtp_port.or(self.smtp_port),
            security: top.security.or(self.security),
            credential: top.credential.or(self.credential),
            poll_interval_ms: top.poll_interval_ms.or(self.poll_interval_ms),
            persist: top.persist.or(self.persist),
        }
    }

    /// Fill in defaults and validate.
    pub fn build(self) -> Result<WatchConfiguration> {
        let root = self
            .root
            .ok_or_else(|| WatchError::Config("no watch path given".to_string()))?;

        let configuration = WatchConfiguration {
            root,
            email_from: self.email_from,
            email_to: self.email_to,
            smtp: SmtpSettings {
                host: self
                    .smtp_host
                    .unwrap_or_else(|| DEFAULT_SMTP_HOST.to_string()),
                port: self.smtp_port.unwrap_or(DEFAULT_SMTP_PORT),
                security: self.security.unwrap_or_default(),
            },
            credential_identifier: self
                .credential
                .unwrap_or_else(|| DEFAULT_CREDENTIAL_IDENTIFIER.to_string()),
            poll_interval: Duration::from_millis(
                self.poll_interval_ms.unwrap_or(DEFAULT_POLL_INTERVAL_MS),
            ),
            persistence_scope: self.persist.unwrap_or_default(),
        };

        configuration.validate()
    }
}
