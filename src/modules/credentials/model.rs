use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque secret that never shows up in `Debug` output or logs
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Borrow the plaintext, only for handing to the SMTP transport or the store
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(***)")
    }
}

/// SMTP login resolved from the secret store or typed in by the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credential {
    // Name the credential is stored under
    pub identifier: String,
    // SMTP login, also the default notification recipient
    pub username: String,
    pub secret: Secret,
}

impl Credential {
    pub fn new(identifier: &str, username: &str, secret: Secret) -> Self {
        Self {
            identifier: identifier.to_string(),
            username: username.to_string(),
            secret,
        }
    }
}

/// Durability tier for a saved credential
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum PersistenceScope {
    /// Kept for the lifetime of this process only
    Session,
    /// Written to the platform keyring
    #[default]
    LocalMachine,
}

impl PersistenceScope {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "session" => Some(PersistenceScope::Session),
            "local-machine" | "localmachine" => Some(PersistenceScope::LocalMachine),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_secret_is_redacted() {
        let credential = Credential::new("smtp", "alerts@example.com", Secret::new("hunter22"));
        let rendered = format!("{:?}", credential);

        assert!(rendered.contains("alerts@example.com"));
        assert!(!rendered.contains("hunter22"));
        assert_eq!(credential.secret.expose(), "hunter22");
    }

    #[test]
    fn test_scope_parsing() {
        assert_eq!(
            PersistenceScope::parse("session"),
            Some(PersistenceScope::Session)
        );
        assert_eq!(
            PersistenceScope::parse("Local-Machine"),
            Some(PersistenceScope::LocalMachine)
        );
        assert_eq!(PersistenceScope::parse("enterprise"), None);
        assert_eq!(PersistenceScope::default(), PersistenceScope::LocalMachine);
    }
}
