use std::collections::HashMap;
use std::sync::Mutex;

use keyring::Entry;
use log::debug;
use serde::{Deserialize, Serialize};

use super::model::{Credential, PersistenceScope, Secret};
use crate::modules::error::{Result, WatchError};
use crate::modules::utils::time::get_current_timestamp;

/// Account used to check that the platform store answers at all
const PROBE_ACCOUNT: &str = "__folder-notify-probe__";

/// Persisted credential repository
pub trait SecretStore {
    /// `Ok(None)` when nothing is stored under `identifier`
    fn lookup(&self, identifier: &str) -> Result<Option<Credential>>;

    fn store(
        &self,
        identifier: &str,
        username: &str,
        secret: &Secret,
        scope: PersistenceScope,
    ) -> Result<()>;

    /// Removing an identifier that is not stored succeeds
    fn forget(&self, identifier: &str) -> Result<()>;
}

impl<S: SecretStore + ?Sized> SecretStore for &S {
    fn lookup(&self, identifier: &str) -> Result<Option<Credential>> {
        (**self).lookup(identifier)
    }

    fn store(
        &self,
        identifier: &str,
        username: &str,
        secret: &Secret,
        scope: PersistenceScope,
    ) -> Result<()> {
        (**self).store(identifier, username, secret, scope)
    }

    fn forget(&self, identifier: &str) -> Result<()> {
        (**self).forget(identifier)
    }
}

/// Payload written to the keyring, one entry per identifier
#[derive(Serialize, Deserialize)]
pub struct StoredCredential {
    pub username: String,
    pub secret: Secret,
    pub scope: PersistenceScope,
    // When this entry was last written
    pub last_updated: u64,
}

impl StoredCredential {
    fn into_credential(self, identifier: &str) -> Credential {
        Credential::new(identifier, &self.username, self.secret)
    }
}

/// Secret store backed by the platform keyring.
///
/// Session-scoped credentials never reach the keyring; they live in memory
/// until the process exits.
pub struct KeyringSecretStore {
    service: String,
    session: Mutex<HashMap<String, StoredCredential>>,
}

impl KeyringSecretStore {
    /// Open the platform keyring for `service`.
    ///
    /// Fails with `StoreUnavailable` when no keyring backend answers.
    pub fn open(service: &str) -> Result<Self> {
        let probe = Entry::new(service, PROBE_ACCOUNT)
            .map_err(|e| WatchError::StoreUnavailable(e.to_string()))?;

        match probe.get_password() {
            Ok(_) | Err(keyring::Error::NoEntry) => {}
            Err(keyring::Error::NoStorageAccess(e)) => {
                return Err(WatchError::StoreUnavailable(e.to_string()))
            }
            Err(keyring::Error::PlatformFailure(e)) => {
                return Err(WatchError::StoreUnavailable(e.to_string()))
            }
            Err(e) => debug!("Keyring probe returned {}, treating store as available", e),
        }

        Ok(Self::without_probe(service))
    }

    /// Store that skips the availability probe; keyring errors surface on first use
    pub fn without_probe(service: &str) -> Self {
        Self {
            service: service.to_string(),
            session: Mutex::new(HashMap::new()),
        }
    }

    fn entry(&self, identifier: &str) -> std::result::Result<Entry, keyring::Error> {
        Entry::new(&self.service, identifier)
    }

    fn session_lookup(&self, identifier: &str) -> Option<Credential> {
        let session = self.session.lock().unwrap_or_else(|e| e.into_inner());
        session
            .get(identifier)
            .map(|stored| Credential::new(identifier, &stored.username, stored.secret.clone()))
    }
}

impl SecretStore for KeyringSecretStore {
    fn lookup(&self, identifier: &str) -> Result<Option<Credential>> {
        if let Some(credential) = self.session_lookup(identifier) {
            return Ok(Some(credential));
        }

        let lookup_error = |reason: String| WatchError::Lookup {
            identifier: identifier.to_string(),
            reason,
        };

        let entry = self.entry(identifier).map_err(|e| lookup_error(e.to_string()))?;

        match entry.get_password() {
            Ok(json) => {
                let stored: StoredCredential = serde_json::from_str(&json)
                    .map_err(|e| lookup_error(format!("unreadable entry: {}", e)))?;
                Ok(Some(stored.into_credential(identifier)))
            }
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(lookup_error(e.to_string())),
        }
    }

    fn store(
        &self,
        identifier: &str,
        username: &str,
        secret: &Secret,
        scope: PersistenceScope,
    ) -> Result<()> {
        let stored = StoredCredential {
            username: username.to_string(),
            secret: secret.clone(),
            scope,
            last_updated: get_current_timestamp(),
        };

        if scope == PersistenceScope::Session {
            let mut session = self.session.lock().unwrap_or_else(|e| e.into_inner());
            session.insert(identifier.to_string(), stored);
            return Ok(());
        }

        let persistence_error = |reason: String| WatchError::Persistence {
            identifier: identifier.to_string(),
            reason,
        };

        let json = serde_json::to_string(&stored)
            .map_err(|e| persistence_error(format!("failed to serialize: {}", e)))?;

        self.entry(identifier)
            .and_then(|entry| entry.set_password(&json))
            .map_err(|e| persistence_error(e.to_string()))
    }

    fn forget(&self, identifier: &str) -> Result<()> {
        let in_session = {
            let mut session = self.session.lock().unwrap_or_else(|e| e.into_inner());
            session.remove(identifier).is_some()
        };
        if in_session {
            return Ok(());
        }

        let entry = self.entry(identifier).map_err(|e| WatchError::Persistence {
            identifier: identifier.to_string(),
            reason: e.to_string(),
        })?;

        match entry.delete_password() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(WatchError::Persistence {
                identifier: identifier.to_string(),
                reason: format!("failed to delete: {}", e),
            }),
        }
    }
}
