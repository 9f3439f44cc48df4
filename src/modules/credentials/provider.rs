use log::{debug, warn};

use super::model::{Credential, PersistenceScope, Secret};
use super::prompt::Prompter;
use super::store::SecretStore;
use crate::modules::error::{Result, WatchError};
use crate::modules::utils::logging::log_credential_event;

/// Anything that can turn a credential identifier into a credential
pub trait CredentialResolver {
    fn resolve(&mut self, identifier: &str) -> Option<Credential>;
}

/// Resolves credentials from the secret store, falling back to the user.
///
/// Each stage may fail on its own; resolution only fails when both the store
/// and the prompt come up empty.
pub struct CredentialProvider<S: SecretStore, P: Prompter> {
    store: Option<S>,
    prompter: P,
    scope: PersistenceScope,
}

impl<S: SecretStore, P: Prompter> CredentialProvider<S, P> {
    /// Build a provider from the outcome of opening the secret store.
    ///
    /// A store that failed to open is logged and the provider runs prompt-only.
    pub fn connect(store: Result<S>, prompter: P, scope: PersistenceScope) -> Self {
        let store = match store {
            Ok(store) => Some(store),
            Err(e) => {
                warn!("Secret store unavailable, credentials must be entered manually: {}", e);
                None
            }
        };
        Self {
            store,
            prompter,
            scope,
        }
    }

    pub fn store(&self) -> Option<&S> {
        self.store.as_ref()
    }

    fn lookup(&self, identifier: &str) -> Option<Credential> {
        let store = self.store.as_ref()?;
        match store.lookup(identifier) {
            Ok(Some(credential)) => {
                log_credential_event("lookup", identifier, true, None);
                Some(credential)
            }
            Ok(None) => {
                log_credential_event("lookup", identifier, false, Some("not stored"));
                None
            }
            Err(e) => {
                log_credential_event("lookup", identifier, false, Some(&e.to_string()));
                None
            }
        }
    }

    /// Ask the user for a credential. Empty input abandons the entry.
    pub fn prompt(&mut self, identifier: &str) -> Result<Credential> {
        let abandoned = || WatchError::InputAbandoned(identifier.to_string());

        let username = self.prompter.username(identifier).map_err(|e| {
            debug!("Reading username failed: {}", e);
            abandoned()
        })?;
        let username = username.trim();
        if username.is_empty() {
            return Err(abandoned());
        }

        let password = self.prompter.password(identifier).map_err(|e| {
            debug!("Reading password failed: {}", e);
            abandoned()
        })?;
        if password.is_empty() {
            return Err(abandoned());
        }

        Ok(Credential::new(identifier, username, Secret::new(password)))
    }

    /// Offer to save `credential` and write it when the user agrees.
    ///
    /// Returns whether a write succeeded.
    fn offer_persist(&mut self, credential: &Credential) -> bool {
        let Some(store) = self.store.as_ref() else {
            return false;
        };

        let question = format!(
            "Save credential '{}' to the secret store?",
            credential.identifier
        );
        match self.prompter.confirm(&question) {
            Ok(true) => {}
            Ok(false) => return false,
            Err(e) => {
                debug!("Reading confirmation failed: {}", e);
                return false;
            }
        }

        match store.store(
            &credential.identifier,
            &credential.username,
            &credential.secret,
            self.scope,
        ) {
            Ok(()) => {
                log_credential_event("persist", &credential.identifier, true, None);
                true
            }
            Err(e) => {
                log_credential_event(
                    "persist",
                    &credential.identifier,
                    false,
                    Some(&e.to_string()),
                );
                false
            }
        }
    }
}

impl<S: SecretStore, P: Prompter> CredentialResolver for CredentialProvider<S, P> {
    fn resolve(&mut self, identifier: &str) -> Option<Credential> {
        if let Some(credential) = self.lookup(identifier) {
            return Some(credential);
        }

        self.prompter
            .notice(&format!("No stored credential found for '{}'.", identifier));
        let credential = match self.prompt(identifier) {
            Ok(credential) => credential,
            Err(e) => {
                log_credential_event("prompt", identifier, false, Some(&e.to_string()));
                return None;
            }
        };
        log_credential_event("prompt", identifier, true, None);

        self.offer_persist(&credential);
        Some(credential)
    }
}
