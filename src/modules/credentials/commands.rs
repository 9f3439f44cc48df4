use super::model::PersistenceScope;
use super::prompt::Prompter;
use super::provider::CredentialProvider;
use super::store::SecretStore;
use crate::modules::error::{Result, WatchError};
use crate::modules::utils::logging::{format_sensitive, log_credential_event};

/// Management actions for a stored credential
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialAction {
    Set,
    Show,
    Forget,
}

impl CredentialAction {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "set" => Some(CredentialAction::Set),
            "show" => Some(CredentialAction::Show),
            "forget" => Some(CredentialAction::Forget),
            _ => None,
        }
    }
}

/// Run `action` for `identifier` against `store`.
///
/// Returns the line to show the user. `Set` always prompts, even when a
/// credential is already stored, and writes the result exactly once.
pub fn credential_command<S: SecretStore, P: Prompter>(
    action: CredentialAction,
    identifier: &str,
    store: &S,
    prompter: &mut P,
) -> Result<String> {
    match action {
        CredentialAction::Set => {
            let mut provider =
                CredentialProvider::connect(Ok(store), prompter, PersistenceScope::LocalMachine);
            let credential = provider.prompt(identifier)?;
            let store = provider.store().ok_or_else(|| {
                WatchError::StoreUnavailable("no secret store to save into".to_string())
            })?;
            store.store(
                identifier,
                &credential.username,
                &credential.secret,
                PersistenceScope::LocalMachine,
            )?;
            log_credential_event("set", identifier, true, None);
            Ok(format!("Credential '{}' saved.", identifier))
        }
        CredentialAction::Show => Ok(match store.lookup(identifier)? {
            Some(credential) => format!(
                "Credential '{}' is stored for user {}",
                identifier,
                format_sensitive(&credential.username)
            ),
            None => format!("No credential stored under '{}'.", identifier),
        }),
        CredentialAction::Forget => {
            store.forget(identifier)?;
            log_credential_event("forget", identifier, true, None);
            Ok(format!("Credential '{}' removed.", identifier))
        }
    }
}
