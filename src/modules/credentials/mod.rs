mod commands;
pub mod model;
mod prompt;
mod provider;
mod store;
#[cfg(test)]
pub(crate) mod testing;

pub use commands::{credential_command, CredentialAction};
pub use model::{Credential, PersistenceScope, Secret};
pub use prompt::{Prompter, TerminalPrompter};
pub use provider::{CredentialProvider, CredentialResolver};
pub use store::{KeyringSecretStore, SecretStore, StoredCredential};
