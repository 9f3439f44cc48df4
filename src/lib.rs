// First, declare the modules folder itself
mod modules;

// Re-export everything from modules for easier access
pub use modules::{credentials, email, error, utils, watcher};

// Re-export commonly used types
pub use modules::credentials::{Credential, CredentialProvider, KeyringSecretStore};
pub use modules::email::{LettreTransport, SmtpSettings, TransportSecurity};
pub use modules::error::{Result, WatchError};
pub use modules::watcher::{CancellationToken, FolderWatcher, NotifyEventSource, WatchConfiguration};

// Constants
pub const KEYRING_SERVICE: &str = "folder-notify";
