mod cancel;
pub mod config;
mod event;
mod runner;
mod subscription;

pub use cancel::{install_interrupt_handler, CancellationToken};
pub use config::{
    Addresses, ConfigLayer, WatchConfiguration, DEFAULT_CREDENTIAL_IDENTIFIER, DEFAULT_EMAIL_FROM,
    DEFAULT_POLL_INTERVAL_MS,
};
pub use event::{created_files, FileEvent};
pub use runner::{FolderWatcher, RunSummary};
pub use subscription::{
    EventCallback, EventSource, NotifyEventSource, NotifySubscription, Subscription,
    SubscriptionGuard,
};
