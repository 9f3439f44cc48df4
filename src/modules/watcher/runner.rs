use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use log::{debug, error, info, warn};

use super::cancel::CancellationToken;
use super::config::{Addresses, WatchConfiguration};
use super::event::FileEvent;
use super::subscription::{EventCallback, EventSource, SubscriptionGuard};
use crate::modules::credentials::{Credential, CredentialResolver};
use crate::modules::email::{MailTransport, Notification, SmtpSettings};
use crate::modules::error::{Result, WatchError};
use crate::modules::utils::logging::{format_sensitive, log_delivery_event};

/// Counts of delivery attempts made during a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub delivered: usize,
    pub failed: usize,
    pub uptime: Duration,
}

#[derive(Default)]
struct DeliveryCounters {
    delivered: AtomicUsize,
    failed: AtomicUsize,
}

/// Everything a callback needs to send one notification. Read-only once built.
struct DeliveryContext<T: MailTransport> {
    transport: Arc<T>,
    smtp: SmtpSettings,
    credential: Credential,
    addresses: Addresses,
    counters: DeliveryCounters,
}

impl<T: MailTransport> DeliveryContext<T> {
    /// One send attempt for one event. Failures are logged, never propagated.
    fn deliver(&self, event: FileEvent) {
        debug!("File created: {}", event.path.display());
        let notification =
            Notification::for_created_file(&event, &self.addresses.from, &self.addresses.to);

        match self
            .transport
            .send(&notification, &self.smtp, &self.credential)
        {
            Ok(()) => {
                self.counters.delivered.fetch_add(1, Ordering::SeqCst);
                log_delivery_event(&event.path, &self.addresses.to, true, None);
            }
            Err(e) => {
                self.counters.failed.fetch_add(1, Ordering::SeqCst);
                log_delivery_event(&event.path, &self.addresses.to, false, Some(&e.to_string()));
            }
        }
    }
}

/// Startup log line naming where notifications go, with both addresses masked
fn describe_route(config: &WatchConfiguration, addresses: &Addresses) -> String {
    format!(
        "Notifications for {} go from {} to {}",
        config.root.display(),
        format_sensitive(&addresses.from),
        format_sensitive(&addresses.to)
    )
}

/// Watches a folder and emails a notification for every new file
pub struct FolderWatcher<E: EventSource, T: MailTransport + 'static> {
    source: E,
    transport: Arc<T>,
}

impl<E: EventSource, T: MailTransport + 'static> FolderWatcher<E, T> {
    pub fn new(source: E, transport: Arc<T>) -> Self {
        Self { source, transport }
    }

    /// Run until `cancel` fires.
    ///
    /// Returns early with an error when no credential can be resolved or the
    /// subscription cannot be registered. The subscription is released on
    /// every path out of the wait loop.
    pub fn run<R: CredentialResolver>(
        &mut self,
        config: &WatchConfiguration,
        resolver: &mut R,
        cancel: &CancellationToken,
    ) -> Result<RunSummary> {
        let started = Instant::now();

        let credential = match resolver.resolve(&config.credential_identifier) {
            Some(credential) => credential,
            None => {
                let err = WatchError::CredentialUnavailable(config.credential_identifier.clone());
                error!("{}", err);
                return Err(err);
            }
        };

        let addresses = config.resolve_addresses(&credential);
        info!("{}", describe_route(config, &addresses));

        let context = Arc::new(DeliveryContext {
            transport: Arc::clone(&self.transport),
            smtp: config.smtp.clone(),
            credential,
            addresses,
            counters: DeliveryCounters::default(),
        });

        let callback_context = Arc::clone(&context);
        let callback: EventCallback =
            Arc::new(move |event: FileEvent| callback_context.deliver(event));

        let handle = match self.source.subscribe(&config.root, true, callback) {
            Ok(handle) => handle,
            Err(e) => {
                error!("{}", e);
                return Err(e);
            }
        };
        let mut guard = SubscriptionGuard::new(handle);

        info!(
            "Watching {} for new files (poll interval {:?})",
            config.root.display(),
            config.poll_interval
        );

        while !cancel.is_cancelled() {
            thread::sleep(config.poll_interval);
        }

        info!("Stopping watcher on {}", config.root.display());
        if let Err(e) = guard.release() {
            warn!("{}", e);
        }

        Ok(RunSummary {
            delivered: context.counters.delivered.load(Ordering::SeqCst),
            failed: context.counters.failed.load(Ordering::SeqCst),
            uptime: started.elapsed(),
        })
    }
}
