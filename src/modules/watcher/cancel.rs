use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use log::{info, warn};

/// Cooperative cancellation flag shared between the signal handler and the wait loop
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Cancel `token` on Ctrl+C or a termination signal.
///
/// Returns false when the handler could not be installed; the watcher then
/// only stops when the process is killed.
pub fn install_interrupt_handler(token: &CancellationToken) -> bool {
    let token = token.clone();
    match ctrlc::set_handler(move || {
        info!("Interrupt received, stopping watcher");
        token.cancel();
    }) {
        Ok(()) => true,
        Err(e) => {
            warn!("Failed to install interrupt handler: {}", e);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cancellation_is_shared_between_clones() {
        let token = CancellationToken::new();
        let observer = token.clone();

        assert!(!observer.is_cancelled());
        token.cancel();
        assert!(observer.is_cancelled());

        // Cancelling twice is harmless
        token.cancel();
        assert!(token.is_cancelled());
    }
}
