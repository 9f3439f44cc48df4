use std::path::{Path, PathBuf};
use std::sync::Arc;

use log::{debug, error, warn};
use notify::{RecommendedWatcher, RecursiveMode, Watcher};

use super::event::{created_files, FileEvent};
use crate::modules::error::{Result, WatchError};

/// Callback run for every file creation. May be called from a foreign thread.
pub type EventCallback = Arc<dyn Fn(FileEvent) + Send + Sync>;

/// Live registration for creation events
pub trait Subscription {
    fn root(&self) -> &Path;

    /// Stop delivering events. After this returns, the callback is not called again.
    fn unsubscribe(&mut self) -> Result<()>;
}

/// Something that can report file creations under a directory
pub trait EventSource {
    type Handle: Subscription;

    fn subscribe(
        &mut self,
        root: &Path,
        recursive: bool,
        callback: EventCallback,
    ) -> Result<Self::Handle>;
}

/// Releases its subscription when dropped, unless released explicitly first
pub struct SubscriptionGuard<H: Subscription> {
    handle: Option<H>,
}

impl<H: Subscription> SubscriptionGuard<H> {
    pub fn new(handle: H) -> Self {
        Self {
            handle: Some(handle),
        }
    }

    pub fn is_active(&self) -> bool {
        self.handle.is_some()
    }

    /// Release the subscription now. Later calls are no-ops.
    pub fn release(&mut self) -> Result<()> {
        match self.handle.take() {
            Some(mut handle) => {
                debug!("Releasing subscription on {}", handle.root().display());
                handle.unsubscribe()
            }
            None => Ok(()),
        }
    }
}

impl<H: Subscription> Drop for SubscriptionGuard<H> {
    fn drop(&mut self) {
        if let Err(e) = self.release() {
            warn!("{}", e);
        }
    }
}

/// Event source backed by the OS notification facility (`notify`)
#[derive(Default)]
pub struct NotifyEventSource;

/// Subscription owning a `notify` watcher
pub struct NotifySubscription {
    watcher: Option<RecommendedWatcher>,
    root: PathBuf,
}

impl EventSource for NotifyEventSource {
    type Handle = NotifySubscription;

    fn subscribe(
        &mut self,
        root: &Path,
        recursive: bool,
        callback: EventCallback,
    ) -> Result<NotifySubscription> {
        let subscription_error = |reason: String| WatchError::Subscription {
            path: root.to_path_buf(),
            reason,
        };

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<notify::Event>| match res {
                Ok(event) => {
                    for file_event in created_files(&event) {
                        callback(file_event);
                    }
                }
                Err(e) => error!("File watcher error: {}", e),
            },
            notify::Config::default(),
        )
        .map_err(|e| subscription_error(e.to_string()))?;

        let mode = if recursive {
            RecursiveMode::Recursive
        } else {
            RecursiveMode::NonRecursive
        };
        watcher
            .watch(root, mode)
            .map_err(|e| subscription_error(e.to_string()))?;

        Ok(NotifySubscription {
            watcher: Some(watcher),
            root: root.to_path_buf(),
        })
    }
}

impl Subscription for NotifySubscription {
    fn root(&self) -> &Path {
        &self.root
    }

    fn unsubscribe(&mut self) -> Result<()> {
        // Dropping the watcher stops its event thread even if unwatch fails
        let Some(mut watcher) = self.watcher.take() else {
            return Ok(());
        };
        watcher
            .unwatch(&self.root)
            .map_err(|e| WatchError::Unsubscribe {
                path: self.root.clone(),
                reason: e.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::{Duration, Instant};

    struct CountingSubscription {
        root: PathBuf,
        released: Arc<AtomicUsize>,
        fail: bool,
    }

    impl Subscription for CountingSubscription {
        fn root(&self) -> &Path {
            &self.root
        }

        fn unsubscribe(&mut self) -> Result<()> {
            self.released.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(WatchError::Unsubscribe {
                    path: self.root.clone(),
                    reason: "already gone".to_string(),
                });
            }
            Ok(())
        }
    }

    fn counting(fail: bool) -> (CountingSubscription, Arc<AtomicUsize>) {
        let released = Arc::new(AtomicUsize::new(0));
        (
            CountingSubscription {
                root: PathBuf::from("/inbox"),
                released: Arc::clone(&released),
                fail,
            },
            released,
        )
    }

    #[test]
    fn test_guard_releases_on_drop() {
        let (subscription, released) = counting(false);
        {
            let guard = SubscriptionGuard::new(subscription);
            assert!(guard.is_active());
        }
        assert_eq!(released.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_guard_releases_only_once() {
        let (subscription, released) = counting(false);
        let mut guard = SubscriptionGuard::new(subscription);

        assert!(guard.release().is_ok());
        assert!(!guard.is_active());
        assert!(guard.release().is_ok());
        drop(guard);

        assert_eq!(released.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_failed_release_is_reported() {
        let (subscription, released) = counting(true);
        let mut guard = SubscriptionGuard::new(subscription);

        assert!(matches!(
            guard.release(),
            Err(WatchError::Unsubscribe { .. })
        ));
        // The handle is gone even though unsubscribing failed
        assert!(!guard.is_active());
        drop(guard);
        assert_eq!(released.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_missing_root_fails_to_subscribe() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("does-not-exist");

        let result =
            NotifyEventSource.subscribe(&missing, true, Arc::new(|_event: FileEvent| {}));
        match result {
            Err(WatchError::Subscription { path, .. }) => assert_eq!(path, missing),
            Err(other) => panic!("expected subscription error, got {}", other),
            Ok(_) => panic!("expected subscription error"),
        }
    }

    #[test]
    fn test_notify_reports_created_files() {
        let dir = tempfile::tempdir().unwrap();
        let seen: Arc<Mutex<Vec<PathBuf>>> = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);

        let mut subscription = NotifyEventSource
            .subscribe(
                dir.path(),
                true,
                Arc::new(move |event: FileEvent| sink.lock().unwrap().push(event.path)),
            )
            .unwrap();

        std::fs::create_dir(dir.path().join("nested")).unwrap();
        // Give the backend a moment to pick up the new directory
        std::thread::sleep(Duration::from_millis(200));
        std::fs::write(dir.path().join("nested").join("report.csv"), b"a,b\n").unwrap();

        let deadline = Instant::now() + Duration::from_secs(5);
        while Instant::now() < deadline {
            if seen
                .lock()
                .unwrap()
                .iter()
                .any(|path| path.ends_with("nested/report.csv"))
            {
                break;
            }
            std::thread::sleep(Duration::from_millis(20));
        }

        assert!(subscription.unsubscribe().is_ok());
        let seen = seen.lock().unwrap();
        assert!(seen.iter().any(|path| path.ends_with("nested/report.csv")));
        // Directory creation itself is not reported
        assert!(!seen.iter().any(|path| path.ends_with("nested")));
    }
}
