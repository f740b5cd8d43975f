//! Write-once shutdown signal shared across the host.
//!
//! Exactly one signal exists per host instance. It is created when the host
//! is constructed, handed by reference into the pipeline builder so
//! middleware can observe it, fired at most once when the host stops, and
//! released when the host is disposed. It is never reused across restarts
//! (the host itself is not restartable).

use parking_lot::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::Notify;
use tracing::warn;

/// A callback type for shutdown notifications.
pub type ShutdownCallback = Box<dyn Fn() + Send + Sync>;

/// A write-once signal broadcasting that the host is shutting down.
///
/// Signalling is idempotent - only the first reason is kept. After
/// [`release`](ShutdownSignal::release) the signal is inert: further
/// `signal` and `on_shutdown` calls are no-ops.
#[derive(Default)]
pub struct ShutdownSignal {
    /// Whether shutdown has been signalled.
    fired: AtomicBool,
    /// Whether the signal's resources have been released.
    released: AtomicBool,
    /// The reason for shutting down (first one wins).
    reason: RwLock<Option<String>>,
    /// Callbacks to invoke on shutdown.
    callbacks: RwLock<Vec<ShutdownCallback>>,
    /// Wakes tasks parked in [`wait`](ShutdownSignal::wait).
    notify: Notify,
}

impl ShutdownSignal {
    /// Creates a new shutdown signal.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Signals shutdown with a reason.
    ///
    /// This is idempotent - only the first reason is kept. Callbacks are
    /// invoked immediately; panics in callbacks are logged and suppressed so
    /// one observer cannot block notification of the rest.
    pub fn signal(&self, reason: impl Into<String>) {
        if self.released.load(Ordering::SeqCst) {
            return;
        }
        if self
            .fired
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
        {
            *self.reason.write() = Some(reason.into());

            let callbacks = std::mem::take(&mut *self.callbacks.write());
            for callback in callbacks {
                if let Err(e) = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
                    callback();
                })) {
                    warn!("shutdown callback panicked: {:?}", e);
                }
            }

            self.notify.notify_waiters();
        }
    }

    /// Registers a callback to be invoked when shutdown is signalled.
    ///
    /// If shutdown was already signalled, the callback is invoked
    /// immediately. If the signal was already released, the callback is
    /// dropped without running.
    pub fn on_shutdown<F>(&self, callback: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        if self.released.load(Ordering::SeqCst) {
            return;
        }
        if self.is_shutting_down() {
            if let Err(e) = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
                callback();
            })) {
                warn!("shutdown callback panicked: {:?}", e);
            }
        } else {
            self.callbacks.write().push(Box::new(callback));
        }
    }

    /// Waits until shutdown is signalled.
    ///
    /// Completes immediately if shutdown was already signalled. A silent
    /// release (dispose without stop) does not resolve pending waiters;
    /// middleware that must observe teardown should rely on the host's
    /// stop path, which signals before releasing.
    pub async fn wait(&self) {
        if self.is_shutting_down() {
            return;
        }
        let notified = self.notify.notified();
        tokio::pin!(notified);
        // Register the waiter before re-checking, so a signal racing with
        // this call cannot be missed.
        notified.as_mut().enable();
        if self.is_shutting_down() {
            return;
        }
        notified.await;
    }

    /// Returns whether shutdown has been signalled.
    #[must_use]
    pub fn is_shutting_down(&self) -> bool {
        self.fired.load(Ordering::SeqCst)
    }

    /// Returns the shutdown reason, if any.
    #[must_use]
    pub fn reason(&self) -> Option<String> {
        self.reason.read().clone()
    }

    /// Releases the signal's resources.
    ///
    /// Idempotent. Pending callbacks are dropped without running; the
    /// fired flag and reason survive so late observers still see a
    /// consistent answer from [`is_shutting_down`](Self::is_shutting_down).
    pub fn release(&self) {
        if !self.released.swap(true, Ordering::SeqCst) {
            self.callbacks.write().clear();
        }
    }

    /// Returns whether the signal's resources have been released.
    #[must_use]
    pub fn is_released(&self) -> bool {
        self.released.load(Ordering::SeqCst)
    }
}

impl std::fmt::Debug for ShutdownSignal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShutdownSignal")
            .field("fired", &self.is_shutting_down())
            .field("released", &self.is_released())
            .field("reason", &self.reason())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Arc;

    #[test]
    fn test_signal_default_not_fired() {
        let signal = ShutdownSignal::new();
        assert!(!signal.is_shutting_down());
        assert!(!signal.is_released());
        assert!(signal.reason().is_none());
    }

    #[test]
    fn test_signal_fires_with_reason() {
        let signal = ShutdownSignal::new();
        signal.signal("host stopping");

        assert!(signal.is_shutting_down());
        assert_eq!(signal.reason(), Some("host stopping".to_string()));
    }

    #[test]
    fn test_signal_idempotent() {
        let signal = ShutdownSignal::new();
        signal.signal("first reason");
        signal.signal("second reason");

        // First reason wins
        assert_eq!(signal.reason(), Some("first reason".to_string()));
    }

    #[test]
    fn test_on_shutdown_before_signal() {
        let signal = ShutdownSignal::new();
        let counter = Arc::new(AtomicUsize::new(0));
        let counter_clone = counter.clone();

        signal.on_shutdown(move || {
            counter_clone.fetch_add(1, Ordering::SeqCst);
        });

        assert_eq!(counter.load(Ordering::SeqCst), 0);

        signal.signal("test");

        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_on_shutdown_after_signal() {
        let signal = ShutdownSignal::new();
        signal.signal("test");

        let counter = Arc::new(AtomicUsize::new(0));
        let counter_clone = counter.clone();

        // Should invoke immediately
        signal.on_shutdown(move || {
            counter_clone.fetch_add(1, Ordering::SeqCst);
        });

        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_callback_panic_suppressed() {
        let signal = ShutdownSignal::new();

        signal.on_shutdown(|| {
            panic!("intentional panic");
        });

        // Should not propagate
        signal.signal("test");
        assert!(signal.is_shutting_down());
    }

    #[test]
    fn test_release_drops_pending_callbacks() {
        let signal = ShutdownSignal::new();
        let counter = Arc::new(AtomicUsize::new(0));
        let counter_clone = counter.clone();

        signal.on_shutdown(move || {
            counter_clone.fetch_add(1, Ordering::SeqCst);
        });

        signal.release();
        signal.signal("too late");

        assert_eq!(counter.load(Ordering::SeqCst), 0);
        assert!(!signal.is_shutting_down());
    }

    #[test]
    fn test_release_idempotent() {
        let signal = ShutdownSignal::new();
        signal.release();
        signal.release();

        assert!(signal.is_released());
    }

    #[test]
    fn test_signal_survives_release() {
        let signal = ShutdownSignal::new();
        signal.signal("stopping");
        signal.release();

        // Late observers still see a consistent answer
        assert!(signal.is_shutting_down());
        assert_eq!(signal.reason(), Some("stopping".to_string()));
    }

    #[tokio::test]
    async fn test_wait_completes_after_signal() {
        let signal = Arc::new(ShutdownSignal::new());

        let waiter = signal.clone();
        let handle = tokio::spawn(async move {
            waiter.wait().await;
        });

        signal.signal("test");
        handle.await.ok();
        assert!(signal.is_shutting_down());
    }

    #[tokio::test]
    async fn test_wait_completes_when_already_signalled() {
        let signal = ShutdownSignal::new();
        signal.signal("test");

        // Must not hang
        signal.wait().await;
    }
}
