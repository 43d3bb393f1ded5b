//! Stop signal for the listener.
//!
//! The consume loop only checks the signal between deliveries, so a delivery
//! that is being dispatched always finishes (and is acknowledged) before the
//! loop returns.

use tokio::sync::watch;

/// Coordinates a graceful stop of the listener.
///
/// The flag is stored in the channel itself, so a shutdown triggered before
/// the listener subscribes is still seen once it does.
#[derive(Debug)]
pub struct ShutdownController {
    shutdown_signal: watch::Sender<bool>,
}

impl ShutdownController {
    #[must_use]
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { shutdown_signal: tx }
    }

    /// Returns a receiver that flips to `true` when shutdown is triggered.
    #[must_use]
    pub fn shutdown_receiver(&self) -> watch::Receiver<bool> {
        self.shutdown_signal.subscribe()
    }

    /// Sets the stop flag and wakes every receiver. Idempotent.
    pub fn trigger_shutdown(&self) {
        self.shutdown_signal.send_replace(true);
    }

    #[must_use]
    pub fn is_shutting_down(&self) -> bool {
        *self.shutdown_signal.borrow()
    }
}

impl Default for ShutdownController {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_running() {
        let controller = ShutdownController::new();
        assert!(!controller.is_shutting_down());
        assert!(!*controller.shutdown_receiver().borrow());
    }

    #[test]
    fn trigger_without_receivers_is_kept() {
        let controller = ShutdownController::new();

        controller.trigger_shutdown();

        assert!(controller.is_shutting_down());
        assert!(*controller.shutdown_receiver().borrow());
    }

    #[test]
    fn trigger_is_idempotent() {
        let controller = ShutdownController::new();
        controller.trigger_shutdown();
        controller.trigger_shutdown();
        assert!(controller.is_shutting_down());
    }

    #[tokio::test]
    async fn shutdown_receiver_notified() {
        let controller = ShutdownController::new();
        let mut rx = controller.shutdown_receiver();
        assert!(!*rx.borrow());

        controller.trigger_shutdown();

        rx.changed().await.unwrap();
        assert!(*rx.borrow());
    }
}
