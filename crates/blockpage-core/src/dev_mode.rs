//! Shared developer-mode flag
//!
//! The flag is owned by whoever holds a [`DeveloperMode`] handle (normally the
//! editor session) and observed through [`DeveloperModeWatch`] receivers. Writes
//! publish to every watcher; reads always return the latest value.

use std::sync::Arc;
use tokio::sync::watch;

/// Writable handle to the developer-mode flag
#[derive(Debug, Clone)]
pub struct DeveloperMode {
    sender: Arc<watch::Sender<bool>>,
}

impl Default for DeveloperMode {
    fn default() -> Self {
        Self::new(false)
    }
}

impl DeveloperMode {
    /// Create a new flag with an initial value
    pub fn new(initial: bool) -> Self {
        let (sender, _) = watch::channel(initial);
        Self {
            sender: Arc::new(sender),
        }
    }

    /// Current value
    pub fn get(&self) -> bool {
        *self.sender.borrow()
    }

    /// Set the flag, notifying watchers only when the value changes
    pub fn set(&self, on: bool) {
        let changed = self.sender.send_if_modified(|current| {
            if *current == on {
                false
            } else {
                *current = on;
                true
            }
        });
        if changed {
            tracing::info!("Developer mode {}", if on { "ON" } else { "OFF" });
        }
    }

    /// Flip the flag and return the new value
    pub fn toggle(&self) -> bool {
        let next = !self.get();
        self.set(next);
        next
    }

    /// Subscribe to changes
    pub fn watch(&self) -> DeveloperModeWatch {
        DeveloperModeWatch {
            receiver: self.sender.subscribe(),
        }
    }

    /// Number of live watchers
    pub fn watcher_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

/// Read-only subscription to the developer-mode flag
#[derive(Debug, Clone)]
pub struct DeveloperModeWatch {
    receiver: watch::Receiver<bool>,
}

impl DeveloperModeWatch {
    /// Latest published value
    pub fn is_on(&self) -> bool {
        *self.receiver.borrow()
    }

    /// Returns the new value if it changed since the last call
    pub fn poll_change(&mut self) -> Option<bool> {
        match self.receiver.has_changed() {
            Ok(true) => Some(*self.receiver.borrow_and_update()),
            _ => None,
        }
    }

    /// Wait for the next change (for async consumers)
    pub async fn changed(&mut self) -> Option<bool> {
        self.receiver.changed().await.ok()?;
        Some(*self.receiver.borrow_and_update())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_off() {
        let mode = DeveloperMode::default();
        assert!(!mode.get());
    }

    #[test]
    fn test_toggle_and_set() {
        let mode = DeveloperMode::new(false);
        assert!(mode.toggle());
        assert!(mode.get());
        assert!(!mode.toggle());
        mode.set(true);
        assert!(mode.get());
    }

    #[test]
    fn test_watchers_observe_changes() {
        let mode = DeveloperMode::new(false);
        let mut watch = mode.watch();
        assert!(!watch.is_on());
        assert_eq!(watch.poll_change(), None);

        mode.set(true);
        assert!(watch.is_on());
        assert_eq!(watch.poll_change(), Some(true));
        assert_eq!(watch.poll_change(), None);

        // Setting the same value publishes nothing
        mode.set(true);
        assert_eq!(watch.poll_change(), None);
    }

    #[test]
    fn test_watcher_count_tracks_drops() {
        let mode = DeveloperMode::new(false);
        let a = mode.watch();
        let b = mode.watch();
        assert_eq!(mode.watcher_count(), 2);
        drop(a);
        assert_eq!(mode.watcher_count(), 1);
        drop(b);
        assert_eq!(mode.watcher_count(), 0);
    }

    #[tokio::test]
    async fn test_async_change() {
        let mode = DeveloperMode::new(false);
        let mut watch = mode.watch();
        let writer = mode.clone();
        tokio::spawn(async move { writer.set(true) });
        assert_eq!(watch.changed().await, Some(true));
    }
}
