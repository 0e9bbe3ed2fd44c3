//! Change notifications for UI shells
//!
//! Every reduction publishes the slice it touched; shells re-read that slice
//! from the root snapshot.

use serde::Serialize;
use std::sync::{Arc, Mutex};

use flume::{Receiver, Sender};
use tracing::warn;

/// Addressable slices of the root state tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Slice {
    Dashboard,
    Emails,
    Notifications,
    Settings,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateChanged(pub Slice);

#[derive(Clone, Default)]
pub struct Notifier {
    subscribers: Arc<Mutex<Vec<Sender<StateChanged>>>>,
}

impl Notifier {
    pub fn subscribe(&self) -> Receiver<StateChanged> {
        let (tx, rx) = flume::unbounded();
        match self.subscribers.lock() {
            Ok(mut subs) => subs.push(tx),
            Err(e) => warn!("Failed to register state subscriber: {}", e),
        }
        rx
    }

    pub fn notify(&self, slice: Slice) {
        if let Ok(mut subs) = self.subscribers.lock() {
            // Dropped receivers are pruned here
            subs.retain(|tx| tx.send(StateChanged(slice)).is_ok());
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.lock().map(|s| s.len()).unwrap_or(0)
    }
}
