//! Fan-out of [`SyncEvent`]s to subscribers.
//!
//! Every subscriber owns an unbounded `crossbeam_channel` receiver. Publishing is
//! best-effort: a subscriber whose receiver was dropped is forgotten.
use std::sync::{Mutex, PoisonError};

use crossbeam_channel::{Receiver, Sender, unbounded};
use log::debug;
use quote_common::SyncEvent;

/// Broadcasts engine events to every live subscriber.
#[derive(Debug, Default)]
pub struct EventBus {
    subscribers: Mutex<Vec<Sender<SyncEvent>>>,
}

impl EventBus {
    /// Register a new subscriber.
    pub fn subscribe(&self) -> Receiver<SyncEvent> {
        let (tx, rx) = unbounded();
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(tx);
        rx
    }

    /// Deliver `event` to all subscribers.
    pub fn publish(&self, event: SyncEvent) {
        let mut subscribers = self.subscribers.lock().unwrap_or_else(PoisonError::into_inner);
        subscribers.retain(|tx| tx.send(event.clone()).is_ok());
        debug!("Published {:?} to {} subscriber(s)", event, subscribers.len());
    }
}
