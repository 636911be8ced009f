// SPDX-License-Identifier: GPL-3.0-only
//! Change notifications and the observer registry
//!
//! Events are delivered synchronously on whichever task processes transport
//! input, in the order the device reported them.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::mpsc;

use super::InputSource;

/// Notification raised from device feedback or connection changes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayEvent {
    PowerChanged(bool),
    VolumeChanged(u16),
    InputChanged(InputSource),
    QuadViewChanged(bool),
    Connected,
    Disconnected,
}

pub type EventHandler = Arc<dyn Fn(&DisplayEvent) + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

#[derive(Clone)]
enum Sink {
    Callback(EventHandler),
    /// Dropped from the registry once its receiver is gone
    Channel(mpsc::UnboundedSender<DisplayEvent>),
}

/// Registry of event callbacks
#[derive(Default)]
pub struct Observers {
    next_id: AtomicU64,
    sinks: Mutex<Vec<(SubscriptionId, Sink)>>,
}

impl Observers {
    pub fn new() -> Self {
        Self::default()
    }

    fn sinks(&self) -> MutexGuard<'_, Vec<(SubscriptionId, Sink)>> {
        self.sinks.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn register(&self, sink: Sink) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.sinks().push((id, sink));
        id
    }

    /// Register a callback; it is invoked for every subsequent event
    pub fn subscribe(&self, handler: EventHandler) -> SubscriptionId {
        self.register(Sink::Callback(handler))
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut sinks = self.sinks();
        let len_before = sinks.len();
        sinks.retain(|(sink_id, _)| *sink_id != id);
        sinks.len() != len_before
    }

    /// Subscribe through an unbounded channel the caller can poll or select on
    ///
    /// Dropping the receiver ends the subscription at the next event.
    pub fn channel(&self) -> (SubscriptionId, mpsc::UnboundedReceiver<DisplayEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (self.register(Sink::Channel(tx)), rx)
    }

    /// Deliver an event to every subscriber in registration order
    ///
    /// The registry lock is released before handlers run so a handler may
    /// subscribe, unsubscribe or call back into the driver.
    pub fn emit(&self, event: &DisplayEvent) {
        let sinks: Vec<(SubscriptionId, Sink)> = self.sinks().clone();

        trace!(?event, observers = sinks.len(), "Emitting display event");

        let mut closed = Vec::new();
        for (id, sink) in sinks {
            match sink {
                Sink::Callback(handler) => handler(event),
                Sink::Channel(tx) => {
                    if tx.send(*event).is_err() {
                        closed.push(id);
                    }
                }
            }
        }

        if !closed.is_empty() {
            debug!("Dropping {} closed event channel(s)", closed.len());
            self.sinks().retain(|(id, _)| !closed.contains(id));
        }
    }

    pub fn len(&self) -> usize {
        self.sinks().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for Observers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Observers({})", self.len())
    }
}
