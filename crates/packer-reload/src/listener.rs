//! Listener registry for reload notifications.
//!
//! Tracks connected listeners and fans each batch of changed files out to
//! them. Delivery is fire-and-forget: a listener that cannot take a batch
//! right away loses it, and one that has disconnected is removed.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tokio::sync::mpsc;

use crate::error::ListenerDeliveryError;

/// Sink for batches of changed output files.
///
/// Implementations must not block; the pipeline calls them from its only task.
pub trait ReloadListener: Send + Sync {
    fn notify(&self, files: &[String]) -> Result<(), ListenerDeliveryError>;
}

impl<F> ReloadListener for F
where
    F: Fn(&[String]) -> Result<(), ListenerDeliveryError> + Send + Sync,
{
    fn notify(&self, files: &[String]) -> Result<(), ListenerDeliveryError> {
        self(files)
    }
}

/// Listener backed by a bounded channel, typically drained by one browser
/// connection.
#[derive(Debug, Clone)]
pub struct ChannelListener {
    tx: mpsc::Sender<Vec<String>>,
}

impl ChannelListener {
    pub fn new(tx: mpsc::Sender<Vec<String>>) -> Self {
        Self { tx }
    }

    /// Listener plus the receiving end, with room for `capacity` batches.
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<Vec<String>>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (Self::new(tx), rx)
    }
}

impl ReloadListener for ChannelListener {
    fn notify(&self, files: &[String]) -> Result<(), ListenerDeliveryError> {
        self.tx.try_send(files.to_vec()).map_err(|err| match err {
            mpsc::error::TrySendError::Full(_) => ListenerDeliveryError::Backlogged,
            mpsc::error::TrySendError::Closed(_) => ListenerDeliveryError::Disconnected,
        })
    }
}

/// Identifier handed out by [`ListenerRegistry::register`].
pub type ListenerId = usize;

/// Per-broadcast delivery counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BroadcastReport {
    pub delivered: usize,
    pub failed: usize,
    /// Failed listeners that were unregistered
    pub pruned: usize,
}

/// Shared, cloneable set of connected listeners.
#[derive(Clone, Default)]
pub struct ListenerRegistry {
    listeners: Arc<RwLock<HashMap<ListenerId, Arc<dyn ReloadListener>>>>,
    next_id: Arc<RwLock<ListenerId>>,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, listener: impl ReloadListener + 'static) -> ListenerId {
        let id = {
            let mut next_id = self.next_id.write();
            let id = *next_id;
            *next_id += 1;
            id
        };

        self.listeners.write().insert(id, Arc::new(listener));
        tracing::debug!(listener = id, "reload listener registered");
        id
    }

    /// Register a [`ChannelListener`] and return its receiving end.
    pub fn register_channel(&self, capacity: usize) -> (ListenerId, mpsc::Receiver<Vec<String>>) {
        let (listener, rx) = ChannelListener::channel(capacity);
        (self.register(listener), rx)
    }

    pub fn unregister(&self, id: ListenerId) -> bool {
        self.listeners.write().remove(&id).is_some()
    }

    /// Deliver `files` to every listener as one message.
    ///
    /// Failures are logged per listener and never stop delivery to the
    /// others. Disconnected listeners are unregistered afterwards.
    pub fn broadcast(&self, files: &[String]) -> BroadcastReport {
        // Snapshot so listeners run without the lock held
        let listeners: Vec<_> = self
            .listeners
            .read()
            .iter()
            .map(|(id, listener)| (*id, Arc::clone(listener)))
            .collect();

        let mut report = BroadcastReport::default();
        let mut disconnected = Vec::new();

        for (id, listener) in listeners {
            match listener.notify(files) {
                Ok(()) => report.delivered += 1,
                Err(err) => {
                    tracing::warn!(listener = id, error = %err, "reload notification not delivered");
                    report.failed += 1;
                    if err.is_permanent() {
                        disconnected.push(id);
                    }
                }
            }
        }

        for id in disconnected {
            if self.unregister(id) {
                report.pruned += 1;
            }
        }
        report
    }

    pub fn len(&self) -> usize {
        self.listeners.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.read().is_empty()
    }
}

impl std::fmt::Debug for ListenerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListenerRegistry")
            .field("listeners", &self.len())
            .finish()
    }
}
