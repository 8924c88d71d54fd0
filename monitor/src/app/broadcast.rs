//! Fan-out of snapshots and transition events to real-time subscribers.
//!
//! Every subscriber owns a bounded queue. Publishing never waits on a
//! subscriber: a full or closed queue means the subscriber is gone or too slow,
//! and it is dropped from the registry.

use alloc::sync::Arc;
use core::sync::atomic::{AtomicU64, Ordering};
use std::collections::HashMap;

use hostwatch_common::{StateSnapshot, TransitionEvent, WsMessage};
use tokio::sync::{Mutex, mpsc};
use tracing::debug;

use crate::app::StateStore;

pub type SubscriberId = u64;

/// One notification queued for a subscriber.
#[derive(Debug, Clone)]
pub enum Update {
    Snapshot(Arc<StateSnapshot>),
    Transition {
        /// Sweep that detected the transition.
        sweep: u64,
        event: TransitionEvent,
    },
}

impl Update {
    #[must_use]
    pub fn sweep(&self) -> u64 {
        match *self {
            Self::Snapshot(ref snapshot) => snapshot.sweep,
            Self::Transition { sweep, .. } => sweep,
        }
    }

    #[must_use]
    pub fn to_message(&self) -> WsMessage {
        match *self {
            Self::Snapshot(ref snapshot) => WsMessage::Snapshot(snapshot.as_ref().clone()),
            Self::Transition { ref event, .. } => WsMessage::Transition(event.clone()),
        }
    }
}

/// Receiving end held by one subscriber.
pub struct Subscription {
    id: SubscriberId,
    rx: mpsc::Receiver<Update>,
    /// Highest sweep already reflected in what this subscriber received.
    seen_sweep: Option<u64>,
}

impl Subscription {
    #[must_use]
    pub const fn id(&self) -> SubscriberId {
        self.id
    }

    /// Next update, or `None` once the broadcaster dropped this subscriber.
    ///
    /// Updates for sweeps already covered by an earlier snapshot are skipped,
    /// which happens when a subscriber joins between a snapshot swap and its
    /// publication.
    pub async fn recv(&mut self) -> Option<Update> {
        loop {
            let update = self.rx.recv().await?;
            let sweep = update.sweep();
            if self.seen_sweep.is_some_and(|seen| sweep <= seen) {
                continue;
            }
            if matches!(update, Update::Snapshot(_)) {
                self.seen_sweep = Some(sweep);
            }
            return Some(update);
        }
    }
}

pub struct Broadcaster {
    store: StateStore,
    queue_len: usize,
    next_id: AtomicU64,
    subscribers: Mutex<HashMap<SubscriberId, mpsc::Sender<Update>>>,
}

impl Broadcaster {
    /// `queue_len` is the number of undelivered updates a subscriber may lag behind.
    #[must_use]
    pub fn new(store: StateStore, queue_len: usize) -> Self {
        Self {
            store,
            queue_len: queue_len.max(1),
            next_id: AtomicU64::new(1),
            subscribers: Mutex::new(HashMap::new()),
        }
    }

    /// Registers a subscriber whose first update is the current snapshot.
    ///
    /// The snapshot is read and queued while the registry is locked, so no
    /// publication can slip in between the initial snapshot and registration.
    pub async fn subscribe(&self) -> Subscription {
        let (tx, rx) = mpsc::channel(self.queue_len);
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);

        let mut subscribers = self.subscribers.lock().await;
        let initial = self.store.current();
        if tx.try_send(Update::Snapshot(initial)).is_err() {
            unreachable!("a fresh queue has room for the initial snapshot");
        }
        subscribers.insert(id, tx);
        debug!(subscriber = id, total = subscribers.len(), "Subscriber registered");

        Subscription {
            id,
            rx,
            seen_sweep: None,
        }
    }

    /// Removes a subscriber. Returns whether it was still registered.
    pub async fn unsubscribe(&self, id: SubscriberId) -> bool {
        let removed = self.subscribers.lock().await.remove(&id).is_some();
        if removed {
            debug!(subscriber = id, "Subscriber removed");
        }
        removed
    }

    pub async fn subscriber_count(&self) -> usize {
        self.subscribers.lock().await.len()
    }

    /// Fans a snapshot out to all subscribers. Returns the number of successful deliveries.
    pub async fn publish_snapshot(&self, snapshot: Arc<StateSnapshot>) -> usize {
        self.fan_out(&Update::Snapshot(snapshot)).await
    }

    /// Fans a transition event out to all subscribers. Returns the number of successful deliveries.
    pub async fn publish_transition(&self, sweep: u64, event: TransitionEvent) -> usize {
        self.fan_out(&Update::Transition { sweep, event }).await
    }

    async fn fan_out(&self, update: &Update) -> usize {
        // Work on a copy so subscribers may come and go during delivery.
        let targets: Vec<_> = self
            .subscribers
            .lock()
            .await
            .iter()
            .map(|(&id, tx)| (id, tx.clone()))
            .collect();

        let mut failed = Vec::new();
        for (id, tx) in &targets {
            if let Err(e) = tx.try_send(update.clone()) {
                debug!(subscriber = id, "Dropping subscriber: {e}");
                failed.push(*id);
            }
        }

        if !failed.is_empty() {
            let mut subscribers = self.subscribers.lock().await;
            for id in &failed {
                subscribers.remove(id);
            }
        }

        targets.len() - failed.len()
    }
}
