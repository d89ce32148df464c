//! Fan-out of connection state changes.
//!
//! Every subscriber owns a bounded queue. Publishing waits for room in each
//! queue in turn, so a subscriber that stops reading stalls every publish
//! after it (including the event loop). Subscribers that are dropped without
//! unsubscribing are detected on the next publish and deactivated.
//!
//! Slots are never compacted: unsubscribing marks a slot inactive and a later
//! subscribe reuses it. The slot list is guarded by a mutex that is only held
//! to take a snapshot, never across a send.
//!
//! Once the state source goes away the broadcaster is closed: every pending
//! `recv` drains its queue and then returns `None`.

use log::debug;
use std::fmt::{Display, Formatter};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::api::models::ConnectionState;

/// Identity of a subscription. Two subscribers are the same only if their
/// ids are equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriberId(Uuid);

impl SubscriberId {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Display for SubscriberId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "sub-{}", &self.0.simple().to_string()[..8])
    }
}

/// Receiving side of a subscription.
///
/// States arrive in publish order. After [`unsubscribe`](StateBroadcaster::unsubscribe)
/// `recv` drains whatever was already queued and then returns `None`.
#[derive(Debug)]
pub struct Subscriber {
    id: SubscriberId,
    rx: mpsc::Receiver<ConnectionState>,
}

impl Subscriber {
    pub fn id(&self) -> SubscriberId {
        self.id
    }

    /// Waits for the next state.
    pub async fn recv(&mut self) -> Option<ConnectionState> {
        self.rx.recv().await
    }

    /// Returns a queued state without waiting.
    pub fn try_recv(&mut self) -> Option<ConnectionState> {
        self.rx.try_recv().ok()
    }
}

#[derive(Debug, Clone)]
struct Slot {
    id: SubscriberId,
    tx: mpsc::Sender<ConnectionState>,
}

#[derive(Debug, Default)]
struct Slots {
    list: Vec<Option<Slot>>,
    closed: bool,
}

/// Broadcasts connection states to a dynamic set of subscribers.
///
/// Cheap to clone; clones share the same subscriber set.
#[derive(Debug, Clone)]
pub struct StateBroadcaster {
    slots: Arc<Mutex<Slots>>,
    capacity: usize,
}

impl StateBroadcaster {
    /// Creates a broadcaster whose subscribers each buffer `capacity` states.
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: Arc::new(Mutex::new(Slots::default())),
            capacity: capacity.max(1),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Slots> {
        // The slot list is always left consistent, so a poisoned lock is still usable.
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Registers a new subscriber.
    ///
    /// On a closed broadcaster the returned subscriber yields `None` right away.
    pub fn subscribe(&self) -> Subscriber {
        let (tx, rx) = mpsc::channel(self.capacity);
        let id = SubscriberId::new();

        let mut slots = self.lock();
        if slots.closed {
            debug!("Subscriber {id} added to a closed broadcaster");
            return Subscriber { id, rx };
        }
        let slot = Some(Slot { id, tx });
        match slots.list.iter_mut().find(|s| s.is_none()) {
            Some(free) => *free = slot,
            None => slots.list.push(slot),
        }
        debug!("Subscriber {id} added ({} active)", active(&slots.list));

        Subscriber { id, rx }
    }

    /// Deactivates a subscriber. Unknown or already removed ids are ignored.
    pub fn unsubscribe(&self, id: SubscriberId) {
        let mut slots = self.lock();
        for slot in slots.list.iter_mut() {
            if slot.as_ref().is_some_and(|s| s.id == id) {
                *slot = None;
                debug!("Subscriber {id} removed");
            }
        }
    }

    /// Delivers `state` to every active subscriber.
    ///
    /// Waits for queue space on each subscriber in turn; there is no drop
    /// policy.
    pub async fn publish(&self, state: ConnectionState) {
        let snapshot: Vec<Slot> = self.lock().list.iter().flatten().cloned().collect();
        debug!("Publishing {state} to {} subscriber(s)", snapshot.len());

        for slot in snapshot {
            if slot.tx.send(state).await.is_err() {
                debug!("Subscriber {} went away, deactivating", slot.id);
                self.unsubscribe(slot.id);
            }
        }
    }

    /// Deactivates every subscriber and refuses new ones.
    ///
    /// Queued states are still delivered; after that each subscriber's
    /// `recv` returns `None`.
    pub fn close(&self) {
        let mut slots = self.lock();
        if !slots.closed {
            debug!("Closing broadcaster ({} active)", active(&slots.list));
        }
        slots.closed = true;
        slots.list.clear();
    }

    /// Returns true once [`close`](Self::close) was called.
    pub fn is_closed(&self) -> bool {
        self.lock().closed
    }

    /// Number of active subscribers.
    pub fn subscriber_count(&self) -> usize {
        active(&self.lock().list)
    }
}

fn active(slots: &[Option<Slot>]) -> usize {
    slots.iter().filter(|s| s.is_some()).count()
}
