//! One-shot acknowledgment gate.
//!
//! After new credentials are applied, the party that delivered them (a
//! companion app, a UI) confirms it received them. Work that must wait for
//! that confirmation, such as tearing down a fallback access point, is
//! parked here and released by [`AckGate::acknowledge`].

use log::debug;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

type AckCallback = Box<dyn FnOnce() + Send + 'static>;

#[derive(Default)]
struct AckState {
    pending: bool,
    on_ack: Option<AckCallback>,
}

/// Shared acknowledgment state. Clones refer to the same gate.
#[derive(Clone, Default)]
pub(crate) struct AckGate {
    state: Arc<Mutex<AckState>>,
}

impl AckGate {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, AckState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn is_pending(&self) -> bool {
        self.lock().pending
    }

    /// Marks an acknowledgment as outstanding.
    pub(crate) fn arm(&self) {
        self.lock().pending = true;
    }

    /// Drops the outstanding acknowledgment without running the callback.
    ///
    /// A parked callback stays parked and runs on the next acknowledged
    /// credential change.
    pub(crate) fn disarm(&self) {
        self.lock().pending = false;
    }

    /// Runs `callback` once acknowledged, or right away if nothing is pending.
    ///
    /// Only one callback is parked at a time; a newer one replaces it.
    pub(crate) fn on_acknowledgment<F>(&self, callback: F)
    where
        F: FnOnce() + Send + 'static,
    {
        let mut state = self.lock();
        if state.pending {
            if state.on_ack.replace(Box::new(callback)).is_some() {
                debug!("Replacing previously parked acknowledgment callback");
            }
            return;
        }
        drop(state);

        callback();
    }

    /// Resolves the outstanding acknowledgment, running the parked callback.
    pub(crate) fn acknowledge(&self) {
        let callback = {
            let mut state = self.lock();
            if !state.pending {
                debug!("Acknowledgment received with nothing pending");
                return;
            }
            state.pending = false;
            state.on_ack.take()
        };

        debug!("Credentials acknowledged");
        if let Some(callback) = callback {
            callback();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counter() -> (Arc<AtomicUsize>, impl Fn() -> Box<dyn FnOnce() + Send>) {
        let hits = Arc::new(AtomicUsize::new(0));
        let make = {
            let hits = hits.clone();
            move || -> Box<dyn FnOnce() + Send> {
                let hits = hits.clone();
                Box::new(move || {
                    hits.fetch_add(1, Ordering::SeqCst);
                })
            }
        };
        (hits, make)
    }

    #[test]
    fn runs_immediately_when_nothing_pending() {
        let gate = AckGate::new();
        let (hits, make) = counter();

        gate.on_acknowledgment(make());
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn parks_until_acknowledged() {
        let gate = AckGate::new();
        let (hits, make) = counter();

        gate.arm();
        gate.on_acknowledgment(make());
        assert_eq!(hits.load(Ordering::SeqCst), 0);

        gate.acknowledge();
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert!(!gate.is_pending());

        gate.acknowledge();
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn last_callback_wins() {
        let gate = AckGate::new();
        let (first, make_first) = counter();
        let (second, make_second) = counter();

        gate.arm();
        gate.on_acknowledgment(make_first());
        gate.on_acknowledgment(make_second());
        gate.acknowledge();

        assert_eq!(first.load(Ordering::SeqCst), 0);
        assert_eq!(second.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn acknowledge_without_pending_is_noop() {
        let gate = AckGate::new();
        gate.acknowledge();
        assert!(!gate.is_pending());
    }

    #[test]
    fn disarm_keeps_parked_callback() {
        let gate = AckGate::new();
        let (hits, make) = counter();

        gate.arm();
        gate.on_acknowledgment(make());
        gate.disarm();
        gate.acknowledge();
        assert_eq!(hits.load(Ordering::SeqCst), 0);

        gate.arm();
        gate.acknowledge();
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn callback_may_reenter_gate() {
        let gate = AckGate::new();
        let inner = gate.clone();

        gate.arm();
        gate.on_acknowledgment(move || {
            assert!(!inner.is_pending());
            inner.on_acknowledgment(|| {});
        });
        gate.acknowledge();
    }
}
