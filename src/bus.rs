//! Observer registry for price update fan-out
//!
//! An explicit callback registry rather than a channel: consumers hand
//! in a closure, get a [`Subscription`] handle back, and are invoked
//! once per successful refresh. Events are transient - there is no
//! replay, late subscribers read current state from the price store.

use crate::types::PriceUpdate;
use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, Weak};

type Observer = Arc<dyn Fn(&PriceUpdate) + Send + Sync>;
type Registry = Mutex<HashMap<u64, Observer>>;

/// Fan-out bus delivering [`PriceUpdate`] events to registered observers
///
/// Holds no entity state, only the observer set. Delivery order across
/// observers is unspecified. A panicking observer is isolated: the
/// remaining observers still receive the event and the refresh cycle
/// is unaffected.
pub struct SubscriptionBus {
    observers: Arc<Registry>,
    next_id: AtomicU64,
}

/// Handle returned by [`SubscriptionBus::subscribe`]
///
/// Call [`Subscription::unsubscribe`] for symmetric cleanup. Dropping
/// the handle without unsubscribing leaves the observer registered.
#[must_use]
pub struct Subscription {
    id: u64,
    registry: Weak<Registry>,
}

impl Subscription {
    /// Deregisters the observer; later events are no longer delivered
    pub fn unsubscribe(self) {
        if let Some(registry) = self.registry.upgrade() {
            registry.lock().unwrap().remove(&self.id);
        }
    }
}

impl SubscriptionBus {
    /// Creates a bus with no observers
    pub fn new() -> Self {
        Self {
            observers: Arc::new(Mutex::new(HashMap::new())),
            next_id: AtomicU64::new(0),
        }
    }

    /// Registers an observer invoked once per successful price update
    pub fn subscribe(
        &self,
        observer: impl Fn(&PriceUpdate) + Send + Sync + 'static,
    ) -> Subscription {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.observers
            .lock()
            .unwrap()
            .insert(id, Arc::new(observer));
        Subscription {
            id,
            registry: Arc::downgrade(&self.observers),
        }
    }

    /// Number of registered observers
    pub fn observer_count(&self) -> usize {
        self.observers.lock().unwrap().len()
    }

    /// Delivers an update to every registered observer
    ///
    /// Observers run outside the registry lock, so a callback may
    /// subscribe or unsubscribe without deadlocking.
    pub fn publish(&self, update: &PriceUpdate) {
        let snapshot: Vec<Observer> = self.observers.lock().unwrap().values().cloned().collect();

        for observer in snapshot {
            if catch_unwind(AssertUnwindSafe(|| observer(update))).is_err() {
                tracing::error!(
                    asset_id = update.asset_id,
                    "Price update observer panicked"
                );
            }
        }
    }
}

impl Default for SubscriptionBus {
    fn default() -> Self {
        Self::new()
    }
}
