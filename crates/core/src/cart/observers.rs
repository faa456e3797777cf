//! Change-notification registry for the cart store.
//!
//! Each mutation delivers the full updated [`Cart`] to every registered
//! observer, synchronously, before the mutation returns. Registration hands
//! back a [`Subscription`] that removes the observer when dropped.

use std::sync::{Arc, Weak};

use parking_lot::Mutex;

use super::Cart;

type Callback = Arc<dyn Fn(&Cart) + Send + Sync>;

#[derive(Default)]
struct Registry {
    next_id: u64,
    callbacks: Vec<(u64, Callback)>,
}

/// Observer list owned by a cart store.
#[derive(Clone, Default)]
pub(crate) struct Observers {
    registry: Arc<Mutex<Registry>>,
}

impl Observers {
    pub(crate) fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&Cart) + Send + Sync + 'static,
    {
        let mut registry = self.registry.lock();
        let id = registry.next_id;
        registry.next_id += 1;
        registry.callbacks.push((id, Arc::new(callback)));

        Subscription {
            id,
            registry: Arc::downgrade(&self.registry),
        }
    }

    /// Deliver `cart` to every observer registered at the time of the call.
    ///
    /// The lock is released before callbacks run, so an observer may drop its
    /// own subscription (or register another) while being notified.
    pub(crate) fn notify(&self, cart: &Cart) {
        let snapshot: Vec<Callback> = self
            .registry
            .lock()
            .callbacks
            .iter()
            .map(|(_, callback)| Arc::clone(callback))
            .collect();

        for callback in snapshot {
            callback(cart);
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.registry.lock().callbacks.len()
    }
}

/// Handle for a registered cart observer.
///
/// Dropping the handle (or calling [`Subscription::unsubscribe`]) removes the
/// observer. Use [`Subscription::detach`] to keep the observer registered for
/// the remaining lifetime of the store.
#[must_use = "dropping a Subscription immediately unsubscribes the observer"]
pub struct Subscription {
    id: u64,
    registry: Weak<Mutex<Registry>>,
}

impl Subscription {
    /// Remove the observer from the store.
    pub fn unsubscribe(self) {
        drop(self);
    }

    /// Keep the observer registered until the store itself is dropped.
    pub fn detach(mut self) {
        self.registry = Weak::new();
    }

    /// Whether the observer is still registered with a live store.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.registry
            .upgrade()
            .is_some_and(|registry| registry.lock().callbacks.iter().any(|(id, _)| *id == self.id))
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            registry.lock().callbacks.retain(|(id, _)| *id != self.id);
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("active", &self.is_active())
            .finish()
    }
}
