//! # Events
//!
//! A small multi-subscriber emitter. `Emitter` is the firing side and stays
//! with the owner; `Event` is the subscribe-only view handed out to consumers.
//!
//! ## Invariants
//!
//! - Listeners run synchronously, on the firing thread, in subscription order.
//! - The listener list is snapshotted before firing, so a listener may
//!   subscribe or dispose without deadlocking; changes apply from the next fire.
//! - Dropping a `Subscription` does not unsubscribe. Call `dispose`.

use std::sync::Arc;
use std::sync::Weak;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;

use parking_lot::Mutex;

type Listener<T> = Arc<dyn Fn(&T) + Send + Sync>;

struct Listeners<T> {
    next_id: AtomicU64,
    entries: Mutex<Vec<(u64, Listener<T>)>>,
}

impl<T> Listeners<T> {
    fn new() -> Self {
        Self { next_id: AtomicU64::new(0), entries: Mutex::new(Vec::new()) }
    }

    fn remove(&self, id: u64) {
        self.entries.lock().retain(|(entry, _)| *entry != id);
    }
}

/// The firing side of an event.
pub struct Emitter<T> {
    listeners: Arc<Listeners<T>>,
}

impl<T: 'static> Emitter<T> {
    pub fn new() -> Self {
        Self { listeners: Arc::new(Listeners::new()) }
    }

    /// A subscribe-only view of this emitter.
    pub fn event(&self) -> Event<T> {
        Event { listeners: self.listeners.clone() }
    }

    /// Delivers `value` to every current listener.
    pub fn fire(&self, value: T) {
        let snapshot: Vec<Listener<T>> = self
            .listeners
            .entries
            .lock()
            .iter()
            .map(|(_, listener)| listener.clone())
            .collect();

        for listener in snapshot {
            listener(&value);
        }
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.entries.lock().len()
    }
}

impl<T: 'static> Default for Emitter<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for Emitter<T> {
    fn clone(&self) -> Self {
        Self { listeners: self.listeners.clone() }
    }
}

/// The subscribe side of an event.
pub struct Event<T> {
    listeners: Arc<Listeners<T>>,
}

impl<T: 'static> Event<T> {
    /// An event with no emitter behind it. Subscribing is allowed; nothing
    /// ever fires.
    pub fn detached() -> Self {
        Emitter::new().event()
    }

    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        let id = self.listeners.next_id.fetch_add(1, Ordering::Relaxed);
        self.listeners.entries.lock().push((id, Arc::new(listener)));

        let weak: Weak<Listeners<T>> = Arc::downgrade(&self.listeners);
        Subscription {
            dispose: Some(Box::new(move || {
                if let Some(listeners) = weak.upgrade() {
                    listeners.remove(id);
                }
            })),
        }
    }
}

impl<T> Clone for Event<T> {
    fn clone(&self) -> Self {
        Self { listeners: self.listeners.clone() }
    }
}

/// A registered listener. Keep it to unsubscribe later.
pub struct Subscription {
    dispose: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
    pub fn dispose(mut self) {
        if let Some(dispose) = self.dispose.take() {
            dispose();
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").field("active", &self.dispose.is_some()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::atomic::AtomicUsize;

    #[test]
    fn test_listeners_fire_in_order() {
        let emitter = Emitter::<u32>::new();
        let seen = Arc::new(Mutex::new(Vec::new()));

        let a = seen.clone();
        let _s1 = emitter.event().subscribe(move |v| a.lock().push(("a", *v)));
        let b = seen.clone();
        let _s2 = emitter.event().subscribe(move |v| b.lock().push(("b", *v)));

        emitter.fire(7);
        assert_eq!(*seen.lock(), vec![("a", 7), ("b", 7)]);
    }

    #[test]
    fn test_dispose_removes_listener() {
        let emitter = Emitter::<()>::new();
        let count = Arc::new(AtomicUsize::new(0));

        let c = count.clone();
        let sub = emitter.event().subscribe(move |_| { c.fetch_add(1, Ordering::SeqCst); });
        emitter.fire(());
        sub.dispose();
        emitter.fire(());

        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert_eq!(emitter.listener_count(), 0);
    }

    #[test]
    fn test_listener_may_subscribe_while_firing() {
        let emitter = Emitter::<()>::new();
        let event = emitter.event();
        let inner_count = Arc::new(AtomicUsize::new(0));

        let ev = event.clone();
        let ic = inner_count.clone();
        let _outer = event.subscribe(move |_| {
            let ic = ic.clone();
            let _ = ev.subscribe(move |_| { ic.fetch_add(1, Ordering::SeqCst); });
        });

        emitter.fire(());
        assert_eq!(inner_count.load(Ordering::SeqCst), 0);
        emitter.fire(());
        assert_eq!(inner_count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_detached_event_never_fires() {
        let event = Event::<bool>::detached();
        let _sub = event.subscribe(|_| panic!("must not fire"));
    }
}
