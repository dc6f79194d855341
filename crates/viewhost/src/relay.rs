//! # Event Relay
//!
//! Routes inbound notifications to the listeners of the object a handle
//! names. One table per notification kind:
//!
//! - validity: one multi-subscriber emitter per handle.
//! - page info: one callback per wizard handle; a later set replaces it.
//! - clicks: one callback per button handle; a later set replaces it.
//!
//! ## Invariants
//!
//! - Firing for a handle with no table entry is a silent no-op.
//! - No table lock is held while a listener runs.

use std::sync::Arc;

use dashmap::DashMap;

use viewrpc::Handle;
use viewrpc::WizardPageChangeInfo;

use crate::event::Emitter;
use crate::event::Event;
use crate::proxy::WizardPage;

/// What the main side reports about a wizard's pages.
#[derive(Clone)]
pub enum WizardPageEvent {
    PageChanged(WizardPageChangeInfo),
    PagesUpdated { pages: Vec<WizardPage>, current_page: usize },
}

pub type PageInfoCallback = Arc<dyn Fn(WizardPageEvent) + Send + Sync>;
pub type ClickCallback = Arc<dyn Fn() + Send + Sync>;

#[derive(Default)]
pub struct EventRelay {
    validity: DashMap<Handle, Emitter<bool>>,
    page_info: DashMap<Handle, PageInfoCallback>,
    clicks: DashMap<Handle, ClickCallback>,
}

impl EventRelay {
    pub fn new() -> Self {
        Self::default()
    }

    /// The validity event for `handle`, creating its emitter on first use.
    pub fn validity_event(&self, handle: Handle) -> Event<bool> {
        self.validity.entry(handle).or_default().event()
    }

    pub fn fire_validity(&self, handle: Handle, valid: bool) -> bool {
        let Some(emitter) = self.validity.get(&handle).map(|entry| entry.clone()) else {
            return false;
        };
        emitter.fire(valid);
        true
    }

    pub fn set_page_info_callback(&self, handle: Handle, callback: PageInfoCallback) {
        self.page_info.insert(handle, callback);
    }

    pub fn page_info_callback(&self, handle: Handle) -> Option<PageInfoCallback> {
        self.page_info.get(&handle).map(|entry| entry.clone())
    }

    pub fn fire_page_info(&self, handle: Handle, event: WizardPageEvent) -> bool {
        let Some(callback) = self.page_info_callback(handle) else {
            return false;
        };
        callback(event);
        true
    }

    pub fn set_click_callback(&self, handle: Handle, callback: ClickCallback) {
        self.clicks.insert(handle, callback);
    }

    pub fn fire_click(&self, handle: Handle) -> bool {
        let Some(callback) = self.clicks.get(&handle).map(|entry| entry.clone()) else {
            return false;
        };
        callback();
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::atomic::AtomicUsize;
    use std::sync::atomic::Ordering;

    #[test]
    fn test_unknown_handles_are_dropped() {
        let relay = EventRelay::new();
        assert!(!relay.fire_click(Handle(99)));
        assert!(!relay.fire_validity(Handle(99), false));
        let info = WizardPageChangeInfo { last_page: None, new_page: 0 };
        assert!(!relay.fire_page_info(Handle(99), WizardPageEvent::PageChanged(info)));
    }

    #[test]
    fn test_click_callback_is_replaced() {
        let relay = EventRelay::new();
        let first = Arc::new(AtomicUsize::new(0));
        let second = Arc::new(AtomicUsize::new(0));

        let f = first.clone();
        relay.set_click_callback(Handle(1), Arc::new(move || { f.fetch_add(1, Ordering::SeqCst); }));
        let s = second.clone();
        relay.set_click_callback(Handle(1), Arc::new(move || { s.fetch_add(1, Ordering::SeqCst); }));

        assert!(relay.fire_click(Handle(1)));
        assert_eq!(first.load(Ordering::SeqCst), 0);
        assert_eq!(second.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_validity_reaches_every_subscriber() {
        let relay = EventRelay::new();
        let count = Arc::new(AtomicUsize::new(0));

        for _ in 0..2 {
            let c = count.clone();
            let _ = relay.validity_event(Handle(4)).subscribe(move |valid| {
                assert!(!*valid);
                c.fetch_add(1, Ordering::SeqCst);
            });
        }

        assert!(relay.fire_validity(Handle(4), false));
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }
}
