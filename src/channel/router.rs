//! Coordinator-side routing table.
//!
//! Maps page handles to their inboxes and keeps the list of settings
//! observers.  Sends are fire-and-forget: a message addressed to a page whose
//! inbox is gone is dropped with a debug log, never reported to the sender.

use std::collections::HashMap;

use tokio::sync::mpsc;

use super::message::{PageEvent, PageHandle, PageOutbox, SettingsEvent};

#[derive(Debug, Default)]
pub struct Router {
    routes: HashMap<PageHandle, PageOutbox>,
    observers: Vec<mpsc::UnboundedSender<SettingsEvent>>,
}

impl Router {
    pub fn new() -> Self {
        Self::default()
    }

    /// Route messages for `handle` to `outbox`, replacing any previous route.
    pub fn connect(&mut self, handle: PageHandle, outbox: PageOutbox) {
        self.routes.insert(handle, outbox);
    }

    pub fn disconnect(&mut self, handle: PageHandle) {
        self.routes.remove(&handle);
    }

    pub fn is_connected(&self, handle: PageHandle) -> bool {
        self.routes.contains_key(&handle)
    }

    /// Routed and the page's inbox still accepts messages.
    pub fn is_open(&self, handle: PageHandle) -> bool {
        self.routes
            .get(&handle)
            .is_some_and(|outbox| !outbox.is_closed())
    }

    /// Send `event` to one page.  Returns `false` when the destination is
    /// unknown or closed.
    pub fn send_to(&self, handle: PageHandle, event: PageEvent) -> bool {
        match self.routes.get(&handle) {
            Some(outbox) => {
                if outbox.send(event).is_err() {
                    log::debug!("router: {handle} inbox closed, message dropped");
                    return false;
                }
                true
            }
            None => {
                log::debug!("router: no route to {handle}, message dropped");
                false
            }
        }
    }

    /// Send a copy of `event` to every connected page.  Returns the number of
    /// pages that accepted it.
    pub fn broadcast_pages(&self, event: &PageEvent) -> usize {
        self.routes
            .keys()
            .filter(|&&handle| self.send_to(handle, event.clone()))
            .count()
    }

    pub fn add_observer(&mut self, observer: mpsc::UnboundedSender<SettingsEvent>) {
        self.observers.push(observer);
    }

    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }

    /// Send `event` to every settings observer, pruning closed ones.
    pub fn notify_observers(&mut self, event: SettingsEvent) {
        self.observers.retain(|observer| observer.send(event).is_ok());
    }

    /// Drop every route and observer.
    pub fn clear(&mut self) {
        self.routes.clear();
        self.observers.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn send_to_unknown_page_is_dropped() {
        let router = Router::new();
        assert!(!router.send_to(PageHandle::new(7), PageEvent::TriggerPulse));
    }

    #[test]
    fn send_to_closed_inbox_is_dropped() {
        let mut router = Router::new();
        let (tx, rx) = mpsc::unbounded_channel();
        router.connect(PageHandle::new(1), tx);
        assert!(router.is_open(PageHandle::new(1)));
        drop(rx);
        assert!(router.is_connected(PageHandle::new(1)));
        assert!(!router.is_open(PageHandle::new(1)));
        assert!(!router.send_to(PageHandle::new(1), PageEvent::TriggerPulse));
    }

    #[test]
    fn broadcast_reaches_every_page() {
        let mut router = Router::new();
        let (tx1, mut rx1) = mpsc::unbounded_channel();
        let (tx2, mut rx2) = mpsc::unbounded_channel();
        router.connect(PageHandle::new(1), tx1);
        router.connect(PageHandle::new(2), tx2);

        assert_eq!(router.broadcast_pages(&PageEvent::ConfigChanged(500)), 2);
        assert_eq!(rx1.try_recv().unwrap(), PageEvent::ConfigChanged(500));
        assert_eq!(rx2.try_recv().unwrap(), PageEvent::ConfigChanged(500));
    }

    #[test]
    fn closed_observers_are_pruned() {
        let mut router = Router::new();
        let (live, mut live_rx) = mpsc::unbounded_channel();
        let (dead, dead_rx) = mpsc::unbounded_channel();
        router.add_observer(live);
        router.add_observer(dead);
        drop(dead_rx);

        router.notify_observers(SettingsEvent::ConfigChanged(900));
        assert_eq!(router.observer_count(), 1);
        assert_eq!(live_rx.try_recv().unwrap(), SettingsEvent::ConfigChanged(900));
    }
}
