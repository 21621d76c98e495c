//! Coordinator loop: drains the request inbox into the [`Registry`].

use tokio::sync::mpsc;

use crate::channel::CoordinatorRequest;
use crate::store::KeyValueStore;

use super::registry::Registry;

pub struct Coordinator<K: KeyValueStore> {
    registry: Registry<K>,
}

impl<K: KeyValueStore> Coordinator<K> {
    pub fn new(registry: Registry<K>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &Registry<K> {
        &self.registry
    }

    /// Process requests until [`CoordinatorRequest::Shutdown`] arrives or
    /// every [`CoordinatorHandle`](crate::channel::CoordinatorHandle) is
    /// dropped.  Returns the registry in its final state.
    pub async fn run(
        mut self,
        mut inbox: mpsc::UnboundedReceiver<CoordinatorRequest>,
    ) -> Registry<K> {
        log::info!("coordinator: running");

        while let Some(request) = inbox.recv().await {
            if !self.handle(request).await {
                break;
            }
        }

        self.registry.shutdown();
        log::info!("coordinator: stopped");
        self.registry
    }

    /// Returns `false` when the loop should stop.
    async fn handle(&mut self, request: CoordinatorRequest) -> bool {
        match request {
            CoordinatorRequest::PageRegistered {
                handle,
                outbox,
                reply,
            } => {
                let min_ptt_length = self.registry.register_page(handle, outbox);
                if reply.send(min_ptt_length).is_err() {
                    log::debug!("coordinator: {handle} went away before registration reply");
                }
            }
            CoordinatorRequest::PageUnregistered { handle } => {
                self.registry.unregister_page(handle);
            }
            CoordinatorRequest::BroadcastingChanged {
                handle,
                broadcasting,
            } => {
                self.registry.set_broadcasting(handle, broadcasting);
            }
            CoordinatorRequest::ShortcutChanged { handle, shortcut } => {
                self.registry.update_shortcut(handle, shortcut);
            }
            CoordinatorRequest::SetMinPttLength { value } => {
                if let Err(e) = self.registry.set_min_ptt_length(value).await {
                    log::warn!("coordinator: {e}");
                }
            }
            CoordinatorRequest::SettingsOpened { observer, reply } => {
                let min_ptt_length = self.registry.open_settings(observer);
                let _ = reply.send(min_ptt_length);
            }
            CoordinatorRequest::TriggerPulse => {
                self.registry.trigger_pulse();
            }
            CoordinatorRequest::Shutdown => return false,
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::{CoordinatorHandle, PageEvent, PageHandle, SettingsEvent};
    use crate::coordinator::BadgeState;
    use crate::store::MemoryStore;

    async fn start() -> (
        CoordinatorHandle,
        tokio::task::JoinHandle<Registry<MemoryStore>>,
    ) {
        let registry = Registry::init(MemoryStore::new(), 800).await;
        let (handle, inbox) = CoordinatorHandle::channel();
        let task = tokio::spawn(Coordinator::new(registry).run(inbox));
        (handle, task)
    }

    #[tokio::test]
    async fn registration_replies_with_min_length() {
        let (coordinator, task) = start().await;
        let (outbox, _inbox) = mpsc::unbounded_channel();

        let value = coordinator
            .register_page(PageHandle::new(1), outbox)
            .await
            .unwrap();
        assert_eq!(value, 800);

        coordinator.shutdown().unwrap();
        let registry = task.await.unwrap();
        // Shutdown forgets every page.
        assert_eq!(registry.pages().count(), 0);
    }

    #[tokio::test]
    async fn settings_change_reaches_pages_and_observers() {
        let (coordinator, task) = start().await;
        let (outbox, mut page) = mpsc::unbounded_channel();
        coordinator
            .register_page(PageHandle::new(1), outbox)
            .await
            .unwrap();
        let (initial, mut settings) = coordinator.open_settings().await.unwrap();
        assert_eq!(initial, 800);

        coordinator.set_min_ptt_length(1200).unwrap();
        assert_eq!(page.recv().await, Some(PageEvent::ConfigChanged(1200)));
        assert_eq!(settings.recv().await, Some(SettingsEvent::ConfigChanged(1200)));

        coordinator.shutdown().unwrap();
        assert_eq!(task.await.unwrap().min_ptt_length(), 1200);
    }

    #[tokio::test]
    async fn trigger_is_fanned_out() {
        let (coordinator, task) = start().await;
        let (tx1, mut rx1) = mpsc::unbounded_channel();
        let (tx2, mut rx2) = mpsc::unbounded_channel();
        coordinator.register_page(PageHandle::new(1), tx1).await.unwrap();
        coordinator.register_page(PageHandle::new(2), tx2).await.unwrap();

        coordinator.trigger_pulse().unwrap();
        assert_eq!(rx1.recv().await, Some(PageEvent::TriggerPulse));
        assert_eq!(rx2.recv().await, Some(PageEvent::TriggerPulse));

        coordinator.shutdown().unwrap();
        task.await.unwrap();
    }

    #[tokio::test]
    async fn broadcast_notices_drive_the_badge() {
        let registry = Registry::init(MemoryStore::new(), 800).await;
        let mut badge = registry.subscribe_badge();
        let (coordinator, inbox) = CoordinatorHandle::channel();
        let task = tokio::spawn(Coordinator::new(registry).run(inbox));

        let (outbox, _page) = mpsc::unbounded_channel();
        let page = PageHandle::new(3);
        coordinator.register_page(page, outbox).await.unwrap();
        coordinator.set_broadcasting(page, true).unwrap();

        badge.changed().await.unwrap();
        assert_eq!(*badge.borrow_and_update(), BadgeState::On);

        coordinator.unregister_page(page).unwrap();
        badge.changed().await.unwrap();
        assert_eq!(*badge.borrow_and_update(), BadgeState::Off);

        coordinator.shutdown().unwrap();
        task.await.unwrap();
    }

    #[tokio::test]
    async fn loop_ends_when_every_handle_is_dropped() {
        let (coordinator, task) = start().await;
        drop(coordinator);
        task.await.unwrap();
    }
}
