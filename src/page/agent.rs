//! Per-page agent loop.
//!
//! One agent runs per page hosting the target app.  It owns the page's
//! [`PttWindow`] and [`PageObserver`], registers with the coordinator, and
//! then drains its inbox until [`PageEvent::Teardown`]:
//!
//! | Event | Effect |
//! |-------|--------|
//! | `TriggerPulse` | [`PttWindow::trigger_pulse`] |
//! | `WindowElapsed(id)` | [`PttWindow::on_timer`] |
//! | `ConfigChanged(ms)` | new initial delay for the next window |
//! | `StorageWrite` | observer → window shortcut + coordinator notices |
//! | `Teardown` | cancel the window, unsubscribe, unregister, exit |

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;

use crate::channel::{ChannelError, CoordinatorHandle, PageEvent, PageHandle, PageOutbox};
use crate::ptt::{KeySink, PttWindow};

use super::observer::{ObserverEvent, PageObserver};
use super::storage::PageStorage;

pub struct PageAgent<S: KeySink> {
    handle: PageHandle,
    coordinator: CoordinatorHandle,
    storage: Arc<dyn PageStorage>,
    observer: PageObserver,
    window: PttWindow<S>,
    inbox: mpsc::UnboundedReceiver<PageEvent>,
    outbox: PageOutbox,
}

impl<S: KeySink> PageAgent<S> {
    /// Build an agent for `handle`.  The returned outbox is how the page's
    /// lifecycle reaches the agent (most importantly `Teardown`).
    ///
    /// `initial_delay` is only used until the coordinator replies to
    /// registration with the live MinPttLength.
    pub fn new(
        handle: PageHandle,
        coordinator: CoordinatorHandle,
        storage: Arc<dyn PageStorage>,
        sink: S,
        initial_delay: Duration,
        min_gap: Duration,
    ) -> (Self, PageOutbox) {
        let (outbox, inbox) = mpsc::unbounded_channel();
        let window = PttWindow::new(sink, outbox.clone(), initial_delay, min_gap);
        let agent = Self {
            handle,
            coordinator,
            storage,
            observer: PageObserver::new(),
            window,
            inbox,
            outbox: outbox.clone(),
        };
        (agent, outbox)
    }

    pub fn handle(&self) -> PageHandle {
        self.handle
    }

    /// Register, report the page's current state, and process events until
    /// teardown.
    ///
    /// Fails only when the coordinator is unreachable at registration.
    pub async fn run(mut self) -> Result<(), ChannelError> {
        let handle = self.handle;
        let min_ptt_length = self
            .coordinator
            .register_page(handle, self.outbox.clone())
            .await?;
        self.window
            .set_initial_delay(Duration::from_millis(u64::from(min_ptt_length)));
        log::info!("page: {handle} registered, window {min_ptt_length} ms");

        let writes = self.outbox.clone();
        let subscription = self.storage.subscribe(Arc::new(move |key, value| {
            let _ = writes.send(PageEvent::StorageWrite {
                key: key.to_string(),
                value: value.map(str::to_string),
            });
        }));

        let initial = self.observer.start(self.storage.as_ref());
        self.forward(initial);

        while let Some(event) = self.inbox.recv().await {
            match event {
                PageEvent::TriggerPulse => self.window.trigger_pulse(),
                PageEvent::WindowElapsed(id) => self.window.on_timer(id),
                PageEvent::ConfigChanged(ms) => {
                    log::debug!("page: {handle} window now {ms} ms");
                    self.window
                        .set_initial_delay(Duration::from_millis(u64::from(ms)));
                }
                PageEvent::StorageWrite { key, value } => {
                    let events = self.observer.on_write(&key, value.as_deref());
                    self.forward(events);
                }
                PageEvent::Teardown => break,
            }
        }

        self.window.teardown();
        self.storage.unsubscribe(subscription);
        if self.coordinator.unregister_page(handle).is_err() {
            log::debug!("page: coordinator gone before {handle} unregistered");
        }
        log::info!("page: {handle} torn down");
        Ok(())
    }

    fn forward(&mut self, events: Vec<ObserverEvent>) {
        for event in events {
            let sent = match event {
                ObserverEvent::ShortcutChanged(shortcut) => {
                    self.window.set_shortcut(shortcut.clone());
                    self.coordinator.shortcut_changed(self.handle, shortcut)
                }
                ObserverEvent::BroadcastingChanged(broadcasting) => {
                    self.coordinator.set_broadcasting(self.handle, broadcasting)
                }
            };
            if sent.is_err() {
                log::debug!("page: coordinator gone, notice from {} dropped", self.handle);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::CoordinatorRequest;
    use crate::coordinator::{BadgeState, Coordinator, Registry};
    use crate::page::storage::MemoryPageStorage;
    use crate::ptt::sink::testing::RecordingSink;
    use crate::ptt::KeyDirection;
    use crate::shortcut::{PttShortcut, ShortcutSpec, MEDIA_ENGINE_KEY, SELECTED_CHANNEL_KEY};
    use crate::store::MemoryStore;
    use tokio::time::Instant;

    const CTRL_SHIFT: &str =
        r#"{"default":{"mode":"PUSH_TO_TALK","modeOptions":{"shortcut":[[0,16,4],[0,17,4]]}}}"#;
    const CONNECTED: &str = r#"{"selectedVoiceChannelId":"1","lastConnectedTime":5}"#;
    const GAP: Duration = Duration::from_millis(100);
    const TOLERANCE: Duration = Duration::from_millis(5);

    struct Harness {
        coordinator: CoordinatorHandle,
        storage: Arc<MemoryPageStorage>,
        sink: RecordingSink,
        page: PageOutbox,
        agent: tokio::task::JoinHandle<Result<(), ChannelError>>,
        service: tokio::task::JoinHandle<Registry<MemoryStore>>,
        badge: tokio::sync::watch::Receiver<BadgeState>,
    }

    async fn harness(storage: MemoryPageStorage) -> Harness {
        let registry = Registry::init(MemoryStore::new(), 800).await;
        let badge = registry.subscribe_badge();
        let (coordinator, inbox) = CoordinatorHandle::channel();
        let service = tokio::spawn(Coordinator::new(registry).run(inbox));

        let storage = Arc::new(storage);
        let sink = RecordingSink::default();
        let (agent, page) = PageAgent::new(
            PageHandle::new(1),
            coordinator.clone(),
            storage.clone(),
            sink.clone(),
            Duration::from_millis(1),
            GAP,
        );
        let agent = tokio::spawn(agent.run());

        Harness {
            coordinator,
            storage,
            sink,
            page,
            agent,
            service,
            badge,
        }
    }

    /// With the clock paused, time only advances once every task is idle.
    async fn settle() {
        tokio::time::sleep(Duration::from_millis(1)).await;
    }

    #[tokio::test(start_paused = true)]
    async fn pulse_burst_becomes_one_key_press() {
        let storage = MemoryPageStorage::new();
        storage.set_item(MEDIA_ENGINE_KEY, CTRL_SHIFT);
        let h = harness(storage).await;
        settle().await;

        let start = Instant::now();
        h.coordinator.trigger_pulse().unwrap();
        tokio::time::sleep(Duration::from_millis(500)).await;
        h.coordinator.trigger_pulse().unwrap();
        tokio::time::sleep(Duration::from_secs(2)).await;

        let events = h.sink.events();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].direction, KeyDirection::Down);
        assert_eq!(events[1].direction, KeyDirection::Up);
        let held = events[1].at - start;
        assert!(
            held >= Duration::from_millis(800) && held < Duration::from_millis(800) + TOLERANCE,
            "released after {held:?}"
        );
        assert_eq!(events[0].event.key_code, 17);

        h.page.send(PageEvent::Teardown).unwrap();
        h.agent.await.unwrap().unwrap();
        h.coordinator.shutdown().unwrap();
        h.service.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn storage_writes_reach_window_and_registry() {
        let mut h = harness(MemoryPageStorage::new()).await;
        settle().await;

        h.storage.set_item(MEDIA_ENGINE_KEY, CTRL_SHIFT);
        h.storage.set_item(SELECTED_CHANNEL_KEY, CONNECTED);

        h.badge.changed().await.unwrap();
        assert_eq!(*h.badge.borrow_and_update(), BadgeState::On);

        h.page.send(PageEvent::Teardown).unwrap();
        h.agent.await.unwrap().unwrap();
        // Unregistering the broadcaster switches the badge off.
        h.badge.changed().await.unwrap();
        assert_eq!(*h.badge.borrow(), BadgeState::Off);

        h.coordinator.shutdown().unwrap();
        let registry = h.service.await.unwrap();
        assert!(registry.pages().next().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn config_change_applies_to_next_window() {
        let storage = MemoryPageStorage::new();
        storage.set_item(MEDIA_ENGINE_KEY, CTRL_SHIFT);
        let h = harness(storage).await;
        settle().await;

        h.coordinator.set_min_ptt_length(300).unwrap();
        settle().await;

        let start = Instant::now();
        h.coordinator.trigger_pulse().unwrap();
        tokio::time::sleep(Duration::from_secs(1)).await;

        let events = h.sink.events();
        assert_eq!(events.len(), 2);
        let held = events[1].at - start;
        assert!(
            held >= Duration::from_millis(300) && held < Duration::from_millis(300) + TOLERANCE,
            "released after {held:?}"
        );

        h.page.send(PageEvent::Teardown).unwrap();
        h.agent.await.unwrap().unwrap();
        h.coordinator.shutdown().unwrap();
        h.service.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn teardown_while_active_suppresses_key_up() {
        let storage = MemoryPageStorage::new();
        storage.set_item(MEDIA_ENGINE_KEY, CTRL_SHIFT);
        let h = harness(storage).await;
        settle().await;

        h.coordinator.trigger_pulse().unwrap();
        settle().await;
        h.page.send(PageEvent::Teardown).unwrap();
        h.agent.await.unwrap().unwrap();
        tokio::time::sleep(Duration::from_secs(2)).await;

        assert_eq!(h.sink.count(KeyDirection::Down), 1);
        assert_eq!(h.sink.count(KeyDirection::Up), 0);
        assert_eq!(h.storage.subscriber_count(), 0);

        h.coordinator.shutdown().unwrap();
        h.service.await.unwrap();
    }

    #[tokio::test]
    async fn initial_state_is_reported_on_start() {
        let (coordinator, mut inbox) = CoordinatorHandle::channel();
        let storage = MemoryPageStorage::new();
        storage.set_item(MEDIA_ENGINE_KEY, CTRL_SHIFT);
        let (agent, page) = PageAgent::new(
            PageHandle::new(9),
            coordinator,
            Arc::new(storage),
            RecordingSink::default(),
            Duration::from_millis(800),
            GAP,
        );
        let task = tokio::spawn(agent.run());

        match inbox.recv().await {
            Some(CoordinatorRequest::PageRegistered { reply, .. }) => reply.send(800).unwrap(),
            other => panic!("expected registration, got {other:?}"),
        }
        match inbox.recv().await {
            Some(CoordinatorRequest::ShortcutChanged { handle, shortcut }) => {
                assert_eq!(handle, PageHandle::new(9));
                assert_eq!(shortcut, PttShortcut::Enabled(ShortcutSpec::new([16, 17])));
            }
            other => panic!("expected shortcut notice, got {other:?}"),
        }
        match inbox.recv().await {
            Some(CoordinatorRequest::BroadcastingChanged { broadcasting, .. }) => {
                assert!(!broadcasting)
            }
            other => panic!("expected broadcasting notice, got {other:?}"),
        }

        page.send(PageEvent::Teardown).unwrap();
        task.await.unwrap().unwrap();
        assert!(matches!(
            inbox.recv().await,
            Some(CoordinatorRequest::PageUnregistered { .. })
        ));
    }

    #[tokio::test]
    async fn run_fails_without_coordinator() {
        let (coordinator, inbox) = CoordinatorHandle::channel();
        drop(inbox);
        let (agent, _page) = PageAgent::new(
            PageHandle::new(1),
            coordinator,
            Arc::new(MemoryPageStorage::new()),
            RecordingSink::default(),
            Duration::from_millis(800),
            GAP,
        );
        assert_eq!(agent.run().await, Err(ChannelError::Closed));
    }
}
