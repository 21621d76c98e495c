//! Page/broadcast registry: the coordinator's exclusive state.
//!
//! Owns:
//! * the set of live [`PageRegistration`]s, keyed by [`PageHandle`];
//! * the single broadcasting page (or none);
//! * the live MinPttLength and its persistence;
//! * the [`Router`] used to fan messages out and the [`BadgeProjector`].
//!
//! Notices from pages arrive in any order.  Every operation is therefore
//! written to be safe against stale input: a "stopped broadcasting" notice
//! only clears the broadcaster when it comes from that very page, and
//! notices about unknown pages are logged and ignored.

use std::collections::BTreeMap;

use serde_json::Value;
use thiserror::Error;
use tokio::sync::{mpsc, watch};

use crate::channel::{PageEvent, PageHandle, PageOutbox, Router, SettingsEvent};
use crate::config::DEFAULT_MIN_PTT_LENGTH_MS;
use crate::shortcut::PttShortcut;
use crate::store::{KeyValueStore, MIN_PTT_LENGTH_KEY};

use super::badge::{BadgeProjector, BadgeState};

// ---------------------------------------------------------------------------
// RegistryError
// ---------------------------------------------------------------------------

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    /// MinPttLength must be a positive number of milliseconds.
    #[error("invalid minimum PTT length: {0} ms")]
    InvalidMinPttLength(u32),
}

// ---------------------------------------------------------------------------
// PageRegistration
// ---------------------------------------------------------------------------

/// What the coordinator knows about one page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRegistration {
    pub handle: PageHandle,
    /// Last shortcut the page reported.  Informational only.
    pub shortcut: PttShortcut,
    /// Cleared when the page's inbox is found closed.
    pub live: bool,
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

pub struct Registry<K: KeyValueStore> {
    store: K,
    pages: BTreeMap<PageHandle, PageRegistration>,
    broadcaster: Option<PageHandle>,
    min_ptt_length: u32,
    router: Router,
    badge: BadgeProjector,
}

impl<K: KeyValueStore> Registry<K> {
    /// Load MinPttLength from `store` (falling back to `default_min_ptt_length`)
    /// and start with no pages and no broadcaster.
    ///
    /// A zero default is replaced by [`DEFAULT_MIN_PTT_LENGTH_MS`].
    pub async fn init(store: K, default_min_ptt_length: u32) -> Self {
        let default_min_ptt_length = if default_min_ptt_length == 0 {
            log::warn!(
                "registry: default min PTT length must be positive, \
                 using {DEFAULT_MIN_PTT_LENGTH_MS} ms"
            );
            DEFAULT_MIN_PTT_LENGTH_MS
        } else {
            default_min_ptt_length
        };

        let min_ptt_length = match store.get(MIN_PTT_LENGTH_KEY).await {
            Ok(Some(value)) => stored_length(&value).unwrap_or_else(|| {
                log::warn!(
                    "registry: ignoring stored {MIN_PTT_LENGTH_KEY}={value}, \
                     using {default_min_ptt_length} ms"
                );
                default_min_ptt_length
            }),
            Ok(None) => default_min_ptt_length,
            Err(e) => {
                log::warn!("registry: couldn't read {MIN_PTT_LENGTH_KEY} ({e}), using default");
                default_min_ptt_length
            }
        };

        log::info!("registry: initialised, min PTT length {min_ptt_length} ms");

        Self {
            store,
            pages: BTreeMap::new(),
            broadcaster: None,
            min_ptt_length,
            router: Router::new(),
            badge: BadgeProjector::new(),
        }
    }

    /// Forget every page and observer and switch the badge off.
    pub fn shutdown(&mut self) {
        self.pages.clear();
        self.router.clear();
        self.broadcaster = None;
        self.badge.project(None);
        log::info!("registry: shut down");
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    pub fn min_ptt_length(&self) -> u32 {
        self.min_ptt_length
    }

    pub fn broadcaster(&self) -> Option<PageHandle> {
        self.broadcaster
    }

    pub fn page(&self, handle: PageHandle) -> Option<&PageRegistration> {
        self.pages.get(&handle)
    }

    pub fn pages(&self) -> impl Iterator<Item = &PageRegistration> {
        self.pages.values()
    }

    pub fn badge(&self) -> BadgeState {
        self.badge.current()
    }

    pub fn subscribe_badge(&self) -> watch::Receiver<BadgeState> {
        self.badge.subscribe()
    }

    // -----------------------------------------------------------------------
    // Page lifecycle
    // -----------------------------------------------------------------------

    /// Add (or replace) the registration for `handle` and route its messages
    /// to `outbox`.  Returns the current MinPttLength.
    pub fn register_page(&mut self, handle: PageHandle, outbox: PageOutbox) -> u32 {
        let previous = self.pages.insert(
            handle,
            PageRegistration {
                handle,
                shortcut: PttShortcut::Disabled,
                live: true,
            },
        );
        self.router.connect(handle, outbox);

        if previous.is_some() {
            log::debug!("registry: {handle} registered again");
        } else {
            log::info!("registry: {handle} registered ({} pages)", self.pages.len());
        }
        self.min_ptt_length
    }

    /// Remove `handle`.  If it was broadcasting, the broadcast state is
    /// cleared and the badge switched off.
    pub fn unregister_page(&mut self, handle: PageHandle) {
        self.router.disconnect(handle);
        if self.pages.remove(&handle).is_none() {
            log::warn!("registry: unregister for unknown {handle} ignored");
        } else {
            log::info!("registry: {handle} unregistered ({} pages)", self.pages.len());
        }

        if self.broadcaster == Some(handle) {
            self.broadcaster = None;
            self.badge.project(None);
        }
    }

    /// Record a page's broadcasting notice.
    ///
    /// * `true` always takes over, even from another page.
    /// * `false` only clears the state when `handle` is the current
    ///   broadcaster; a late notice from any other page is ignored.
    pub fn set_broadcasting(&mut self, handle: PageHandle, broadcasting: bool) {
        if broadcasting {
            if !self.pages.contains_key(&handle) {
                log::warn!("registry: broadcasting notice from unknown {handle} ignored");
                return;
            }
            if let Some(previous) = self.broadcaster.filter(|&p| p != handle) {
                log::info!("registry: {handle} takes over broadcasting from {previous}");
            }
            self.broadcaster = Some(handle);
        } else if self.broadcaster == Some(handle) {
            self.broadcaster = None;
        } else if self.broadcaster.is_none() {
            log::debug!("registry: {handle} is not broadcasting");
            return;
        } else {
            log::warn!(
                "registry: stop-broadcasting from {handle} ignored (broadcaster is {:?})",
                self.broadcaster
            );
            return;
        }

        self.badge.project(self.broadcaster);
    }

    /// Record the shortcut a page reported.
    pub fn update_shortcut(&mut self, handle: PageHandle, shortcut: PttShortcut) {
        match self.pages.get_mut(&handle) {
            Some(page) => {
                log::debug!("registry: {handle} shortcut is now {shortcut}");
                page.shortcut = shortcut;
            }
            None => log::warn!("registry: shortcut notice from unknown {handle} ignored"),
        }
    }

    // -----------------------------------------------------------------------
    // Configuration
    // -----------------------------------------------------------------------

    /// Subscribe a settings surface and return the current MinPttLength.
    pub fn open_settings(&mut self, observer: mpsc::UnboundedSender<SettingsEvent>) -> u32 {
        self.router.add_observer(observer);
        self.min_ptt_length
    }

    /// Persist `value` and fan it out to every page and settings observer.
    ///
    /// A failed write is logged; the new value is still applied and fanned
    /// out so that every context agrees on it.
    pub async fn set_min_ptt_length(&mut self, value: u32) -> Result<(), RegistryError> {
        if value == 0 {
            return Err(RegistryError::InvalidMinPttLength(value));
        }

        if let Err(e) = self.store.set(MIN_PTT_LENGTH_KEY, Value::from(value)).await {
            log::error!("registry: couldn't persist {MIN_PTT_LENGTH_KEY}={value}: {e}");
        }

        self.min_ptt_length = value;
        let reached = self.router.broadcast_pages(&PageEvent::ConfigChanged(value));
        self.router.notify_observers(SettingsEvent::ConfigChanged(value));
        self.mark_unreachable();

        log::info!(
            "registry: min PTT length {value} ms sent to {reached} pages, {} observers",
            self.router.observer_count()
        );
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Trigger fan-out
    // -----------------------------------------------------------------------

    /// Forward one trigger pulse to every registered page.
    pub fn trigger_pulse(&mut self) -> usize {
        let reached = self.router.broadcast_pages(&PageEvent::TriggerPulse);
        self.mark_unreachable();
        log::trace!("registry: trigger pulse sent to {reached} pages");
        reached
    }

    /// Flag pages whose inbox has closed without an unregister notice.
    fn mark_unreachable(&mut self) {
        for page in self.pages.values_mut() {
            let live = self.router.is_open(page.handle);
            if page.live && !live {
                log::debug!("registry: {} is no longer reachable", page.handle);
            }
            page.live = live;
        }
    }
}

/// A stored MinPttLength, if it is a positive integer that fits in `u32`.
fn stored_length(value: &Value) -> Option<u32> {
    value
        .as_u64()
        .filter(|&v| v > 0)
        .and_then(|v| u32::try_from(v).ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shortcut::ShortcutSpec;
    use crate::store::{MemoryStore, StoreError};
    use async_trait::async_trait;
    use serde_json::json;

    const A: PageHandle = PageHandle::new(1);
    const B: PageHandle = PageHandle::new(2);

    /// Store whose writes always fail.
    struct ReadOnlyStore;

    #[async_trait]
    impl KeyValueStore for ReadOnlyStore {
        async fn get(&self, _key: &str) -> Result<Option<Value>, StoreError> {
            Ok(None)
        }

        async fn set(&self, _key: &str, _value: Value) -> Result<(), StoreError> {
            Err(StoreError::Io(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                "read-only",
            )))
        }
    }

    async fn registry() -> Registry<MemoryStore> {
        Registry::init(MemoryStore::new(), 800).await
    }

    fn inbox() -> (PageOutbox, mpsc::UnboundedReceiver<PageEvent>) {
        mpsc::unbounded_channel()
    }

    #[tokio::test]
    async fn init_uses_default_then_stored_value() {
        assert_eq!(registry().await.min_ptt_length(), 800);

        let stored = MemoryStore::with_entries([(MIN_PTT_LENGTH_KEY, json!(1500))]);
        assert_eq!(Registry::init(stored, 800).await.min_ptt_length(), 1500);
    }

    #[tokio::test]
    async fn init_rejects_nonsense_stored_values() {
        for bad in [json!(0), json!(-3), json!("fast"), json!(1.5)] {
            let stored = MemoryStore::with_entries([(MIN_PTT_LENGTH_KEY, bad)]);
            assert_eq!(Registry::init(stored, 800).await.min_ptt_length(), 800);
        }
    }

    #[tokio::test]
    async fn zero_default_falls_back_to_builtin_length() {
        let mut registry = Registry::init(MemoryStore::new(), 0).await;
        assert_eq!(registry.min_ptt_length(), DEFAULT_MIN_PTT_LENGTH_MS);

        // A stored zero must not fall through to the zero default either.
        let stored = MemoryStore::with_entries([(MIN_PTT_LENGTH_KEY, json!(0))]);
        assert_eq!(
            Registry::init(stored, 0).await.min_ptt_length(),
            DEFAULT_MIN_PTT_LENGTH_MS
        );

        let (tx, _rx) = inbox();
        assert_eq!(registry.register_page(A, tx), DEFAULT_MIN_PTT_LENGTH_MS);
    }

    #[tokio::test]
    async fn register_returns_current_length_and_is_idempotent() {
        let mut reg = registry().await;
        let (tx, _rx) = inbox();
        assert_eq!(reg.register_page(A, tx.clone()), 800);
        assert_eq!(reg.register_page(A, tx), 800);
        assert_eq!(reg.pages().count(), 1);
        assert!(reg.page(A).unwrap().live);
    }

    #[tokio::test]
    async fn new_broadcaster_takes_over() {
        let mut reg = registry().await;
        let (tx, _rx) = inbox();
        reg.register_page(A, tx.clone());
        reg.register_page(B, tx);

        reg.set_broadcasting(A, true);
        reg.set_broadcasting(B, true);
        assert_eq!(reg.broadcaster(), Some(B));
        assert_eq!(reg.badge(), BadgeState::On);
    }

    #[tokio::test]
    async fn stale_stop_notice_does_not_clear_other_page() {
        let mut reg = registry().await;
        let (tx, _rx) = inbox();
        reg.register_page(A, tx.clone());
        reg.register_page(B, tx);

        reg.set_broadcasting(A, true);
        reg.set_broadcasting(B, false);
        assert_eq!(reg.broadcaster(), Some(A));
        assert_eq!(reg.badge(), BadgeState::On);

        reg.set_broadcasting(A, false);
        assert_eq!(reg.broadcaster(), None);
        assert_eq!(reg.badge(), BadgeState::Off);
    }

    #[tokio::test]
    async fn unregistering_broadcaster_turns_badge_off() {
        let mut reg = registry().await;
        let (tx, _rx) = inbox();
        reg.register_page(A, tx);
        reg.set_broadcasting(A, true);

        reg.unregister_page(A);
        assert_eq!(reg.broadcaster(), None);
        assert_eq!(reg.badge(), BadgeState::Off);
        assert!(reg.page(A).is_none());
    }

    #[tokio::test]
    async fn unregistering_other_page_keeps_broadcaster() {
        let mut reg = registry().await;
        let (tx, _rx) = inbox();
        reg.register_page(A, tx.clone());
        reg.register_page(B, tx);
        reg.set_broadcasting(A, true);

        reg.unregister_page(B);
        assert_eq!(reg.broadcaster(), Some(A));
        // Unknown handle: logged, ignored.
        reg.unregister_page(PageHandle::new(99));
        assert_eq!(reg.pages().count(), 1);
    }

    #[tokio::test]
    async fn broadcasting_from_unknown_page_is_ignored() {
        let mut reg = registry().await;
        reg.set_broadcasting(A, true);
        assert_eq!(reg.broadcaster(), None);
        assert_eq!(reg.badge(), BadgeState::Off);
    }

    #[tokio::test]
    async fn min_length_is_persisted_and_fanned_out() {
        let mut reg = registry().await;
        let (tx_a, mut rx_a) = inbox();
        let (tx_b, mut rx_b) = inbox();
        let (observer, mut settings) = mpsc::unbounded_channel();
        reg.register_page(A, tx_a);
        reg.register_page(B, tx_b);
        assert_eq!(reg.open_settings(observer), 800);

        reg.set_min_ptt_length(450).await.unwrap();

        assert_eq!(reg.min_ptt_length(), 450);
        assert_eq!(reg.store.get(MIN_PTT_LENGTH_KEY).await.unwrap(), Some(json!(450)));
        assert_eq!(rx_a.try_recv().unwrap(), PageEvent::ConfigChanged(450));
        assert_eq!(rx_b.try_recv().unwrap(), PageEvent::ConfigChanged(450));
        assert_eq!(settings.try_recv().unwrap(), SettingsEvent::ConfigChanged(450));
    }

    #[tokio::test]
    async fn zero_min_length_is_rejected() {
        let mut reg = registry().await;
        assert_eq!(
            reg.set_min_ptt_length(0).await,
            Err(RegistryError::InvalidMinPttLength(0))
        );
        assert_eq!(reg.min_ptt_length(), 800);
    }

    #[tokio::test]
    async fn failed_persist_still_applies_value() {
        let mut reg = Registry::init(ReadOnlyStore, 800).await;
        let (tx, mut rx) = inbox();
        reg.register_page(A, tx);

        reg.set_min_ptt_length(1000).await.unwrap();
        assert_eq!(reg.min_ptt_length(), 1000);
        assert_eq!(rx.try_recv().unwrap(), PageEvent::ConfigChanged(1000));
    }

    #[tokio::test]
    async fn trigger_reaches_every_live_page() {
        let mut reg = registry().await;
        let (tx_a, mut rx_a) = inbox();
        let (tx_b, rx_b) = inbox();
        reg.register_page(A, tx_a);
        reg.register_page(B, tx_b);
        drop(rx_b);

        assert_eq!(reg.trigger_pulse(), 1);
        assert_eq!(rx_a.try_recv().unwrap(), PageEvent::TriggerPulse);
        assert!(reg.page(A).unwrap().live);
        assert!(!reg.page(B).unwrap().live);
    }

    #[tokio::test]
    async fn shortcut_updates_are_recorded() {
        let mut reg = registry().await;
        let (tx, _rx) = inbox();
        reg.register_page(A, tx);

        let shortcut = PttShortcut::Enabled(ShortcutSpec::new([16, 17]));
        reg.update_shortcut(A, shortcut.clone());
        assert_eq!(reg.page(A).unwrap().shortcut, shortcut);

        reg.update_shortcut(B, shortcut);
        assert!(reg.page(B).is_none());
    }

    #[tokio::test]
    async fn shutdown_forgets_everything() {
        let mut reg = registry().await;
        let (tx, _rx) = inbox();
        reg.register_page(A, tx);
        reg.set_broadcasting(A, true);

        reg.shutdown();
        assert_eq!(reg.pages().count(), 0);
        assert_eq!(reg.broadcaster(), None);
        assert_eq!(reg.badge(), BadgeState::Off);
    }
}
