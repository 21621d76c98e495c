//! Page-side key/value storage with write notifications.
//!
//! Mirrors the browser's `localStorage`: string values under string keys,
//! synchronous access.  Every write (including removal) is reported to all
//! subscribers as `(key, value)`, which is how the page observer learns that
//! the target app rewrote its configuration.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

/// Callback invoked after every write.  `None` means the key was removed.
pub type StorageCallback = Arc<dyn Fn(&str, Option<&str>) + Send + Sync>;

/// Identifies one subscription so it can be cancelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

pub trait PageStorage: Send + Sync {
    fn get_item(&self, key: &str) -> Option<String>;

    fn set_item(&self, key: &str, value: &str);

    fn remove_item(&self, key: &str);

    /// Register `callback` for every later write.
    fn subscribe(&self, callback: StorageCallback) -> SubscriptionId;

    fn unsubscribe(&self, id: SubscriptionId);
}

// ---------------------------------------------------------------------------
// MemoryPageStorage
// ---------------------------------------------------------------------------

#[derive(Default)]
struct Inner {
    items: HashMap<String, String>,
    subscribers: Vec<(SubscriptionId, StorageCallback)>,
    next_id: u64,
}

/// Process-local [`PageStorage`].
#[derive(Default)]
pub struct MemoryPageStorage {
    inner: Mutex<Inner>,
}

impl MemoryPageStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        // A panicking subscriber never runs under the lock, so the data is
        // still consistent after poisoning.
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Snapshot of every stored item.
    pub fn items(&self) -> HashMap<String, String> {
        self.lock().items.clone()
    }

    pub fn subscriber_count(&self) -> usize {
        self.lock().subscribers.len()
    }

    /// Apply a write and notify subscribers outside the lock, so callbacks
    /// may read the storage back.
    fn write(&self, key: &str, value: Option<&str>) {
        let subscribers: Vec<StorageCallback> = {
            let mut inner = self.lock();
            match value {
                Some(v) => {
                    inner.items.insert(key.to_string(), v.to_string());
                }
                None => {
                    inner.items.remove(key);
                }
            }
            inner.subscribers.iter().map(|(_, cb)| Arc::clone(cb)).collect()
        };

        for callback in subscribers {
            callback(key, value);
        }
    }
}

impl PageStorage for MemoryPageStorage {
    fn get_item(&self, key: &str) -> Option<String> {
        self.lock().items.get(key).cloned()
    }

    fn set_item(&self, key: &str, value: &str) {
        self.write(key, Some(value));
    }

    fn remove_item(&self, key: &str) {
        self.write(key, None);
    }

    fn subscribe(&self, callback: StorageCallback) -> SubscriptionId {
        let mut inner = self.lock();
        inner.next_id += 1;
        let id = SubscriptionId(inner.next_id);
        inner.subscribers.push((id, callback));
        id
    }

    fn unsubscribe(&self, id: SubscriptionId) {
        self.lock().subscribers.retain(|(sub, _)| *sub != id);
    }
}
