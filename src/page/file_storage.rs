//! [`PageStorage`] backed by a JSON file that other programs may rewrite.
//!
//! The file holds one JSON object.  String values are stored as-is; any
//! other JSON value is stored as its serialised text, so a blob can be
//! written either as an escaped string or as a plain nested object.
//!
//! Nothing watches the file: a polling task re-reads it and replays every
//! changed key as a storage write, which is what subscribers would have seen
//! had the app written through [`PageStorage::set_item`].

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use serde_json::{Map, Value};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::shortcut::{encode_shortcut, parse_combo, PttShortcut, ShortcutError, MEDIA_ENGINE_KEY};
use crate::store::StoreError;

use super::storage::{MemoryPageStorage, PageStorage, StorageCallback, SubscriptionId};

pub struct FilePageStorage {
    path: PathBuf,
    memory: MemoryPageStorage,
}

impl FilePageStorage {
    /// Load `path` (a missing file is empty storage).
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let storage = Self {
            memory: MemoryPageStorage::new(),
            path,
        };
        for (key, value) in read_items(&storage.path).await? {
            storage.memory.set_item(&key, &value);
        }
        log::info!("page-storage: opened {}", storage.path.display());
        Ok(storage)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Re-read the file and report each added, changed or removed key to
    /// subscribers.  Returns the number of keys reported.
    pub async fn reload(&self) -> Result<usize, StoreError> {
        let fresh = read_items(&self.path).await?;
        let current = self.memory.items();
        let mut reported = 0;

        for (key, value) in &fresh {
            if current.get(key) != Some(value) {
                self.memory.set_item(key, value);
                reported += 1;
            }
        }
        for key in current.keys().filter(|k| !fresh.contains_key(*k)) {
            self.memory.remove_item(key);
            reported += 1;
        }

        if reported > 0 {
            log::debug!("page-storage: {reported} keys changed on disk");
        }
        Ok(reported)
    }

    /// Reload every `interval` until the returned task is aborted.
    pub fn spawn_polling(self: Arc<Self>, interval: Duration) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            let mut failing = false;

            loop {
                ticker.tick().await;
                match self.reload().await {
                    Ok(_) if failing => {
                        log::info!("page-storage: {} readable again", self.path.display());
                        failing = false;
                    }
                    Ok(_) => {}
                    // Logged once per failure streak; the file is polled often.
                    Err(e) if !failing => {
                        log::warn!("page-storage: reading {} failed: {e}", self.path.display());
                        failing = true;
                    }
                    Err(_) => {}
                }
            }
        })
    }

    /// Blocking write: [`PageStorage`] setters are synchronous, like
    /// `localStorage`, so the file is written before `set_item` returns.
    fn persist(&self) -> Result<(), StoreError> {
        let items: BTreeMap<String, String> = self.memory.items().into_iter().collect();
        let content = serde_json::to_string_pretty(&items)?;
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, content)?;
        Ok(())
    }
}

impl PageStorage for FilePageStorage {
    fn get_item(&self, key: &str) -> Option<String> {
        self.memory.get_item(key)
    }

    fn set_item(&self, key: &str, value: &str) {
        self.memory.set_item(key, value);
        if let Err(e) = self.persist() {
            log::error!("page-storage: couldn't write {}: {e}", self.path.display());
        }
    }

    fn remove_item(&self, key: &str) {
        self.memory.remove_item(key);
        if let Err(e) = self.persist() {
            log::error!("page-storage: couldn't write {}: {e}", self.path.display());
        }
    }

    fn subscribe(&self, callback: StorageCallback) -> SubscriptionId {
        self.memory.subscribe(callback)
    }

    fn unsubscribe(&self, id: SubscriptionId) {
        self.memory.unsubscribe(id)
    }
}

/// Write a push-to-talk blob for `combo` unless the storage already holds
/// one.  Returns `true` when a blob was written.
pub fn seed_shortcut(storage: &dyn PageStorage, combo: &str) -> Result<bool, ShortcutError> {
    if storage.get_item(MEDIA_ENGINE_KEY).is_some() {
        return Ok(false);
    }
    let shortcut = PttShortcut::Enabled(parse_combo(combo)?);
    storage.set_item(MEDIA_ENGINE_KEY, &encode_shortcut(&shortcut));
    log::info!("page-storage: seeded shortcut {shortcut}");
    Ok(true)
}

async fn read_items(path: &Path) -> Result<HashMap<String, String>, StoreError> {
    let content = match tokio::fs::read_to_string(path).await {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(HashMap::new()),
        Err(e) => return Err(e.into()),
    };
    if content.trim().is_empty() {
        return Ok(HashMap::new());
    }

    let map: Map<String, Value> = serde_json::from_str(&content)?;
    Ok(map
        .into_iter()
        .map(|(key, value)| {
            let text = match value {
                Value::String(s) => s,
                other => other.to_string(),
            };
            (key, text)
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shortcut::{parse_shortcut, ShortcutSpec};
    use std::sync::Mutex;
    use tempfile::tempdir;
    use tokio::sync::mpsc;

    type Seen = Arc<Mutex<Vec<(String, Option<String>)>>>;

    fn record(storage: &FilePageStorage) -> Seen {
        let seen: Seen = Arc::default();
        let sink = Arc::clone(&seen);
        storage.subscribe(Arc::new(move |key, value| {
            sink.lock()
                .unwrap()
                .push((key.to_string(), value.map(str::to_string)));
        }));
        seen
    }

    #[tokio::test]
    async fn missing_file_is_empty() {
        let dir = tempdir().expect("temp dir");
        let storage = FilePageStorage::open(dir.path().join("none.json")).await.unwrap();
        assert_eq!(storage.get_item("anything"), None);
    }

    #[tokio::test]
    async fn non_string_values_are_serialised() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("page.json");
        std::fs::write(&path, r#"{"plain":"x","nested":{"a":1}}"#).unwrap();

        let storage = FilePageStorage::open(&path).await.unwrap();
        assert_eq!(storage.get_item("plain").as_deref(), Some("x"));
        assert_eq!(storage.get_item("nested").as_deref(), Some(r#"{"a":1}"#));
    }

    #[tokio::test]
    async fn reload_reports_only_changes() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("page.json");
        std::fs::write(&path, r#"{"a":"1","b":"2"}"#).unwrap();
        let storage = FilePageStorage::open(&path).await.unwrap();
        let seen = record(&storage);

        assert_eq!(storage.reload().await.unwrap(), 0);

        std::fs::write(&path, r#"{"a":"1","b":"3","c":"4"}"#).unwrap();
        assert_eq!(storage.reload().await.unwrap(), 2);

        std::fs::write(&path, r#"{"a":"1"}"#).unwrap();
        assert_eq!(storage.reload().await.unwrap(), 2);

        let mut seen = seen.lock().unwrap().clone();
        seen.sort();
        assert_eq!(
            seen,
            vec![
                ("b".to_string(), None),
                ("b".to_string(), Some("3".to_string())),
                ("c".to_string(), None),
                ("c".to_string(), Some("4".to_string())),
            ]
        );
    }

    #[tokio::test]
    async fn corrupt_file_is_an_error() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("page.json");
        std::fs::write(&path, "not json").unwrap();
        assert!(matches!(
            FilePageStorage::open(&path).await,
            Err(StoreError::Corrupt(_))
        ));
    }

    #[tokio::test]
    async fn writes_are_persisted() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("nested").join("page.json");
        let storage = FilePageStorage::open(&path).await.unwrap();

        storage.set_item("k", "v");
        let reopened = FilePageStorage::open(&path).await.unwrap();
        assert_eq!(reopened.get_item("k").as_deref(), Some("v"));

        storage.remove_item("k");
        let reopened = FilePageStorage::open(&path).await.unwrap();
        assert_eq!(reopened.get_item("k"), None);
    }

    /// Setters are usable from plain threads and the file is current when
    /// they return.
    #[test]
    fn set_item_writes_before_returning() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("sync").join("page.json");
        let rt = tokio::runtime::Builder::new_current_thread()
            .build()
            .expect("runtime");
        let storage = rt.block_on(FilePageStorage::open(&path)).unwrap();
        drop(rt);

        storage.set_item("k", "v");
        let on_disk = std::fs::read_to_string(&path).unwrap();
        assert!(on_disk.contains(r#""k": "v""#));
    }

    #[tokio::test]
    async fn seed_writes_once() {
        let dir = tempdir().expect("temp dir");
        let storage = FilePageStorage::open(dir.path().join("page.json")).await.unwrap();

        assert!(seed_shortcut(&storage, "Ctrl+Shift").unwrap());
        let blob = storage.get_item(MEDIA_ENGINE_KEY);
        assert_eq!(
            parse_shortcut(blob.as_deref()),
            PttShortcut::Enabled(ShortcutSpec::new([16, 17]))
        );

        assert!(!seed_shortcut(&storage, "Alt").unwrap());
        assert_eq!(storage.get_item(MEDIA_ENGINE_KEY), blob);
    }

    #[tokio::test]
    async fn seed_rejects_bad_combo() {
        let dir = tempdir().expect("temp dir");
        let storage = FilePageStorage::open(dir.path().join("page.json")).await.unwrap();
        assert!(seed_shortcut(&storage, "Ctrl+Nope").is_err());
        assert_eq!(storage.get_item(MEDIA_ENGINE_KEY), None);
    }

    #[tokio::test]
    async fn polling_picks_up_external_edits() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("page.json");
        let storage = Arc::new(FilePageStorage::open(&path).await.unwrap());

        let (tx, mut rx) = mpsc::unbounded_channel();
        storage.subscribe(Arc::new(move |key, value| {
            let _ = tx.send((key.to_string(), value.map(str::to_string)));
        }));
        let poller = Arc::clone(&storage).spawn_polling(Duration::from_millis(10));

        std::fs::write(&path, r#"{"k":"edited"}"#).unwrap();
        let got = tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .expect("poll never reported the edit");
        assert_eq!(got, Some(("k".to_string(), Some("edited".to_string()))));

        poller.abort();
    }
}
