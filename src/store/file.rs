//! JSON-file backed [`KeyValueStore`].
//!
//! The whole store is one JSON object.  It is loaded lazily on first access
//! and written back in full after every `set`, creating parent directories as
//! needed.  A missing file is an empty store.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde_json::{Map, Value};
use tokio::sync::Mutex;

use super::{KeyValueStore, StoreError};

#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    cache: Mutex<Option<Map<String, Value>>>,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            cache: Mutex::new(None),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> Result<Map<String, Value>, StoreError> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(content) if content.trim().is_empty() => Ok(Map::new()),
            Ok(content) => Ok(serde_json::from_str(&content)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Map::new()),
            Err(e) => Err(e.into()),
        }
    }
}

#[async_trait]
impl KeyValueStore for JsonFileStore {
    async fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        let mut cache = self.cache.lock().await;
        if cache.is_none() {
            *cache = Some(self.load().await?);
        }
        Ok(cache.as_ref().and_then(|map| map.get(key).cloned()))
    }

    async fn set(&self, key: &str, value: Value) -> Result<(), StoreError> {
        let mut cache = self.cache.lock().await;
        let mut map = match cache.take() {
            Some(map) => map,
            None => self.load().await?,
        };
        map.insert(key.to_string(), value);

        let content = serde_json::to_string_pretty(&map)?;
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let written = tokio::fs::write(&self.path, content).await;
        *cache = Some(map);
        written?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    #[tokio::test]
    async fn missing_file_is_empty() {
        let dir = tempdir().expect("temp dir");
        let store = JsonFileStore::new(dir.path().join("state.json"));
        assert_eq!(store.get("minPttLength").await.unwrap(), None);
    }

    #[tokio::test]
    async fn values_survive_a_new_instance() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("nested").join("state.json");

        let store = JsonFileStore::new(&path);
        store.set("minPttLength", json!(650)).await.unwrap();
        store.set("other", json!({"a": 1})).await.unwrap();

        let reopened = JsonFileStore::new(&path);
        assert_eq!(reopened.get("minPttLength").await.unwrap(), Some(json!(650)));
        assert_eq!(reopened.get("other").await.unwrap(), Some(json!({"a": 1})));
    }

    #[tokio::test]
    async fn corrupt_file_is_an_error() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("state.json");
        std::fs::write(&path, "{oops").unwrap();

        let store = JsonFileStore::new(&path);
        assert!(matches!(
            store.get("minPttLength").await,
            Err(StoreError::Corrupt(_))
        ));
    }
}
