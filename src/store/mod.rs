//! Persistent key-value store used by the coordinator.
//!
//! The store holds JSON values under string keys.  Only the coordinator
//! reads and writes it; today the single durable value is
//! [`MIN_PTT_LENGTH_KEY`].
//!
//! * [`JsonFileStore`]: one JSON object on disk, rewritten on every `set`.
//! * [`MemoryStore`] : process-lifetime map for tests and ephemeral runs.

pub mod file;
pub mod memory;

pub use file::JsonFileStore;
pub use memory::MemoryStore;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

/// Key under which MinPttLength (milliseconds) is persisted.
pub const MIN_PTT_LENGTH_KEY: &str = "minPttLength";

// ---------------------------------------------------------------------------
// StoreError
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum StoreError {
    /// Reading or writing the backing file failed.
    #[error("store I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// The backing file is not a JSON object.
    #[error("store contents are not valid JSON: {0}")]
    Corrupt(#[from] serde_json::Error),
}

// ---------------------------------------------------------------------------
// KeyValueStore trait
// ---------------------------------------------------------------------------

/// Async get/set of JSON values.
///
/// Implementors must be `Send + Sync` so the coordinator task can own them.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Fetch the value stored under `key`, or `None` if it was never set.
    async fn get(&self, key: &str) -> Result<Option<Value>, StoreError>;

    /// Store `value` under `key`, replacing any previous value.
    async fn set(&self, key: &str, value: Value) -> Result<(), StoreError>;
}
