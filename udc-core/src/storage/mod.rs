//! Storage module
//!
//! The durable key-value namespace shared by every store. Each key holds
//! one whole collection serialized as JSON; collections are always read
//! and written wholesale.

pub mod memory;

pub use memory::MemoryStore;

use crate::error::Result;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// String-keyed store of JSON documents
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read the raw value of a key
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Replace the value of a key
    async fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Remove a key; removing an absent key succeeds
    async fn remove(&self, key: &str) -> Result<()>;
}

/// Read and decode a JSON value
pub async fn load_json<T: DeserializeOwned>(
    store: &dyn KeyValueStore,
    key: &str,
) -> Result<Option<T>> {
    match store.get(key).await? {
        Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
        None => Ok(None),
    }
}

/// Encode and write a JSON value
pub async fn save_json<T: Serialize + ?Sized>(
    store: &dyn KeyValueStore,
    key: &str,
    value: &T,
) -> Result<()> {
    let raw = serde_json::to_string(value)?;
    store.set(key, &raw).await?;
    tracing::debug!("Persisted {} ({} bytes)", key, raw.len());
    Ok(())
}
