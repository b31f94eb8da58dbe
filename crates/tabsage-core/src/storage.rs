//! Key-value storage collaborator.
//!
//! Mirrors the browser extension storage contract: values are JSON documents
//! addressed by string keys, read in batches and written as whole records.

use crate::error::Result;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;

/// Durable key-value store.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Returns the stored values for the requested keys; missing keys are omitted.
    async fn get(&self, keys: &[String]) -> Result<HashMap<String, Value>>;

    /// Writes every entry of `record`, replacing existing values wholesale.
    async fn set(&self, record: HashMap<String, Value>) -> Result<()>;

    /// Removes the given keys (missing keys are ignored).
    async fn remove(&self, keys: &[String]) -> Result<()>;

    /// Lists all stored keys.
    async fn keys(&self) -> Result<Vec<String>>;
}
