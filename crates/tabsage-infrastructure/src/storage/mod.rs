//! Storage primitives.
//!
//! - [`atomic_json`]: crash-safe JSON document files
//! - [`json_file_store`]: a [`KeyValueStore`](tabsage_core::storage::KeyValueStore) kept in one JSON file
//! - [`memory_store`]: an in-process store for tests and ephemeral runs

pub mod atomic_json;
pub mod json_file_store;
pub mod memory_store;

pub use atomic_json::{AtomicJsonFile, JsonFileError};
pub use json_file_store::JsonFileKeyValueStore;
pub use memory_store::MemoryKeyValueStore;
