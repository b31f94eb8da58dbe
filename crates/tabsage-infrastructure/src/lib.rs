//! Infrastructure layer for TabSage.
//!
//! File-backed implementations of the core storage and content-index
//! contracts, plus configuration loading.

pub mod config_service;
pub mod dto;
pub mod kv_session_repository;
pub mod page_archive;
pub mod paths;
pub mod storage;

pub use config_service::ConfigService;
pub use kv_session_repository::KeyValueSessionRepository;
pub use page_archive::PageArchive;
pub use paths::TabSagePaths;
pub use storage::{JsonFileKeyValueStore, MemoryKeyValueStore};
