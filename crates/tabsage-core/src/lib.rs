//! Core domain for TabSage.
//!
//! Holds the per-tab session model, query scopes, the provider contract,
//! collaborator interfaces and the shared error type. Nothing in this crate
//! performs I/O.

pub mod config;
pub mod context;
pub mod error;
pub mod provider;
pub mod scope;
pub mod session;
pub mod storage;

// Re-export common error type
pub use error::{Result, TabSageError};
