//! Error types for TabSage.

use crate::session::TabId;
use thiserror::Error;

/// A shared error type for every TabSage crate.
///
/// Variants map onto the failure classes the orchestrator distinguishes:
/// input validation, provider lookup and dispatch, scope tag parsing,
/// persistence, and per-session re-entrancy.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TabSageError {
    /// The request was rejected before any network call (e.g. empty query).
    #[error("Validation error: {0}")]
    Validation(String),

    /// No provider is registered under the requested model id.
    #[error("Unknown provider: '{id}'")]
    UnknownProvider { id: String },

    /// The upstream AI service failed (network, auth, quota, malformed body).
    #[error("Provider '{provider}' failed: {cause}")]
    Provider { provider: String, cause: String },

    /// A scope tag could not be decoded.
    #[error("Scope tag parse error: {0}")]
    ScopeParse(String),

    /// Durable storage could not be read or written.
    #[error("Storage error: {0}")]
    Storage(String),

    /// Another AI call is already in flight for this tab.
    #[error("Session for tab {tab_id} is busy ({state})")]
    Busy { tab_id: TabId, state: String },

    /// The tab was torn down while its request was in flight.
    #[error("Session for tab {tab_id} was closed")]
    SessionClosed { tab_id: TabId },

    /// Entity not found error with type information
    #[error("Entity not found: {entity_type} '{id}'")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },

    /// IO error (file system operations)
    #[error("IO error: {message}")]
    Io { message: String },

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization {
        format: String, // "TOML", "JSON", etc.
        message: String,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl TabSageError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    /// Creates a Validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Creates an UnknownProvider error
    pub fn unknown_provider(id: impl Into<String>) -> Self {
        Self::UnknownProvider { id: id.into() }
    }

    /// Creates a Provider error tagged with the provider name
    pub fn provider(provider: impl Into<String>, cause: impl Into<String>) -> Self {
        Self::Provider {
            provider: provider.into(),
            cause: cause.into(),
        }
    }

    /// Creates a Storage error
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage(message.into())
    }

    /// Creates a NotFound error
    pub fn not_found(entity_type: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type,
            id: id.into(),
        }
    }

    /// Creates a Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    // ============================================================================
    // Type checking methods
    // ============================================================================

    /// Check if this is a Validation error
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Check if this is an UnknownProvider error
    pub fn is_unknown_provider(&self) -> bool {
        matches!(self, Self::UnknownProvider { .. })
    }

    /// Check if this is a Provider error
    pub fn is_provider(&self) -> bool {
        matches!(self, Self::Provider { .. })
    }

    /// Check if this is a Storage error
    pub fn is_storage(&self) -> bool {
        matches!(self, Self::Storage(_))
    }

    /// Check if this is a Busy error
    pub fn is_busy(&self) -> bool {
        matches!(self, Self::Busy { .. })
    }

    /// Check if this is a NotFound error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<std::io::Error> for TabSageError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for TabSageError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for TabSageError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::ser::Error> for TabSageError {
    fn from(err: toml::ser::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<anyhow::Error> for TabSageError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

impl From<String> for TabSageError {
    fn from(err: String) -> Self {
        Self::Internal(err)
    }
}

/// A type alias for `Result<T, TabSageError>`.
pub type Result<T> = std::result::Result<T, TabSageError>;
