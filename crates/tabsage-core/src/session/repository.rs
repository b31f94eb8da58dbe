//! Session repository trait.
//!
//! Defines the interface for session persistence operations.

use super::model::{Session, TabId};
use crate::error::Result;
use async_trait::async_trait;

/// An abstract repository for persisting per-tab sessions.
///
/// Saves overwrite the whole record; implementations never merge fields.
/// There is exactly one writer per tab, so last-write-wins is safe.
#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Loads the session stored for `tab_id`.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(Session))`: Session found
    /// - `Ok(None)`: No record for this tab
    /// - `Err(_)`: Error occurred during retrieval
    async fn load(&self, tab_id: TabId) -> Result<Option<Session>>;

    /// Writes the complete session record.
    async fn save(&self, session: &Session) -> Result<()>;

    /// Deletes the record for `tab_id` (no-op when absent).
    async fn delete(&self, tab_id: TabId) -> Result<()>;

    /// Lists the tab ids that currently have a stored record.
    async fn list_tab_ids(&self) -> Result<Vec<TabId>>;
}
