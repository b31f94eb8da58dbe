//! Session domain module.
//!
//! # Module Structure
//!
//! - `model`: Per-tab session entity (`Session`, `TabId`)
//! - `search_log`: Append-only search results (`SearchResult`, `SearchResultLog`)
//! - `state`: Query state machine (`QueryState`)
//! - `repository`: Repository trait for session persistence

mod model;
mod repository;
mod search_log;
mod state;

pub use model::{Session, TabId, storage_key, tab_id_from_key};
pub use repository::SessionRepository;
pub use search_log::{SearchResult, SearchResultLog};
pub use state::QueryState;
