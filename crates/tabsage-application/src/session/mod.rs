//! Per-tab session lifecycle.
//!
//! - `store`: live session cache over the session repository
//! - `tab_session`: one tab's session and query state guard

mod store;
mod tab_session;

pub use store::SessionStore;
pub use tab_session::{InFlight, TabSession};
