//! Data Transfer Objects (DTOs) for persistence.
//!
//! DTOs describe the stored record layout. The domain model never sees
//! field renames.
//!
//! ### Session record history
//! - Initial layout: `summary`, `answer`, `searchResults`, `darkMode`,
//!   `currentModel` under the `tab_{id}` key.
//! - `savedAt` added for retention; older records without it sort as oldest.

mod session;

pub use session::{SearchResultRecord, SessionRecord};
