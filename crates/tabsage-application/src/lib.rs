//! Application layer for TabSage.
//!
//! Wires context resolution, prompt rendering, provider dispatch and the
//! per-tab session store into the [`QueryOrchestrator`].

pub mod context_resolver;
pub mod orchestrator;
pub mod prompts;
pub mod session;

pub use context_resolver::ContextResolver;
pub use orchestrator::{QueryOrchestrator, SUGGESTIONS};
pub use prompts::PromptBuilder;
pub use session::SessionStore;
