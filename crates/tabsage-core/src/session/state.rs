//! Per-session query state machine.

use serde::{Deserialize, Serialize};
use std::fmt;

/// What a session is currently doing.
///
/// Every AI call moves the session out of `Idle` and back again; only one
/// non-idle state can be held at a time, which is what keeps at most one
/// call in flight per tab.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum QueryState {
    #[default]
    Idle,
    Summarizing,
    Asking,
    Searching,
}

impl QueryState {
    pub fn is_idle(&self) -> bool {
        matches!(self, QueryState::Idle)
    }

    /// Moves from `Idle` into `next`.
    ///
    /// Returns the state that blocked the transition when the session is
    /// already busy, or when `next` is `Idle` itself.
    pub fn begin(&mut self, next: QueryState) -> Result<(), QueryState> {
        if !self.is_idle() || next.is_idle() {
            return Err(*self);
        }
        *self = next;
        Ok(())
    }

    /// Returns to `Idle`.
    pub fn finish(&mut self) {
        *self = QueryState::Idle;
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            QueryState::Idle => "idle",
            QueryState::Summarizing => "summarizing",
            QueryState::Asking => "asking",
            QueryState::Searching => "searching",
        }
    }
}

impl fmt::Display for QueryState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_begin_from_idle() {
        let mut state = QueryState::Idle;
        assert!(state.begin(QueryState::Asking).is_ok());
        assert_eq!(state, QueryState::Asking);
    }

    #[test]
    fn test_begin_while_busy_reports_blocking_state() {
        let mut state = QueryState::Summarizing;
        assert_eq!(state.begin(QueryState::Searching), Err(QueryState::Summarizing));
        assert_eq!(state, QueryState::Summarizing);
    }

    #[test]
    fn test_begin_idle_is_rejected() {
        let mut state = QueryState::Idle;
        assert_eq!(state.begin(QueryState::Idle), Err(QueryState::Idle));
    }

    #[test]
    fn test_finish_returns_to_idle() {
        let mut state = QueryState::Searching;
        state.finish();
        assert!(state.is_idle());
    }
}
