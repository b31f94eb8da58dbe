use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tabsage_core::session::{QueryState, Session, TabId};
use tabsage_core::{Result, TabSageError};

/// Live state of one tab: its session plus the query state machine.
///
/// The session sits behind an async mutex so commits and preference updates
/// serialize. The state is a plain mutex because it is only held for the
/// length of a transition.
pub struct TabSession {
    tab_id: TabId,
    session: tokio::sync::Mutex<Session>,
    state: Mutex<QueryState>,
}

impl TabSession {
    pub fn new(session: Session) -> Self {
        Self {
            tab_id: session.tab_id,
            session: tokio::sync::Mutex::new(session),
            state: Mutex::new(QueryState::Idle),
        }
    }

    pub fn tab_id(&self) -> TabId {
        self.tab_id
    }

    pub fn state(&self) -> QueryState {
        *self.lock_state()
    }

    /// Moves the tab out of `Idle`; the returned guard moves it back on drop.
    ///
    /// # Errors
    ///
    /// `TabSageError::Busy` when another call is already in flight.
    pub fn begin(self: &Arc<Self>, next: QueryState) -> Result<InFlight> {
        self.lock_state()
            .begin(next)
            .map_err(|current| TabSageError::Busy {
                tab_id: self.tab_id,
                state: current.to_string(),
            })?;

        tracing::debug!("[TabSession] tab {} -> {}", self.tab_id, next);
        Ok(InFlight {
            tab: Arc::clone(self),
        })
    }

    /// Copy of the current session.
    pub async fn snapshot(&self) -> Session {
        self.session.lock().await.clone()
    }

    pub async fn lock(&self) -> tokio::sync::MutexGuard<'_, Session> {
        self.session.lock().await
    }

    fn lock_state(&self) -> MutexGuard<'_, QueryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// An AI call in flight. Dropping it returns the tab to `Idle`, including
/// when the call fails or its future is dropped.
pub struct InFlight {
    tab: Arc<TabSession>,
}

impl Drop for InFlight {
    fn drop(&mut self) {
        self.tab.lock_state().finish();
        tracing::debug!("[TabSession] tab {} -> idle", self.tab.tab_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_begin_is_exclusive_until_guard_drops() {
        let tab = Arc::new(TabSession::new(Session::new(1, "gemini")));

        let guard = tab.begin(QueryState::Asking).unwrap();
        assert_eq!(tab.state(), QueryState::Asking);

        let err = tab.begin(QueryState::Searching).err().unwrap();
        assert_eq!(
            err,
            TabSageError::Busy {
                tab_id: 1,
                state: "asking".into()
            }
        );

        drop(guard);
        assert!(tab.state().is_idle());
        assert!(tab.begin(QueryState::Summarizing).is_ok());
    }
}
