//! # Session State
//!
//! Issues the client session identifier once and keeps returning it.
//!
//! ## Resolution
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  ensure_session()                                                       │
//! │       │                                                                 │
//! │       ├── already resolved this run ─────────────► same id              │
//! │       │                                                                 │
//! │       ├── stored id ─────────────────────────────► stored id            │
//! │       │                                                                 │
//! │       ├── nothing stored ──► generate ──► save ──► new id               │
//! │       │                                   │                             │
//! │       │                                   └─ save fails ─► degraded     │
//! │       │                                                                 │
//! │       └── storage unreadable ──► generate ───────► degraded             │
//! │                                                                         │
//! │  degraded: the id lives in memory only, for the rest of this run        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use storefront_core::SessionId;
use storefront_db::SessionRepository;
use tracing::{debug, info, warn};

/// Owner of the session identifier for one run of the client.
#[derive(Debug)]
pub struct SessionManager {
    sessions: SessionRepository,
    current: Option<SessionId>,
    degraded: bool,
}

impl SessionManager {
    pub fn new(sessions: SessionRepository) -> Self {
        SessionManager {
            sessions,
            current: None,
            degraded: false,
        }
    }

    /// Returns the session id, creating and persisting one on first use.
    ///
    /// Never fails: when storage is unavailable the id is kept in memory
    /// and [`is_degraded`](Self::is_degraded) reports it.
    pub async fn ensure_session(&mut self) -> SessionId {
        if let Some(id) = &self.current {
            return id.clone();
        }

        let id = match self.sessions.load().await {
            Ok(Some(id)) => {
                debug!(session_id = %id, "Restored session");
                id
            }
            Ok(None) => {
                let id = SessionId::generate();
                match self.sessions.save(&id).await {
                    Ok(()) => info!(session_id = %id, "Created session"),
                    Err(err) => {
                        warn!(error = %err, session_id = %id, "Session not persisted, keeping it in memory");
                        self.degraded = true;
                    }
                }
                id
            }
            Err(err) => {
                let id = SessionId::generate();
                warn!(error = %err, session_id = %id, "Session storage unreadable, keeping session in memory");
                self.degraded = true;
                id
            }
        };

        self.current = Some(id.clone());
        id
    }

    /// The resolved id, if `ensure_session` has run.
    pub fn current(&self) -> Option<&SessionId> {
        self.current.as_ref()
    }

    /// True when the id could not be persisted this run.
    pub fn is_degraded(&self) -> bool {
        self.degraded
    }
}
