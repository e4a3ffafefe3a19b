//! # Session Repository
//!
//! Persists the session identifier under `cart_session_id`.

use storefront_core::{SessionId, SESSION_ID_KEY};
use tracing::warn;

use super::local_state::LocalStateRepository;
use crate::error::DbResult;

/// Repository for the persisted session identifier.
#[derive(Debug, Clone)]
pub struct SessionRepository {
    state: LocalStateRepository,
}

impl SessionRepository {
    pub fn new(state: LocalStateRepository) -> Self {
        SessionRepository { state }
    }

    /// Loads the stored session id.
    ///
    /// A stored value that is not a valid id is deleted and reported as
    /// absent, so a fresh id gets issued.
    pub async fn load(&self) -> DbResult<Option<SessionId>> {
        let Some(raw) = self.state.get(SESSION_ID_KEY).await? else {
            return Ok(None);
        };

        match SessionId::parse(&raw) {
            Ok(id) => Ok(Some(id)),
            Err(err) => {
                warn!(error = %err, "Discarding invalid stored session id");
                self.state.delete(SESSION_ID_KEY).await?;
                Ok(None)
            }
        }
    }

    pub async fn save(&self, id: &SessionId) -> DbResult<()> {
        self.state.put(SESSION_ID_KEY, id.as_str()).await
    }
}
