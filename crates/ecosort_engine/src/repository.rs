use std::sync::Arc;

use ecosort_core::{SessionState, StoredSession};
use ecosort_logging::{eco_debug, eco_warn};

use crate::store::{KeyValueStore, StoreError};

pub const DEFAULT_NAMESPACE: &str = "ecosort_data";

/// Reads and writes a user's [`SessionState`] as JSON under `"<namespace>_<email>"`.
#[derive(Clone)]
pub struct SessionRepository {
    store: Arc<dyn KeyValueStore>,
    namespace: String,
}

impl SessionRepository {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self::with_namespace(store, DEFAULT_NAMESPACE)
    }

    pub fn with_namespace(store: Arc<dyn KeyValueStore>, namespace: impl Into<String>) -> Self {
        Self {
            store,
            namespace: namespace.into(),
        }
    }

    pub fn key_for(&self, identity: &str) -> String {
        format!("{}_{}", self.namespace, identity)
    }

    pub fn load(&self, identity: &str) -> Result<Option<SessionState>, StoreError> {
        let key = self.key_for(identity);
        let Some(raw) = self.store.get(&key)? else {
            eco_debug!("no stored session under {}", key);
            return Ok(None);
        };
        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|err| StoreError::Corrupt(err.to_string()))
    }

    pub fn save(&self, identity: &str, session: &SessionState) -> Result<(), StoreError> {
        let raw =
            serde_json::to_string(session).map_err(|err| StoreError::Corrupt(err.to_string()))?;
        self.store.put(&self.key_for(identity), &raw)
    }

    /// Load result in the shape sign-in expects. Failures are logged and
    /// reported as [`StoredSession::Unavailable`].
    pub fn load_for_sign_in(&self, identity: &str) -> StoredSession {
        match self.load(identity) {
            Ok(Some(session)) => StoredSession::Present(session),
            Ok(None) => StoredSession::Absent,
            Err(err) => {
                eco_warn!("stored session for {} unavailable: {}", identity, err);
                StoredSession::Unavailable(err.to_string())
            }
        }
    }
}
