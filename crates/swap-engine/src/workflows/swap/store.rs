use super::domain::SessionId;
use super::session::SwapSession;

/// In-process registry of open swap sessions so the service can be exercised in isolation.
pub trait SessionStore: Send + Sync {
    fn insert(&self, session: SwapSession) -> Result<SwapSession, StoreError>;
    fn update(&self, session: SwapSession) -> Result<(), StoreError>;
    fn fetch(&self, id: &SessionId) -> Result<Option<SwapSession>, StoreError>;
    fn remove(&self, id: &SessionId) -> Result<Option<SwapSession>, StoreError>;
}

/// Error enumeration for session store failures.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("session already exists")]
    Conflict,
    #[error("session not found")]
    NotFound,
    #[error("session store unavailable: {0}")]
    Unavailable(String),
}
