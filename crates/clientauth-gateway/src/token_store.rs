//! The single session token slot of a gateway instance.

use std::sync::{PoisonError, RwLock};

use tokio::sync::{Mutex, MutexGuard};

/// Holds at most one session token.
///
/// Reads are taken at call time, so a request always carries whatever token
/// is current when it is built. Login, refresh and logout hold
/// [`TokenStore::session`] for their whole round trip so that they apply in
/// order.
#[derive(Debug, Default)]
pub struct TokenStore {
    slot: RwLock<Option<String>>,
    session: Mutex<()>,
}

impl TokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> Option<String> {
        self.slot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn set(&self, token: impl Into<String>) {
        let token = token.into();
        let mut slot = self.slot.write().unwrap_or_else(PoisonError::into_inner);
        *slot = (!token.is_empty()).then_some(token);
    }

    pub fn clear(&self) {
        *self.slot.write().unwrap_or_else(PoisonError::into_inner) = None;
    }

    pub fn is_empty(&self) -> bool {
        self.get().is_none()
    }

    /// Serializes token lifecycle operations.
    pub async fn session(&self) -> MutexGuard<'_, ()> {
        self.session.lock().await
    }
}
