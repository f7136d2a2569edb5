//! Default bearer-token holder. Durable storage (keychain, disk) is a
//! different adapter behind the same port.

use std::sync::RwLock;

use td_core::ports::TokenStorePort;

#[derive(Default)]
pub struct InMemoryTokenStore {
    token: RwLock<Option<String>>,
}

impl InMemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TokenStorePort for InMemoryTokenStore {
    fn get(&self) -> Option<String> {
        // A poisoned lock only means a writer panicked mid-assignment of
        // an Option; the value is still usable.
        self.token
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    fn set(&self, token: String) {
        *self.token.write().unwrap_or_else(|e| e.into_inner()) = Some(token);
    }

    fn clear(&self) {
        *self.token.write().unwrap_or_else(|e| e.into_inner()) = None;
    }
}
