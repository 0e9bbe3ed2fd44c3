//! Bearer token storage
//!
//! The gateway reads the token before every request. Storage failures are
//! logged and swallowed: a missing token only means requests go out
//! unauthenticated.

use keyring::Entry;
use std::sync::RwLock;
use tracing::{debug, error, info, warn};

use crate::error::AppError;

/// Key the token is stored under
const TOKEN_KEY: &str = "auth_token";

/// Key-value storage for the bearer token
pub trait TokenStore: Send + Sync {
    fn store(&self, token: &str);
    fn get(&self) -> Option<String>;
    fn remove(&self);
}

/// Token storage backed by the platform keychain
pub struct KeyringTokenStore {
    service: String,
}

impl KeyringTokenStore {
    pub fn new(service: &str) -> Self {
        Self {
            service: service.to_string(),
        }
    }

    fn entry(&self) -> Result<Entry, AppError> {
        Ok(Entry::new(&self.service, TOKEN_KEY)?)
    }
}

impl TokenStore for KeyringTokenStore {
    fn store(&self, token: &str) {
        let result = self.entry().and_then(|e| Ok(e.set_password(token)?));
        match result {
            Ok(()) => info!("Stored auth token"),
            Err(e) => error!("Failed to store auth token: {}", e),
        }
    }

    fn get(&self) -> Option<String> {
        let entry = match self.entry() {
            Ok(e) => e,
            Err(e) => {
                error!("Failed to retrieve auth token: {}", e);
                return None;
            }
        };

        match entry.get_password() {
            Ok(token) => {
                debug!("Retrieved auth token");
                Some(token)
            }
            Err(keyring::Error::NoEntry) => None,
            Err(e) => {
                error!("Failed to retrieve auth token: {}", e);
                None
            }
        }
    }

    fn remove(&self) {
        let entry = match self.entry() {
            Ok(e) => e,
            Err(e) => {
                error!("Failed to remove auth token: {}", e);
                return;
            }
        };

        match entry.delete_credential() {
            Ok(()) => info!("Removed auth token"),
            Err(keyring::Error::NoEntry) => debug!("No auth token to remove"),
            Err(e) => error!("Failed to remove auth token: {}", e),
        }
    }
}

/// Token storage held in process memory
#[derive(Default)]
pub struct MemoryTokenStore {
    token: RwLock<Option<String>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: &str) -> Self {
        Self {
            token: RwLock::new(Some(token.to_string())),
        }
    }
}

impl TokenStore for MemoryTokenStore {
    fn store(&self, token: &str) {
        match self.token.write() {
            Ok(mut guard) => *guard = Some(token.to_string()),
            Err(e) => warn!("Failed to store auth token: {}", e),
        }
    }

    fn get(&self) -> Option<String> {
        match self.token.read() {
            Ok(guard) => guard.clone(),
            Err(e) => {
                warn!("Failed to retrieve auth token: {}", e);
                None
            }
        }
    }

    fn remove(&self) {
        match self.token.write() {
            Ok(mut guard) => *guard = None,
            Err(e) => warn!("Failed to remove auth token: {}", e),
        }
    }
}
