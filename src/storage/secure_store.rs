// src/storage/secure_store.rs
//! Key/value capability for encrypted-at-rest device storage.
//!
//! The wallet persists its identity and credential list through
//! [`SecureStore`]. Real deployments back it with the platform keychain;
//! [`MemoryStore`] is provided for tests and the demo binary.
//!
//! Each call is atomic per key. Consistency across several keys (for
//! example private key and DID) is the backing store's concern.

use std::collections::HashMap;
use std::sync::RwLock;
use thiserror::Error;

/// Failure reported by a [`SecureStore`] backend.
#[derive(Error, Debug)]
pub enum StorageError {
    /// The backend could not complete the request.
    #[error("backend failure: {0}")]
    Backend(String),

    /// A stored value could not be decoded.
    #[error("corrupt value under '{key}': {reason}")]
    Corrupt { key: String, reason: String },
}

/// Save/get/delete capability over string values.
pub trait SecureStore: Send + Sync {
    /// Stores `value` under `key`, replacing any previous value.
    fn save(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Returns the value under `key`, or `None` if absent.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Removes `key`. Deleting an absent key is not an error.
    fn delete(&self, key: &str) -> Result<(), StorageError>;
}

/// In-memory [`SecureStore`], thread-safe through an `RwLock`.
#[derive(Default)]
pub struct MemoryStore {
    values: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned<T>(_: T) -> StorageError {
    StorageError::Backend("memory store lock poisoned".to_string())
}

impl SecureStore for MemoryStore {
    fn save(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.values
            .write()
            .map_err(poisoned)?
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.values.read().map_err(poisoned)?.get(key).cloned())
    }

    fn delete(&self, key: &str) -> Result<(), StorageError> {
        self.values.write().map_err(poisoned)?.remove(key);
        Ok(())
    }
}
