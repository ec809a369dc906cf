// src/wallet/credential_storage.rs
//! Credential storage management for the wallet component.
//!
//! Persists the holder's credentials through the [`SecureStore`] capability
//! as one JSON-encoded list under a single key. Insertion order is kept, so
//! listing returns credentials in the order they were first stored.

use log::debug;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::error::IdentityError;
use crate::models::credential::Credential;
use crate::storage::secure_store::{SecureStore, StorageError};

/// Storage key holding the encoded credential list.
pub const CREDENTIALS_KEY: &str = "credentials";

/// Credential list persisted in secure storage.
///
/// Every call reads and writes through the store; nothing is cached, so
/// several handles over the same store always agree. Updates are a
/// load-modify-save of one key and run under a lock shared by all clones
/// of a handle.
#[derive(Clone)]
pub struct CredentialStorage {
    store: Arc<dyn SecureStore>,
    write_lock: Arc<Mutex<()>>,
}

impl CredentialStorage {
    pub fn new(store: Arc<dyn SecureStore>) -> Self {
        CredentialStorage {
            store,
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, ()>, IdentityError> {
        self.write_lock.lock().map_err(|_| {
            IdentityError::Storage(StorageError::Backend(
                "credential list lock poisoned".to_string(),
            ))
        })
    }

    fn load(&self) -> Result<Vec<Credential>, IdentityError> {
        match self.store.get(CREDENTIALS_KEY)? {
            None => Ok(Vec::new()),
            Some(encoded) => serde_json::from_str(&encoded).map_err(|e| {
                IdentityError::Storage(StorageError::Corrupt {
                    key: CREDENTIALS_KEY.to_string(),
                    reason: e.to_string(),
                })
            }),
        }
    }

    fn persist(&self, credentials: &[Credential]) -> Result<(), IdentityError> {
        let encoded = serde_json::to_string(credentials)?;
        self.store.save(CREDENTIALS_KEY, &encoded)?;
        Ok(())
    }

    /// Stores a credential.
    ///
    /// # Behavior
    /// - Replaces an existing credential with the same id in place
    /// - Does not validate the credential before storage
    pub fn store_credential(&self, credential: Credential) -> Result<(), IdentityError> {
        let _guard = self.lock()?;
        let mut credentials = self.load()?;
        match credentials.iter_mut().find(|c| c.id == credential.id) {
            Some(existing) => *existing = credential,
            None => credentials.push(credential),
        }
        self.persist(&credentials)
    }

    /// Retrieves a credential by its id.
    pub fn get_credential(&self, id: &str) -> Result<Option<Credential>, IdentityError> {
        Ok(self.load()?.into_iter().find(|c| c.id == id))
    }

    /// All stored credentials in insertion order.
    pub fn list_credentials(&self) -> Result<Vec<Credential>, IdentityError> {
        self.load()
    }

    pub fn count_credentials(&self) -> Result<usize, IdentityError> {
        Ok(self.load()?.len())
    }

    pub fn contains_credential(&self, id: &str) -> Result<bool, IdentityError> {
        Ok(self.load()?.iter().any(|c| c.id == id))
    }

    /// Removes a credential by its id.
    ///
    /// # Returns
    /// `true` if the credential was present and removed, `false` otherwise.
    pub fn remove_credential(&self, id: &str) -> Result<bool, IdentityError> {
        let _guard = self.lock()?;
        let mut credentials = self.load()?;
        let before = credentials.len();
        credentials.retain(|c| c.id != id);
        if credentials.len() == before {
            return Ok(false);
        }
        self.persist(&credentials)?;
        debug!("removed credential {}", id);
        Ok(true)
    }

    /// Drops the whole credential list.
    pub fn clear(&self) -> Result<(), IdentityError> {
        let _guard = self.lock()?;
        self.store.delete(CREDENTIALS_KEY)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::credential::Claims;
    use crate::storage::secure_store::MemoryStore;
    use chrono::Utc;
    use std::thread;

    fn create_test_credential(id: &str) -> Credential {
        let mut claims = Claims::new();
        claims.insert("label".to_string(), id.to_string());
        Credential {
            id: id.to_string(),
            issuer_did: "did:ethr:mainnet:0x7e5f4552091a69125d5dfcb7b8c2659029395bdf".to_string(),
            subject_did: "did:ethr:mainnet:0x7e5f4552091a69125d5dfcb7b8c2659029395bdf".to_string(),
            claims,
            token: "header.payload.signature".to_string(),
            issued_at: Utc::now(),
        }
    }

    fn storage() -> CredentialStorage {
        CredentialStorage::new(Arc::new(MemoryStore::new()))
    }

    #[test]
    fn test_contains_credential() {
        let storage = storage();
        let credential_id = "education-degree-123";

        assert!(!storage.contains_credential(credential_id).unwrap());

        storage
            .store_credential(create_test_credential(credential_id))
            .unwrap();
        assert!(storage.contains_credential(credential_id).unwrap());
    }

    #[test]
    fn test_remove_credential() {
        let storage = storage();
        let credential_id = "temporary-access-pass";

        storage
            .store_credential(create_test_credential(credential_id))
            .unwrap();

        assert!(storage.remove_credential(credential_id).unwrap());
        assert!(!storage.contains_credential(credential_id).unwrap());
        assert_eq!(storage.count_credentials().unwrap(), 0);

        // Remove non-existent returns false
        assert!(!storage.remove_credential("non-existent-id").unwrap());
    }

    #[test]
    fn test_count_after_operations() {
        let storage = storage();

        storage.store_credential(create_test_credential("id1")).unwrap();
        storage.store_credential(create_test_credential("id2")).unwrap();
        assert_eq!(storage.count_credentials().unwrap(), 2);

        storage.remove_credential("id1").unwrap();
        assert_eq!(storage.count_credentials().unwrap(), 1);

        // Same id replaces
        storage.store_credential(create_test_credential("id2")).unwrap();
        assert_eq!(storage.count_credentials().unwrap(), 1);
    }

    #[test]
    fn test_get_after_remove() {
        let storage = storage();
        let credential_id = "membership-card";

        storage
            .store_credential(create_test_credential(credential_id))
            .unwrap();
        storage.remove_credential(credential_id).unwrap();

        assert!(storage.get_credential(credential_id).unwrap().is_none());
    }

    #[test]
    fn test_list_keeps_insertion_order() {
        let storage = storage();
        for id in ["c", "a", "b"] {
            storage.store_credential(create_test_credential(id)).unwrap();
        }
        let ids: Vec<String> = storage
            .list_credentials()
            .unwrap()
            .into_iter()
            .map(|c| c.id)
            .collect();
        assert_eq!(ids, vec!["c", "a", "b"]);
    }

    #[test]
    fn test_shared_store_is_visible_to_all_handles() {
        let store: Arc<dyn SecureStore> = Arc::new(MemoryStore::new());
        let first = CredentialStorage::new(store.clone());
        let second = CredentialStorage::new(store);

        first.store_credential(create_test_credential("shared")).unwrap();
        assert!(second.contains_credential("shared").unwrap());
    }

    #[test]
    fn test_concurrent_stores_keep_every_credential() {
        let storage = storage();
        let handles: Vec<_> = (0..8)
            .map(|worker| {
                let storage = storage.clone();
                thread::spawn(move || {
                    for n in 0..25 {
                        let id = format!("worker{}-{}", worker, n);
                        storage.store_credential(create_test_credential(&id)).unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(storage.count_credentials().unwrap(), 200);
    }

    #[test]
    fn test_concurrent_removes_and_stores() {
        let storage = storage();
        for n in 0..50 {
            storage
                .store_credential(create_test_credential(&format!("old-{}", n)))
                .unwrap();
        }

        let remover = {
            let storage = storage.clone();
            thread::spawn(move || {
                for n in 0..50 {
                    assert!(storage.remove_credential(&format!("old-{}", n)).unwrap());
                }
            })
        };
        let writer = {
            let storage = storage.clone();
            thread::spawn(move || {
                for n in 0..50 {
                    storage
                        .store_credential(create_test_credential(&format!("new-{}", n)))
                        .unwrap();
                }
            })
        };
        remover.join().unwrap();
        writer.join().unwrap();

        let ids: Vec<String> = storage
            .list_credentials()
            .unwrap()
            .into_iter()
            .map(|c| c.id)
            .collect();
        assert_eq!(ids.len(), 50);
        assert!(ids.iter().all(|id| id.starts_with("new-")));
    }

    #[test]
    fn test_corrupt_list_is_reported() {
        let store: Arc<dyn SecureStore> = Arc::new(MemoryStore::new());
        store.save(CREDENTIALS_KEY, "{not json").unwrap();
        let storage = CredentialStorage::new(store);

        assert!(matches!(
            storage.list_credentials(),
            Err(IdentityError::Storage(StorageError::Corrupt { .. }))
        ));
    }
}
