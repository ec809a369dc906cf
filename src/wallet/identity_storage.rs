// src/wallet/identity_storage.rs
//! Persistence of the holder's active identity.
//!
//! The key pair and DID are written under fixed keys in the
//! [`SecureStore`]. The store is atomic per key only; a crash between two
//! writes can leave a partial identity, which [`IdentityStorage::load`]
//! treats as "no identity" unless the private key and DID are both present.

use log::info;
use std::sync::Arc;

use crate::error::IdentityError;
use crate::models::did::Did;
use crate::storage::secure_store::{SecureStore, StorageError};
use crate::utils::crypto::format_address;
use crate::wallet::key_management::{KeyPair, PrivateKey};

pub const PRIVATE_KEY_KEY: &str = "private_key";
pub const PUBLIC_KEY_KEY: &str = "public_key";
pub const ADDRESS_KEY: &str = "address";
pub const DID_KEY: &str = "did";

/// A key pair together with the DID it controls.
#[derive(Clone, Debug)]
pub struct Identity {
    pub key_pair: KeyPair,
    pub did: Did,
}

impl Identity {
    /// Pairs a key with a DID, checking the DID is bound to the key's address.
    pub fn new(key_pair: KeyPair, did: Did) -> Result<Self, IdentityError> {
        if did.address() != key_pair.address() {
            return Err(IdentityError::DidKeyMismatch {
                did: did.to_string(),
                address: format_address(&key_pair.address()),
            });
        }
        Ok(Identity { key_pair, did })
    }

    pub fn private_key(&self) -> &PrivateKey {
        self.key_pair.private_key()
    }
}

/// Reads and writes the active identity.
#[derive(Clone)]
pub struct IdentityStorage {
    store: Arc<dyn SecureStore>,
}

impl IdentityStorage {
    pub fn new(store: Arc<dyn SecureStore>) -> Self {
        IdentityStorage { store }
    }

    /// Persists private key, public key, address and DID.
    pub fn save(&self, identity: &Identity) -> Result<(), IdentityError> {
        let pair = &identity.key_pair;
        self.store
            .save(PRIVATE_KEY_KEY, &pair.private_key().to_hex())?;
        self.store.save(PUBLIC_KEY_KEY, &pair.public_key_hex())?;
        self.store.save(ADDRESS_KEY, &pair.address_checksum())?;
        self.store.save(DID_KEY, &identity.did.to_string())?;
        info!("stored identity {}", identity.did);
        Ok(())
    }

    /// Loads the stored identity, or `None` if there is none.
    ///
    /// # Errors
    /// [`StorageError::Corrupt`] if the stored values are unreadable or the
    /// DID does not belong to the stored key.
    pub fn load(&self) -> Result<Option<Identity>, IdentityError> {
        let private_key = match self.store.get(PRIVATE_KEY_KEY)? {
            Some(value) => value,
            None => return Ok(None),
        };
        let did = match self.store.get(DID_KEY)? {
            Some(value) => value,
            None => return Ok(None),
        };

        let private_key = PrivateKey::from_hex(&private_key)
            .map_err(|e| corrupt(PRIVATE_KEY_KEY, e.to_string()))?;
        let did = Did::parse(&did).map_err(|e| corrupt(DID_KEY, e.to_string()))?;

        Identity::new(KeyPair::from_private_key(private_key), did)
            .map(Some)
            .map_err(|e| corrupt(DID_KEY, e.to_string()))
    }

    /// Loads the stored identity, failing with
    /// [`IdentityError::NoActiveIdentity`] if there is none.
    pub fn active_identity(&self) -> Result<Identity, IdentityError> {
        self.load()?.ok_or(IdentityError::NoActiveIdentity)
    }

    /// Removes every identity key from the store.
    pub fn delete(&self) -> Result<(), IdentityError> {
        for key in [PRIVATE_KEY_KEY, PUBLIC_KEY_KEY, ADDRESS_KEY, DID_KEY] {
            self.store.delete(key)?;
        }
        info!("deleted stored identity");
        Ok(())
    }
}

fn corrupt(key: &str, reason: String) -> IdentityError {
    IdentityError::Storage(StorageError::Corrupt {
        key: key.to_string(),
        reason,
    })
}
