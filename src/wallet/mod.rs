// src/wallet/mod.rs
//! Holder wallet.
//!
//! [`Wallet`] owns the holder's identity and credentials through a
//! [`SecureStore`] and performs every key operation on-device. Operations
//! that need the key fail with [`IdentityError::NoActiveIdentity`] until an
//! identity has been created.

pub mod credential_storage;
pub mod identity_storage;
pub mod key_management;
pub mod signer;

use log::info;
use std::sync::Arc;

use crate::error::IdentityError;
use crate::models::credential::{Claims, Credential};
use crate::models::did::Did;
use crate::models::presentation::Presentation;
use crate::services::credential_issuer::CredentialIssuer;
use crate::services::presentation_builder::PresentationBuilder;
use crate::services::registration::OwnershipProof;
use crate::storage::secure_store::SecureStore;

use credential_storage::CredentialStorage;
use identity_storage::{Identity, IdentityStorage};
use key_management::KeyVault;
use signer::{sign_bytes, MessageSignature};

#[derive(Clone)]
pub struct Wallet {
    identities: IdentityStorage,
    credentials: CredentialStorage,
    issuer: CredentialIssuer,
    presenter: PresentationBuilder,
}

impl Wallet {
    pub fn new(store: Arc<dyn SecureStore>) -> Self {
        Wallet {
            identities: IdentityStorage::new(store.clone()),
            credentials: CredentialStorage::new(store),
            issuer: CredentialIssuer::new(),
            presenter: PresentationBuilder::new(),
        }
    }

    /// Generates a key pair, derives its DID on `network` and stores both as
    /// the active identity, replacing any previous one.
    pub fn create_identity(
        &self,
        vault: &KeyVault,
        network: &str,
    ) -> Result<Identity, IdentityError> {
        let key_pair = vault.generate()?;
        let did = vault.derive_did(&key_pair.address(), network);
        let identity = Identity::new(key_pair, did)?;
        self.identities.save(&identity)?;
        info!("created identity {}", identity.did);
        Ok(identity)
    }

    pub fn active_identity(&self) -> Result<Identity, IdentityError> {
        self.identities.active_identity()
    }

    pub fn has_identity(&self) -> Result<bool, IdentityError> {
        Ok(self.identities.load()?.is_some())
    }

    /// Forgets the identity. Stored credentials are kept.
    pub fn delete_identity(&self) -> Result<(), IdentityError> {
        self.identities.delete()
    }

    /// Issues a credential signed by the active identity and stores it.
    pub fn issue_credential(
        &self,
        claims: Claims,
        subject: &Did,
    ) -> Result<Credential, IdentityError> {
        let identity = self.active_identity()?;
        let credential = self
            .issuer
            .issue(claims, &identity.did, subject, identity.private_key())?;
        self.credentials.store_credential(credential.clone())?;
        Ok(credential)
    }

    /// Stores a credential token issued elsewhere.
    ///
    /// The token is parsed but not verified. Receiving the same credential
    /// twice replaces the earlier copy.
    pub fn receive_credential(&self, token: &str) -> Result<Credential, IdentityError> {
        let credential = Credential::from_token(token)?;
        self.credentials.store_credential(credential.clone())?;
        info!("received credential {} from {}", credential.id, credential.issuer_did);
        Ok(credential)
    }

    pub fn credentials(&self) -> Result<Vec<Credential>, IdentityError> {
        self.credentials.list_credentials()
    }

    pub fn credential(&self, id: &str) -> Result<Option<Credential>, IdentityError> {
        self.credentials.get_credential(id)
    }

    pub fn remove_credential(&self, id: &str) -> Result<bool, IdentityError> {
        self.credentials.remove_credential(id)
    }

    /// Presents stored credentials, in the order of `ids`, as the active identity.
    ///
    /// # Errors
    /// - [`IdentityError::NoActiveIdentity`] without an identity
    /// - [`IdentityError::EmptyCredentialSet`] if `ids` is empty
    /// - [`IdentityError::CredentialNotFound`] for an unknown id
    pub fn present(
        &self,
        ids: &[&str],
        challenge: Option<&str>,
    ) -> Result<Presentation, IdentityError> {
        let identity = self.active_identity()?;
        let stored = self.credentials.list_credentials()?;
        let selected = ids
            .iter()
            .map(|id| {
                stored
                    .iter()
                    .find(|c| c.id == *id)
                    .cloned()
                    .ok_or_else(|| IdentityError::CredentialNotFound(id.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        self.presenter
            .present(&selected, &identity.did, identity.private_key(), challenge)
    }

    /// Signs `message` as an EIP-191 personal message with the active key.
    pub fn sign_message(&self, message: &[u8]) -> Result<MessageSignature, IdentityError> {
        let identity = self.active_identity()?;
        sign_bytes(identity.private_key(), message)
    }

    /// Proof that the active identity controls its DID, for the registrar.
    pub fn ownership_proof(&self) -> Result<OwnershipProof, IdentityError> {
        let identity = self.active_identity()?;
        OwnershipProof::build(&identity.did, identity.private_key())
    }
}
