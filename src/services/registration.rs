// src/services/registration.rs
//! DID ownership proofs and registrar onboarding.
//!
//! An ownership proof is the message `"Register DID: <did>"` signed as an
//! EIP-191 personal message, so any ledger-side tooling can recover the
//! address and compare it to the one inside the DID.
//!
//! Onboarding creates the identity locally first and then submits the proof
//! once. The two steps are not atomic: a failed registration leaves the
//! local identity in place and is reported next to it.

use ethers::types::Address;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::blockchain::registrar_client::{Registrar, RegistrationRequest, TxReceipt};
use crate::error::IdentityError;
use crate::models::did::Did;
use crate::utils::crypto::format_address;
use crate::wallet::key_management::{KeyVault, PrivateKey};
use crate::wallet::signer::{sign_bytes, MessageSignature};
use crate::wallet::Wallet;

/// Prefix of every ownership-proof message.
pub const REGISTRATION_PREFIX: &str = "Register DID: ";

/// Signed statement that the key holder controls a DID.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct OwnershipProof {
    pub message: String,
    /// `0x`-prefixed 65-byte `r || s || v` signature.
    pub signature: String,
}

impl OwnershipProof {
    /// Signs `"Register DID: " + did` with `key`.
    ///
    /// # Errors
    /// [`IdentityError::DidKeyMismatch`] if `did` is not bound to `key`.
    pub fn build(did: &Did, key: &PrivateKey) -> Result<Self, IdentityError> {
        if did.address() != key.address() {
            return Err(IdentityError::DidKeyMismatch {
                did: did.to_string(),
                address: format_address(&key.address()),
            });
        }

        let message = format!("{}{}", REGISTRATION_PREFIX, did);
        let signature = sign_bytes(key, message.as_bytes())?;
        Ok(OwnershipProof {
            message,
            signature: signature.to_hex(),
        })
    }

    /// The DID named in the message.
    pub fn did(&self) -> Option<&str> {
        self.message.strip_prefix(REGISTRATION_PREFIX)
    }

    /// Checks the proof and returns the address that signed it.
    ///
    /// # Errors
    /// - [`IdentityError::InvalidSignature`] if the message is not a
    ///   registration message or the signature cannot be recovered
    /// - [`IdentityError::InvalidDid`] if the named DID does not parse
    /// - [`IdentityError::DidKeyMismatch`] if the signer is not the DID's address
    pub fn verify(&self) -> Result<Address, IdentityError> {
        let did = self.did().ok_or_else(|| {
            IdentityError::InvalidSignature("not a DID registration message".to_string())
        })?;
        let did = Did::parse(did)?;

        let signer = MessageSignature::from_hex(&self.signature)?
            .recover(self.message.as_bytes())?;
        if signer != did.address() {
            return Err(IdentityError::DidKeyMismatch {
                did: did.to_string(),
                address: format_address(&signer),
            });
        }
        Ok(signer)
    }
}

/// What onboarding produced.
#[derive(Debug)]
pub struct OnboardingOutcome {
    pub did: String,
    pub address: String,
    pub public_key: String,
    /// Registrar answer; an error here does not undo the local identity.
    pub registration: Result<TxReceipt, IdentityError>,
}

impl OnboardingOutcome {
    pub fn is_registered(&self) -> bool {
        self.registration.is_ok()
    }
}

/// Creates identities and anchors them with a registrar.
#[derive(Clone)]
pub struct Onboarding {
    registrar: Arc<dyn Registrar>,
}

impl Onboarding {
    pub fn new(registrar: Arc<dyn Registrar>) -> Self {
        Onboarding { registrar }
    }

    /// Creates and stores a new identity, then submits its ownership proof once.
    ///
    /// # Arguments
    /// * `wallet` - Wallet receiving the identity
    /// * `vault` - Key generator naming the DID method
    /// * `network` - Network segment of the DID
    ///
    /// # Errors
    /// Only local failures (key generation, signing, storage) are errors.
    /// Registrar failures are returned in [`OnboardingOutcome::registration`].
    pub async fn create_and_register(
        &self,
        wallet: &Wallet,
        vault: &KeyVault,
        network: &str,
    ) -> Result<OnboardingOutcome, IdentityError> {
        let identity = wallet.create_identity(vault, network)?;
        let proof = OwnershipProof::build(&identity.did, identity.private_key())?;

        let request = RegistrationRequest {
            did: identity.did.to_string(),
            public_key: identity.key_pair.public_key_hex(),
            address: identity.key_pair.address_checksum(),
            signature: proof.signature,
            message: proof.message,
        };

        let registration = self.registrar.submit_registration(&request).await;
        match &registration {
            Ok(receipt) => info!("{} anchored in {}", request.did, receipt.tx_hash),
            Err(e) => warn!("{} created locally, registration failed: {}", request.did, e),
        }

        Ok(OnboardingOutcome {
            did: request.did,
            address: request.address,
            public_key: request.public_key,
            registration,
        })
    }
}
