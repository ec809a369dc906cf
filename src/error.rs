// src/error.rs
//! Error types for the DID wallet core.
//!
//! Every operation that can abort (key generation, signing, issuance,
//! presentation building, storage and registrar calls) returns
//! [`IdentityError`]. Verification failures are *not* errors: they are
//! reported as data inside [`crate::models::verification::VerificationResult`].

use thiserror::Error;

use crate::storage::secure_store::StorageError;

/// Failures that abort a wallet operation.
///
/// None of these are retriable without changing the input, except
/// [`IdentityError::RegistrarUnavailable`] which the caller may choose to retry.
#[derive(Error, Debug)]
pub enum IdentityError {
    /// The system random source could not supply bytes for a new key.
    #[error("entropy unavailable: {0}")]
    EntropyUnavailable(String),

    /// The private key is malformed or outside the curve order.
    #[error("invalid signing key: {0}")]
    SigningKeyInvalid(String),

    /// The wallet holds no DID/key pair.
    #[error("no active identity in wallet")]
    NoActiveIdentity,

    /// A credential must carry at least one claim.
    #[error("credential claims must not be empty")]
    EmptyClaims,

    /// A presentation must carry at least one credential.
    #[error("presentation requires at least one credential")]
    EmptyCredentialSet,

    /// No stored credential has the requested id.
    #[error("credential not found: {0}")]
    CredentialNotFound(String),

    /// A token could not be split or decoded into header, payload and signature.
    #[error("malformed token: {0}")]
    MalformedToken(String),

    /// A message signature could not be decoded or recovered.
    #[error("invalid signature: {0}")]
    InvalidSignature(String),

    /// A string is not a DID of the form `did:<method>[:<network>]:<address>`.
    #[error("invalid DID '{did}': {reason}")]
    InvalidDid { did: String, reason: String },

    /// The DID handed to a signing operation is not controlled by the key.
    #[error("DID {did} does not belong to signing key address {address}")]
    DidKeyMismatch { did: String, address: String },

    /// The remote registrar could not be reached or rejected the request.
    #[error("registrar unavailable: {0}")]
    RegistrarUnavailable(String),

    /// The secure store failed.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// JSON encoding or decoding failed.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Settings could not be loaded.
    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),
}

impl IdentityError {
    pub(crate) fn invalid_did(did: &str, reason: impl Into<String>) -> Self {
        IdentityError::InvalidDid {
            did: did.to_string(),
            reason: reason.into(),
        }
    }
}
