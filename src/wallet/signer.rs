// src/wallet/signer.rs
//! Recoverable secp256k1 signing.
//!
//! Two proof purposes are supported:
//! - [`sign_bytes`]: EIP-191 personal-message signatures, used for DID
//!   ownership proofs handed to the registrar.
//! - [`sign_token`]: `ES256K-R` compact tokens carrying credential and
//!   presentation payloads.
//!
//! Both produce signatures from which the signer's public key can be
//! recovered using only the signature and the signed bytes. k256 signs
//! deterministically (RFC 6979) and always emits low-S signatures.
//!
//! Every failure here is caused by bad input and is not retriable.

use ethers::types::{Address, Signature, U256};
use ethers::utils::{hash_message, hex};
use k256::ecdsa::{RecoveryId, Signature as EcdsaSignature, VerifyingKey};
use log::debug;
use serde::Serialize;
use serde_json::Value;
use std::str::FromStr;

use crate::error::IdentityError;
use crate::models::did::Did;
use crate::models::token::{Token, TokenHeader, SIGNATURE_LENGTH};
use crate::utils::crypto::{address_from_public_key, format_address, sha256};
use crate::utils::serialization::{encode_segment, to_canonical_json};
use crate::wallet::key_management::PrivateKey;

/// A 65-byte `r || s || v` personal-message signature (`v` is 27 or 28).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageSignature(Signature);

impl MessageSignature {
    /// Parses a `0x`-prefixed (or bare) 130 hex digit signature.
    pub fn from_hex(value: &str) -> Result<Self, IdentityError> {
        Signature::from_str(value)
            .map(MessageSignature)
            .map_err(|e| IdentityError::InvalidSignature(e.to_string()))
    }

    /// `0x`-prefixed hex encoding.
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0.to_vec()))
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        self.0.to_vec()
    }

    /// Recovers the address that signed `message`.
    pub fn recover(&self, message: &[u8]) -> Result<Address, IdentityError> {
        self.0
            .recover(message.to_vec())
            .map_err(|e| IdentityError::InvalidSignature(e.to_string()))
    }
}

/// Signs an arbitrary message as an EIP-191 personal message.
///
/// # Process Flow
/// 1. Prefixes the message with `"\x19Ethereum Signed Message:\n" + len`
/// 2. Hashes the prefixed message with Keccak-256
/// 3. Signs the hash, keeping the recovery id as `v = 27 + id`
pub fn sign_bytes(key: &PrivateKey, message: &[u8]) -> Result<MessageSignature, IdentityError> {
    let digest = hash_message(message);
    let (signature, recovery_id) = key
        .signing_key()
        .sign_prehash_recoverable(digest.as_bytes())
        .map_err(|e| IdentityError::SigningKeyInvalid(e.to_string()))?;

    let bytes = signature.to_bytes();
    Ok(MessageSignature(Signature {
        r: U256::from_big_endian(&bytes[..32]),
        s: U256::from_big_endian(&bytes[32..]),
        v: 27 + u64::from(recovery_id.to_byte()),
    }))
}

/// Signs a payload into a compact `ES256K-R` token asserting `did` as signer.
///
/// The payload is serialized as canonical JSON with `iss` set to `did`; the
/// header's `kid` names the same DID. The DID must belong to `key`.
///
/// # Errors
/// - [`IdentityError::DidKeyMismatch`] if `did` is bound to another address
/// - [`IdentityError::MalformedToken`] if the payload is not a JSON object
/// - [`IdentityError::SigningKeyInvalid`] if signing fails
pub fn sign_token<P: Serialize>(
    key: &PrivateKey,
    payload: &P,
    did: &Did,
) -> Result<Token, IdentityError> {
    let signer_address = key.address();
    if did.address() != signer_address {
        return Err(IdentityError::DidKeyMismatch {
            did: did.to_string(),
            address: format_address(&signer_address),
        });
    }

    let did_string = did.to_string();
    let mut value = serde_json::to_value(payload)?;
    value
        .as_object_mut()
        .ok_or_else(|| IdentityError::MalformedToken("payload must be a JSON object".to_string()))?
        .insert("iss".to_string(), Value::String(did_string.clone()));

    let compact = sign_compact(key, &TokenHeader::for_signer(&did_string), &value)?;
    debug!("signed token for {}", did_string);
    Token::parse(&compact)
}

/// Assembles and signs `header.payload` without any DID checks.
pub(crate) fn sign_compact(
    key: &PrivateKey,
    header: &TokenHeader,
    payload: &Value,
) -> Result<String, IdentityError> {
    let signing_input = format!(
        "{}.{}",
        encode_segment(&to_canonical_json(header)?),
        encode_segment(&to_canonical_json(payload)?)
    );
    let digest = sha256(signing_input.as_bytes());
    let (signature, recovery_id) = key
        .signing_key()
        .sign_prehash_recoverable(&digest)
        .map_err(|e| IdentityError::SigningKeyInvalid(e.to_string()))?;

    let mut raw = signature.to_bytes().to_vec();
    raw.push(recovery_id.to_byte());
    Ok(format!("{}.{}", signing_input, encode_segment(&raw)))
}

/// Recovers the address that signed a token's `signing_input`.
///
/// Works on the encoded segments, so nothing in the payload needs decoding
/// first. Accepts recovery ids 0/1 as well as 27/28.
///
/// # Returns
/// The recovered address, or a description of why recovery failed.
pub fn recover_signer(signing_input: &str, raw: &[u8]) -> Result<Address, String> {
    if raw.len() != SIGNATURE_LENGTH {
        return Err(format!("signature must be {} bytes", SIGNATURE_LENGTH));
    }

    let signature = EcdsaSignature::from_slice(&raw[..64])
        .map_err(|e| format!("invalid signature scalars: {}", e))?;
    let recovery_byte = match raw[64] {
        v @ 0..=1 => v,
        v @ 27..=28 => v - 27,
        other => return Err(format!("invalid recovery id {}", other)),
    };
    let recovery_id =
        RecoveryId::from_byte(recovery_byte).ok_or_else(|| "invalid recovery id".to_string())?;

    let digest = sha256(signing_input.as_bytes());
    let public_key = VerifyingKey::recover_from_prehash(&digest, &signature, recovery_id)
        .map_err(|e| format!("public key recovery failed: {}", e))?;
    Ok(address_from_public_key(&public_key))
}
