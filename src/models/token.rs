// src/models/token.rs
//! Compact signed-token (JWS) model.
//!
//! A token is three base64url segments joined by dots:
//!
//! ```text
//! base64url(header) . base64url(payload) . base64url(signature)
//! ```
//!
//! The header names the `ES256K-R` algorithm and the asserted signer (`kid`),
//! the payload is canonical JSON, and the signature is 65 bytes
//! `r || s || recovery_id` over SHA-256 of `header "." payload`.
//! Each part can be re-extracted independently from the compact string.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use crate::error::IdentityError;
use crate::utils::serialization::{decode_json_segment, decode_segment};

/// Recoverable secp256k1 signature over SHA-256.
pub const ALGORITHM: &str = "ES256K-R";

/// Header `typ` value.
pub const TOKEN_TYPE: &str = "JWT";

/// Length of a recoverable signature: 32-byte `r`, 32-byte `s`, 1-byte recovery id.
pub const SIGNATURE_LENGTH: usize = 65;

/// Fragment appended to a DID to name its controlling key.
pub const KEY_FRAGMENT: &str = "#controller";

/// Token header.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct TokenHeader {
    pub alg: String,
    pub typ: String,
    /// `<did>#controller` of the key that produced the signature.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kid: Option<String>,
}

impl TokenHeader {
    pub fn for_signer(did: &str) -> Self {
        TokenHeader {
            alg: ALGORITHM.to_string(),
            typ: TOKEN_TYPE.to_string(),
            kid: Some(format!("{}{}", did, KEY_FRAGMENT)),
        }
    }

    /// The DID part of `kid`, without the key fragment.
    pub fn signer_did(&self) -> Option<&str> {
        self.kid
            .as_deref()
            .map(|kid| kid.split_once('#').map_or(kid, |(did, _)| did))
    }
}

/// A token whose header and signature are decoded but whose payload is
/// still the raw base64url segment.
///
/// The signature covers the encoded segments, so it can be checked before
/// anything in the payload is decoded or trusted.
#[derive(Debug, Clone)]
pub struct SealedToken {
    compact: String,
    header: TokenHeader,
    signature: Vec<u8>,
}

impl SealedToken {
    /// Splits a compact token and decodes its header and signature.
    ///
    /// # Errors
    /// Returns [`IdentityError::MalformedToken`] if:
    /// - The string does not have exactly three dot-separated segments
    /// - The header is not base64url-encoded JSON naming `ES256K-R`
    /// - The signature is not 65 bytes
    pub fn parse(compact: &str) -> Result<Self, IdentityError> {
        let segments: Vec<&str> = compact.split('.').collect();
        if segments.len() != 3 {
            return Err(IdentityError::MalformedToken(format!(
                "expected 3 segments, found {}",
                segments.len()
            )));
        }

        let header_value = decode_json_segment(segments[0])
            .map_err(|e| IdentityError::MalformedToken(format!("header: {}", e)))?;
        let header: TokenHeader = serde_json::from_value(header_value)
            .map_err(|e| IdentityError::MalformedToken(format!("header: {}", e)))?;
        if header.alg != ALGORITHM {
            return Err(IdentityError::MalformedToken(format!(
                "unsupported algorithm '{}'",
                header.alg
            )));
        }

        let signature = decode_segment(segments[2])
            .map_err(|e| IdentityError::MalformedToken(format!("signature: {}", e)))?;
        if signature.len() != SIGNATURE_LENGTH {
            return Err(IdentityError::MalformedToken(format!(
                "signature must be {} bytes, found {}",
                SIGNATURE_LENGTH,
                signature.len()
            )));
        }

        Ok(SealedToken {
            compact: compact.to_string(),
            header,
            signature,
        })
    }

    pub fn header(&self) -> &TokenHeader {
        &self.header
    }

    /// Raw 65-byte signature.
    pub fn signature(&self) -> &[u8] {
        &self.signature
    }

    /// The exact bytes covered by the signature: `header "." payload`.
    pub fn signing_input(&self) -> &str {
        signing_input_of(&self.compact)
    }

    /// Decodes the payload.
    ///
    /// # Errors
    /// [`IdentityError::MalformedToken`] if the payload is not base64url-encoded
    /// JSON or not a JSON object.
    pub fn open(self) -> Result<Token, IdentityError> {
        let segment = self.compact.split('.').nth(1).unwrap_or_default();
        let payload = decode_json_segment(segment)
            .map_err(|e| IdentityError::MalformedToken(format!("payload: {}", e)))?;
        if !payload.is_object() {
            return Err(IdentityError::MalformedToken(
                "payload is not a JSON object".to_string(),
            ));
        }

        Ok(Token {
            compact: self.compact,
            header: self.header,
            payload,
            signature: self.signature,
        })
    }
}

fn signing_input_of(compact: &str) -> &str {
    match compact.rfind('.') {
        Some(idx) => &compact[..idx],
        None => compact,
    }
}

/// A parsed signed token.
///
/// Parsing checks structure only. It does not verify the signature.
#[derive(Debug, Clone)]
pub struct Token {
    compact: String,
    header: TokenHeader,
    payload: Value,
    signature: Vec<u8>,
}

impl Token {
    /// Splits and decodes a compact token.
    ///
    /// # Errors
    /// Returns [`IdentityError::MalformedToken`] for any failure listed on
    /// [`SealedToken::parse`] and [`SealedToken::open`].
    pub fn parse(compact: &str) -> Result<Self, IdentityError> {
        SealedToken::parse(compact)?.open()
    }

    /// The compact `header.payload.signature` string.
    pub fn as_str(&self) -> &str {
        &self.compact
    }

    pub fn header(&self) -> &TokenHeader {
        &self.header
    }

    pub fn payload(&self) -> &Value {
        &self.payload
    }

    /// Raw 65-byte signature.
    pub fn signature(&self) -> &[u8] {
        &self.signature
    }

    /// The exact bytes covered by the signature: `header "." payload`.
    pub fn signing_input(&self) -> &str {
        signing_input_of(&self.compact)
    }

    /// The payload's `iss` (asserted signer DID), if present.
    pub fn issuer(&self) -> Option<&str> {
        self.payload.get("iss").and_then(Value::as_str)
    }

    /// Deserializes the payload into a typed structure.
    pub fn claims<T: DeserializeOwned>(&self) -> Result<T, IdentityError> {
        serde_json::from_value(self.payload.clone())
            .map_err(|e| IdentityError::MalformedToken(format!("payload: {}", e)))
    }

    pub fn into_string(self) -> String {
        self.compact
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.compact)
    }
}
