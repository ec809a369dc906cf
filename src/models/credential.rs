// src/models/credential.rs
//! Verifiable Credential data model.
//!
//! Defines the wallet-side [`Credential`] record and the signed payload
//! layout following the JWT encoding of the
//! [W3C Verifiable Credentials Data Model](https://www.w3.org/TR/vc-data-model/).

use chrono::{DateTime, TimeZone, Utc};
use ethers::utils::hex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::IdentityError;
use crate::models::token::Token;
use crate::utils::crypto::sha256;

/// Credential claims as key/value pairs.
///
/// Keys are unique and iterate in sorted order, which keeps the signed
/// encoding deterministic. Values are opaque to signing and verification.
pub type Claims = BTreeMap<String, String>;

/// Base JSON-LD context for credentials and presentations.
pub const CREDENTIALS_CONTEXT: &str = "https://www.w3.org/2018/credentials/v1";

/// Base credential type.
pub const CREDENTIAL_TYPE: &str = "VerifiableCredential";

/// The `vc` member of a credential token payload.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct CredentialBody {
    #[serde(rename = "@context")]
    pub context: Vec<String>,

    #[serde(rename = "type")]
    pub types: Vec<String>,

    #[serde(rename = "credentialSubject")]
    pub credential_subject: Claims,
}

impl CredentialBody {
    pub fn new(claims: Claims) -> Self {
        CredentialBody {
            context: vec![CREDENTIALS_CONTEXT.to_string()],
            types: vec![CREDENTIAL_TYPE.to_string()],
            credential_subject: claims,
        }
    }

    /// True if the base context and type markers are present.
    pub fn has_required_markers(&self) -> bool {
        self.context.iter().any(|c| c == CREDENTIALS_CONTEXT)
            && self.types.iter().any(|t| t == CREDENTIAL_TYPE)
    }
}

/// Signed payload of a credential token.
///
/// `iss` is filled in by the signer and is therefore optional here.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct CredentialPayload {
    pub vc: CredentialBody,

    /// Subject DID.
    pub sub: String,

    /// Issuance time, epoch seconds.
    pub nbf: i64,

    /// Credential id.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jti: Option<String>,

    /// Optional expiry, epoch seconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,

    /// Issuer DID.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
}

/// A Verifiable Credential held by the wallet.
///
/// Immutable once issued; changing a claim means issuing a new credential
/// with a new id.
///
/// # Fields
/// - `id`: Locally unique identifier
/// - `issuer_did`: DID of the signer
/// - `subject_did`: DID the claims are about
/// - `claims`: Claim map as signed
/// - `token`: Compact signed token
/// - `issued_at`: Issuance time (second precision, equals the token's `nbf`)
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Credential {
    pub id: String,
    pub issuer_did: String,
    pub subject_did: String,
    pub claims: Claims,
    pub token: String,
    pub issued_at: DateTime<Utc>,
}

impl Credential {
    /// Rebuilds a credential record from a signed token.
    ///
    /// The signature is NOT verified; use the verifier for that.
    ///
    /// # Errors
    /// [`IdentityError::MalformedToken`] if the token does not parse or its
    /// payload lacks the credential fields (`vc`, `sub`, `nbf`, `iss`).
    pub fn from_token(token: &str) -> Result<Self, IdentityError> {
        let parsed = Token::parse(token)?;
        let payload: CredentialPayload = parsed.claims()?;

        let issuer_did = payload
            .iss
            .ok_or_else(|| IdentityError::MalformedToken("credential has no issuer".to_string()))?;
        let issued_at = Utc
            .timestamp_opt(payload.nbf, 0)
            .single()
            .ok_or_else(|| IdentityError::MalformedToken("nbf out of range".to_string()))?;
        // Tokens from other issuers may omit `jti`; fall back to a digest of the token.
        let id = payload
            .jti
            .unwrap_or_else(|| hex::encode(&sha256(token.as_bytes())[..16]));

        Ok(Credential {
            id,
            issuer_did,
            subject_did: payload.sub,
            claims: payload.vc.credential_subject,
            token: parsed.into_string(),
            issued_at,
        })
    }
}
