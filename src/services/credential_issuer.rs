// src/services/credential_issuer.rs
//! Credential Issuer Service
//!
//! Builds canonical Verifiable Credential payloads from a claim map and
//! signs them locally with the issuer's key. The private key never leaves
//! the device; the result is a portable compact token plus the wallet-side
//! [`Credential`] record.

use chrono::{DateTime, SubsecRound, Utc};
use log::info;

use crate::error::IdentityError;
use crate::models::credential::{Claims, Credential, CredentialBody, CredentialPayload};
use crate::models::did::Did;
use crate::wallet::key_management::PrivateKey;
use crate::wallet::signer::sign_token;

/// Issues signed Verifiable Credentials.
///
/// Stateless; one instance can serve any number of concurrent callers.
#[derive(Clone, Debug, Default)]
pub struct CredentialIssuer;

impl CredentialIssuer {
    pub fn new() -> Self {
        CredentialIssuer
    }

    /// Issues a credential with no expiry.
    ///
    /// # Arguments
    /// * `claims` - Claim map; must not be empty
    /// * `issuer` - DID of the signer; must be bound to `key`
    /// * `subject` - DID the claims are about
    /// * `key` - Issuer's private key
    ///
    /// # Errors
    /// - [`IdentityError::EmptyClaims`] if `claims` has no entries
    /// - [`IdentityError::DidKeyMismatch`] if `issuer` is not controlled by `key`
    pub fn issue(
        &self,
        claims: Claims,
        issuer: &Did,
        subject: &Did,
        key: &PrivateKey,
    ) -> Result<Credential, IdentityError> {
        self.issue_with_expiry(claims, issuer, subject, key, None)
    }

    /// Issues a credential, optionally stamping an `exp` the verifier enforces.
    pub fn issue_with_expiry(
        &self,
        claims: Claims,
        issuer: &Did,
        subject: &Did,
        key: &PrivateKey,
        expires_at: Option<DateTime<Utc>>,
    ) -> Result<Credential, IdentityError> {
        if claims.is_empty() {
            return Err(IdentityError::EmptyClaims);
        }

        let issued_at = Utc::now().trunc_subsecs(0);
        let id = credential_id();

        let payload = CredentialPayload {
            vc: CredentialBody::new(claims.clone()),
            sub: subject.to_string(),
            nbf: issued_at.timestamp(),
            jti: Some(id.clone()),
            exp: expires_at.map(|at| at.timestamp()),
            iss: None,
        };
        let token = sign_token(key, &payload, issuer)?;

        info!("issued credential {} to {}", id, subject);
        Ok(Credential {
            id,
            issuer_did: issuer.to_string(),
            subject_did: subject.to_string(),
            claims,
            token: token.into_string(),
            issued_at,
        })
    }
}

/// Millisecond timestamp plus a random suffix; unique within one device.
fn credential_id() -> String {
    format!(
        "urn:vc:{}-{:08x}",
        Utc::now().timestamp_millis(),
        rand::random::<u32>()
    )
}
