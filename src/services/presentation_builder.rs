// src/services/presentation_builder.rs
//! Verifiable Presentation builder.
//!
//! Bundles one or more credential tokens into a presentation signed by the
//! holder, optionally bound to a verifier-supplied challenge.
//!
//! Embedded credentials are only checked for structure here. Their
//! signatures are the verifier's concern.

use chrono::Utc;
use log::info;

use crate::error::IdentityError;
use crate::models::credential::Credential;
use crate::models::did::Did;
use crate::models::presentation::{Presentation, PresentationBody, PresentationPayload};
use crate::models::token::Token;
use crate::wallet::key_management::PrivateKey;
use crate::wallet::signer::sign_token;

#[derive(Clone, Debug, Default)]
pub struct PresentationBuilder;

impl PresentationBuilder {
    pub fn new() -> Self {
        PresentationBuilder
    }

    /// Builds and signs a presentation of `credentials`, in the given order.
    ///
    /// # Errors
    /// - [`IdentityError::EmptyCredentialSet`] if `credentials` is empty
    /// - [`IdentityError::MalformedToken`] if a credential token does not parse
    /// - [`IdentityError::DidKeyMismatch`] if `holder` is not controlled by `key`
    pub fn present(
        &self,
        credentials: &[Credential],
        holder: &Did,
        key: &PrivateKey,
        challenge: Option<&str>,
    ) -> Result<Presentation, IdentityError> {
        let tokens: Vec<String> = credentials.iter().map(|c| c.token.clone()).collect();
        self.present_tokens(tokens, holder, key, challenge)
    }

    /// Same as [`PresentationBuilder::present`] for raw credential tokens.
    pub fn present_tokens(
        &self,
        credential_tokens: Vec<String>,
        holder: &Did,
        key: &PrivateKey,
        challenge: Option<&str>,
    ) -> Result<Presentation, IdentityError> {
        if credential_tokens.is_empty() {
            return Err(IdentityError::EmptyCredentialSet);
        }
        for (index, token) in credential_tokens.iter().enumerate() {
            Token::parse(token).map_err(|e| {
                IdentityError::MalformedToken(format!("credential {}: {}", index, e))
            })?;
        }

        let payload = PresentationPayload {
            vp: PresentationBody::new(credential_tokens.clone()),
            nbf: Utc::now().timestamp(),
            nonce: challenge.map(str::to_string),
            iss: None,
        };
        let token = sign_token(key, &payload, holder)?;

        info!(
            "built presentation of {} credential(s) for {}",
            credential_tokens.len(),
            holder
        );
        Ok(Presentation {
            holder_did: holder.to_string(),
            credential_tokens,
            challenge: challenge.map(str::to_string),
            token: token.into_string(),
        })
    }
}
