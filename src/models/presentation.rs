// src/models/presentation.rs
//! Verifiable Presentation data model.

use serde::{Deserialize, Serialize};

use crate::models::credential::CREDENTIALS_CONTEXT;

/// Base presentation type.
pub const PRESENTATION_TYPE: &str = "VerifiablePresentation";

/// The `vp` member of a presentation token payload.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct PresentationBody {
    #[serde(rename = "@context")]
    pub context: Vec<String>,

    #[serde(rename = "type")]
    pub types: Vec<String>,

    /// Credential tokens in presentation order.
    #[serde(rename = "verifiableCredential")]
    pub verifiable_credential: Vec<String>,
}

impl PresentationBody {
    pub fn new(credential_tokens: Vec<String>) -> Self {
        PresentationBody {
            context: vec![CREDENTIALS_CONTEXT.to_string()],
            types: vec![PRESENTATION_TYPE.to_string()],
            verifiable_credential: credential_tokens,
        }
    }

    pub fn has_required_markers(&self) -> bool {
        self.context.iter().any(|c| c == CREDENTIALS_CONTEXT)
            && self.types.iter().any(|t| t == PRESENTATION_TYPE)
    }
}

/// Signed payload of a presentation token.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct PresentationPayload {
    pub vp: PresentationBody,

    /// Creation time, epoch seconds.
    pub nbf: i64,

    /// Verifier-supplied challenge.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nonce: Option<String>,

    /// Holder DID.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
}

/// A Verifiable Presentation built for one sharing event.
///
/// Not persisted by the wallet: the challenge ties it to a single
/// verification context, so a new one is built every time.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Presentation {
    pub holder_did: String,
    pub credential_tokens: Vec<String>,
    pub challenge: Option<String>,
    pub token: String,
}
