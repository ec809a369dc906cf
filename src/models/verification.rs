// src/models/verification.rs
//! Verification verdicts.
//!
//! Verification failure is an expected outcome, so the verifier reports it
//! as a [`VerificationResult`] instead of an error.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Why a token was rejected.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureReason {
    /// Header, payload or signature could not be extracted, or required
    /// type/context markers are missing.
    MalformedToken,
    /// The signature does not recover to the key named in the token.
    SignatureInvalid,
    /// A credential's signer is not its claimed issuer.
    IssuerMismatch,
    /// A presentation's signer is not its claimed holder.
    HolderMismatch,
    /// The token's `nbf` is in the future.
    NotYetValid,
    /// The token's `exp` has passed.
    Expired,
    /// The presentation nonce differs from the verifier's challenge.
    ChallengeMismatch,
    /// A challenge was required but not supplied.
    ChallengeRequired,
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            FailureReason::MalformedToken => "malformed token",
            FailureReason::SignatureInvalid => "signature invalid",
            FailureReason::IssuerMismatch => "issuer mismatch",
            FailureReason::HolderMismatch => "holder mismatch",
            FailureReason::NotYetValid => "not yet valid",
            FailureReason::Expired => "expired",
            FailureReason::ChallengeMismatch => "challenge mismatch",
            FailureReason::ChallengeRequired => "challenge required",
        };
        f.write_str(text)
    }
}

/// A rule in the verification pipeline.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Check {
    Structure,
    Signature,
    DidBinding,
    Temporal,
    Challenge,
    /// Verification of the presentation's credential at this index.
    EmbeddedCredential(usize),
}

/// Outcome of one rule.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct CheckOutcome {
    pub check: Check,
    pub passed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<FailureReason>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl CheckOutcome {
    pub fn pass(check: Check) -> Self {
        CheckOutcome {
            check,
            passed: true,
            reason: None,
            detail: None,
        }
    }

    pub fn fail(check: Check, reason: FailureReason, detail: impl Into<String>) -> Self {
        CheckOutcome {
            check,
            passed: false,
            reason: Some(reason),
            detail: Some(detail.into()),
        }
    }
}

/// Aggregate verdict for a credential or presentation token.
///
/// `reasons` lists the checks in the order they ran; the pipeline stops at
/// the first failure, so a failing result ends with exactly one failed check.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct VerificationResult {
    pub verified: bool,
    /// Subject DID for credentials, holder DID for presentations, when known.
    pub subject_or_holder_did: Option<String>,
    pub reasons: Vec<CheckOutcome>,
}

impl VerificationResult {
    pub(crate) fn new() -> Self {
        VerificationResult {
            verified: false,
            subject_or_holder_did: None,
            reasons: Vec::new(),
        }
    }

    /// The first failing reason, if any.
    pub fn failure(&self) -> Option<FailureReason> {
        self.reasons.iter().find_map(|outcome| outcome.reason)
    }

    /// The first failed check, if any.
    pub fn failed_check(&self) -> Option<Check> {
        self.reasons
            .iter()
            .find(|outcome| !outcome.passed)
            .map(|outcome| outcome.check)
    }
}
