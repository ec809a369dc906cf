// src/services/verifier.rs
//! Credential and presentation verification.
//!
//! Verification is a single pass over the token, stopping at the first
//! failing rule:
//!
//! 1. **Structure**: header and signature extract; header names a signer
//! 2. **Signature**: the address recovered from the signature over the
//!    encoded `header.payload` is the one named by the header `kid`
//! 3. **Structure** (payload): payload decodes; required type/context
//!    markers present
//! 4. **DID binding**: the signer is the payload's issuer (credential) or
//!    holder (presentation)
//! 5. **Temporal**: `nbf` not in the future (when enforced), `exp` not passed
//! 6. **Challenge** (presentations): nonce equals the verifier's challenge
//! 7. **Embedded credentials** (presentations): steps 1-5 for each credential
//!
//! The signature is checked before the payload is decoded, so any change
//! to the signed payload bytes reports `SignatureInvalid`.
//!
//! Verifying needs nothing but the token: DIDs embed the signer's address.
//! Failures are returned in the [`VerificationResult`], never as errors.

use chrono::Utc;
use ethers::types::Address;
use log::{debug, warn};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::models::credential::CredentialPayload;
use crate::models::did::Did;
use crate::models::presentation::PresentationPayload;
use crate::models::token::SealedToken;
use crate::models::verification::{Check, CheckOutcome, FailureReason, VerificationResult};
use crate::utils::crypto::format_address;
use crate::wallet::signer::recover_signer;

/// Verifier policy knobs.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct VerificationPolicy {
    /// Reject tokens whose `nbf` lies in the future.
    pub enforce_not_before: bool,
    /// Reject presentations that carry no challenge when the verifier supplies none.
    pub require_challenge: bool,
    /// Tolerance applied to `nbf` and `exp`, in seconds.
    pub clock_skew_secs: i64,
}

impl Default for VerificationPolicy {
    fn default() -> Self {
        VerificationPolicy {
            enforce_not_before: true,
            require_challenge: false,
            clock_skew_secs: 0,
        }
    }
}

/// Which DID a token's signer must match.
#[derive(Clone, Copy)]
enum SignerRole {
    Issuer,
    Holder,
}

impl SignerRole {
    fn mismatch(self) -> FailureReason {
        match self {
            SignerRole::Issuer => FailureReason::IssuerMismatch,
            SignerRole::Holder => FailureReason::HolderMismatch,
        }
    }

    fn label(self) -> &'static str {
        match self {
            SignerRole::Issuer => "issuer",
            SignerRole::Holder => "holder",
        }
    }
}

/// The failing rule of a pipeline run.
struct Rejection {
    check: Check,
    reason: FailureReason,
    detail: String,
}

impl Rejection {
    fn new(check: Check, reason: FailureReason, detail: impl Into<String>) -> Self {
        Rejection {
            check,
            reason,
            detail: detail.into(),
        }
    }

    fn malformed(detail: impl Into<String>) -> Self {
        Rejection::new(Check::Structure, FailureReason::MalformedToken, detail)
    }

    fn bad_signature(detail: impl Into<String>) -> Self {
        Rejection::new(Check::Signature, FailureReason::SignatureInvalid, detail)
    }
}

/// A token whose signature has been checked, with its payload decoded.
struct Signed<P> {
    payload: P,
    signer: Address,
    /// DID asserted in the payload `iss`.
    asserted_did: Did,
}

/// Stateless token verifier.
#[derive(Clone, Debug, Default)]
pub struct Verifier {
    policy: VerificationPolicy,
}

impl Verifier {
    pub fn new(policy: VerificationPolicy) -> Self {
        Verifier { policy }
    }

    pub fn policy(&self) -> &VerificationPolicy {
        &self.policy
    }

    /// Verifies a credential token against the system clock.
    pub fn verify_credential(&self, token: &str) -> VerificationResult {
        self.verify_credential_at(token, Utc::now().timestamp())
    }

    /// Verifies a credential token as of `now` (epoch seconds).
    ///
    /// On success `subject_or_holder_did` is the credential subject.
    pub fn verify_credential_at(&self, token: &str, now: i64) -> VerificationResult {
        let mut result = VerificationResult::new();
        result.verified = self.check_credential(token, now, &mut result);
        log_verdict("credential", &result);
        result
    }

    /// Verifies a presentation token against the system clock.
    pub fn verify_presentation(&self, token: &str, challenge: Option<&str>) -> VerificationResult {
        self.verify_presentation_at(token, challenge, Utc::now().timestamp())
    }

    /// Verifies a presentation token as of `now` (epoch seconds).
    ///
    /// # Arguments
    /// * `token` - Compact presentation token
    /// * `challenge` - The challenge this verifier issued, if any
    /// * `now` - Verification time
    ///
    /// The presentation is verified only if its own signature, binding,
    /// validity window and challenge pass AND every embedded credential passes.
    pub fn verify_presentation_at(
        &self,
        token: &str,
        challenge: Option<&str>,
        now: i64,
    ) -> VerificationResult {
        let mut result = VerificationResult::new();
        let outcome = self.presentation_pipeline(token, challenge, now, &mut result);
        result.verified = settle(outcome, &mut result);
        log_verdict("presentation", &result);
        result
    }

    fn check_credential(&self, compact: &str, now: i64, result: &mut VerificationResult) -> bool {
        let outcome = self.credential_pipeline(compact, now, result);
        settle(outcome, result)
    }

    fn credential_pipeline(
        &self,
        compact: &str,
        now: i64,
        result: &mut VerificationResult,
    ) -> Result<(), Rejection> {
        let signed: Signed<CredentialPayload> = open_signed(compact, result)?;
        if !signed.payload.vc.has_required_markers() {
            return Err(Rejection::malformed(
                "missing VerifiableCredential type or context",
            ));
        }
        result.subject_or_holder_did = Some(signed.payload.sub.clone());

        check_binding(&signed, SignerRole::Issuer, result)?;
        self.check_temporal(signed.payload.nbf, signed.payload.exp, now, result)
    }

    fn presentation_pipeline(
        &self,
        compact: &str,
        challenge: Option<&str>,
        now: i64,
        result: &mut VerificationResult,
    ) -> Result<(), Rejection> {
        let signed: Signed<PresentationPayload> = open_signed(compact, result)?;
        if !signed.payload.vp.has_required_markers() {
            return Err(Rejection::malformed(
                "missing VerifiablePresentation type or context",
            ));
        }
        if signed.payload.vp.verifiable_credential.is_empty() {
            return Err(Rejection::malformed("presentation carries no credentials"));
        }
        result.subject_or_holder_did = Some(signed.asserted_did.to_string());

        check_binding(&signed, SignerRole::Holder, result)?;
        self.check_temporal(signed.payload.nbf, None, now, result)?;
        self.check_challenge(challenge, signed.payload.nonce.as_deref(), result)?;

        for (index, credential) in signed.payload.vp.verifiable_credential.iter().enumerate() {
            let mut embedded = VerificationResult::new();
            if self.check_credential(credential, now, &mut embedded) {
                result
                    .reasons
                    .push(CheckOutcome::pass(Check::EmbeddedCredential(index)));
                continue;
            }

            let failed = embedded.reasons.into_iter().find(|outcome| !outcome.passed);
            let (reason, detail) = match failed {
                Some(CheckOutcome {
                    check,
                    reason: Some(reason),
                    detail,
                    ..
                }) => (
                    reason,
                    format!("{:?}: {}", check, detail.unwrap_or_default()),
                ),
                _ => (FailureReason::MalformedToken, "unknown failure".to_string()),
            };
            return Err(Rejection::new(Check::EmbeddedCredential(index), reason, detail));
        }
        Ok(())
    }

    fn check_temporal(
        &self,
        not_before: i64,
        expires: Option<i64>,
        now: i64,
        result: &mut VerificationResult,
    ) -> Result<(), Rejection> {
        let skew = self.policy.clock_skew_secs;
        if self.policy.enforce_not_before && now.saturating_add(skew) < not_before {
            return Err(Rejection::new(
                Check::Temporal,
                FailureReason::NotYetValid,
                format!("valid from {}, now {}", not_before, now),
            ));
        }
        if let Some(expires) = expires {
            if now.saturating_sub(skew) >= expires {
                return Err(Rejection::new(
                    Check::Temporal,
                    FailureReason::Expired,
                    format!("expired at {}, now {}", expires, now),
                ));
            }
        }
        result.reasons.push(CheckOutcome::pass(Check::Temporal));
        Ok(())
    }

    fn check_challenge(
        &self,
        expected: Option<&str>,
        nonce: Option<&str>,
        result: &mut VerificationResult,
    ) -> Result<(), Rejection> {
        let failure = match (expected, nonce) {
            (Some(expected), Some(nonce)) if expected == nonce => None,
            (Some(_), Some(_)) => Some((
                FailureReason::ChallengeMismatch,
                "presentation nonce differs from challenge",
            )),
            (Some(_), None) => Some((
                FailureReason::ChallengeMismatch,
                "presentation carries no nonce",
            )),
            (None, Some(_)) => Some((
                FailureReason::ChallengeRequired,
                "presentation is bound to a challenge; supply it to verify",
            )),
            (None, None) if self.policy.require_challenge => Some((
                FailureReason::ChallengeRequired,
                "policy requires challenge-bound presentations",
            )),
            (None, None) => None,
        };

        match failure {
            Some((reason, detail)) => Err(Rejection::new(Check::Challenge, reason, detail)),
            None => {
                result.reasons.push(CheckOutcome::pass(Check::Challenge));
                Ok(())
            }
        }
    }
}

/// Records a pipeline's rejection, if any, and returns whether it passed.
fn settle(outcome: Result<(), Rejection>, result: &mut VerificationResult) -> bool {
    match outcome {
        Ok(()) => true,
        Err(rejection) => {
            result.reasons.push(CheckOutcome::fail(
                rejection.check,
                rejection.reason,
                rejection.detail,
            ));
            false
        }
    }
}

/// Checks the signature over the still-encoded token, then decodes the payload.
///
/// Tokens without a `kid` fall back to the payload `iss`, which then has to
/// be decoded before the signature can be compared.
fn open_signed<P: DeserializeOwned>(
    compact: &str,
    result: &mut VerificationResult,
) -> Result<Signed<P>, Rejection> {
    let sealed = SealedToken::parse(compact).map_err(|e| Rejection::malformed(e.to_string()))?;
    let key_did = match sealed.header().signer_did() {
        Some(kid) => Some(
            Did::parse(kid).map_err(|e| Rejection::malformed(format!("header kid: {}", e)))?,
        ),
        None => None,
    };
    result.reasons.push(CheckOutcome::pass(Check::Structure));

    let signer = recover_signer(sealed.signing_input(), sealed.signature())
        .map_err(Rejection::bad_signature)?;
    if let Some(key_did) = &key_did {
        expect_signer(signer, key_did)?;
        result.reasons.push(CheckOutcome::pass(Check::Signature));
    }

    let token = sealed
        .open()
        .map_err(|e| Rejection::malformed(e.to_string()))?;
    let iss = token
        .issuer()
        .ok_or_else(|| Rejection::malformed("payload has no 'iss'"))?;
    let asserted_did = Did::parse(iss).map_err(|e| Rejection::malformed(e.to_string()))?;
    let payload: P = token
        .claims()
        .map_err(|e| Rejection::malformed(e.to_string()))?;

    if key_did.is_none() {
        expect_signer(signer, &asserted_did)?;
        result.reasons.push(CheckOutcome::pass(Check::Signature));
    }

    Ok(Signed {
        payload,
        signer,
        asserted_did,
    })
}

fn expect_signer(recovered: Address, named: &Did) -> Result<(), Rejection> {
    if recovered == named.address() {
        return Ok(());
    }
    Err(Rejection::bad_signature(format!(
        "signature recovers to {}, token names {}",
        format_address(&recovered),
        format_address(&named.address())
    )))
}

/// The signer must be the DID the payload asserts.
fn check_binding<P>(
    signed: &Signed<P>,
    role: SignerRole,
    result: &mut VerificationResult,
) -> Result<(), Rejection> {
    if signed.asserted_did.address() != signed.signer {
        return Err(Rejection::new(
            Check::DidBinding,
            role.mismatch(),
            format!(
                "signed by {}, {} DID is {}",
                format_address(&signed.signer),
                role.label(),
                signed.asserted_did
            ),
        ));
    }
    result.reasons.push(CheckOutcome::pass(Check::DidBinding));
    Ok(())
}

fn log_verdict(kind: &str, result: &VerificationResult) {
    match result.failure() {
        None => debug!(
            "{} verified for {}",
            kind,
            result.subject_or_holder_did.as_deref().unwrap_or("-")
        ),
        Some(reason) => warn!("{} rejected: {}", kind, reason),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::credential::{Claims, Credential};
    use crate::models::token::TokenHeader;
    use crate::services::credential_issuer::CredentialIssuer;
    use crate::services::presentation_builder::PresentationBuilder;
    use crate::utils::serialization::{decode_json_segment, decode_segment, encode_segment};
    use crate::wallet::key_management::{KeyVault, PrivateKey};
    use crate::wallet::signer::sign_compact;
    use chrono::Duration;
    use serde_json::{json, Value};

    fn identity() -> (PrivateKey, Did) {
        let vault = KeyVault::new("example");
        let pair = vault.generate().unwrap();
        let did = vault.derive_did(&pair.address(), "net");
        (pair.private_key().clone(), did)
    }

    fn claims(pairs: &[(&str, &str)]) -> Claims {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn issue(key: &PrivateKey, issuer: &Did, subject: &Did) -> Credential {
        CredentialIssuer::new()
            .issue(claims(&[("role", "admin")]), issuer, subject, key)
            .unwrap()
    }

    /// Re-encodes a token's payload after `edit`, keeping the original signature.
    fn tamper_payload(token: &str, edit: impl FnOnce(&mut Value)) -> String {
        let parts: Vec<&str> = token.split('.').collect();
        let mut payload = decode_json_segment(parts[1]).unwrap();
        edit(&mut payload);
        format!(
            "{}.{}.{}",
            parts[0],
            encode_segment(&serde_json::to_vec(&payload).unwrap()),
            parts[2]
        )
    }

    #[test]
    fn test_issued_credential_verifies() {
        let (key, issuer) = identity();
        let (_, subject) = identity();
        let credential = issue(&key, &issuer, &subject);

        let result = Verifier::default().verify_credential(&credential.token);
        assert!(result.verified, "{:?}", result);
        assert_eq!(result.subject_or_holder_did, Some(subject.to_string()));
        assert_eq!(result.failure(), None);
        let checks: Vec<Check> = result.reasons.iter().map(|r| r.check).collect();
        assert_eq!(
            checks,
            vec![Check::Structure, Check::Signature, Check::DidBinding, Check::Temporal]
        );
    }

    #[test]
    fn test_tampered_claim_is_signature_invalid() {
        let (key, did) = identity();
        let credential = issue(&key, &did, &did);
        let tampered = tamper_payload(&credential.token, |payload| {
            payload["vc"]["credentialSubject"]["role"] = json!("superuser");
        });

        let result = Verifier::default().verify_credential(&tampered);
        assert!(!result.verified);
        assert_eq!(result.failure(), Some(FailureReason::SignatureInvalid));
    }

    #[test]
    fn test_tampered_subject_is_signature_invalid() {
        let (key, did) = identity();
        let (_, other) = identity();
        let credential = issue(&key, &did, &did);
        let tampered = tamper_payload(&credential.token, |payload| {
            payload["sub"] = json!(other.to_string());
        });

        let result = Verifier::default().verify_credential(&tampered);
        assert_eq!(result.failure(), Some(FailureReason::SignatureInvalid));
    }

    #[test]
    fn test_flipped_payload_bits_are_signature_invalid() {
        let (key, did) = identity();
        let credential = issue(&key, &did, &did);
        let parts: Vec<&str> = credential.token.split('.').collect();
        let payload = decode_segment(parts[1]).unwrap();
        let verifier = Verifier::default();

        // One bit per byte, cycling through bit positions, so flips land in
        // string contents, JSON punctuation and UTF-8 lead bits alike.
        for index in 0..payload.len() {
            let mut flipped = payload.clone();
            flipped[index] ^= 1 << (index % 8);
            let token = format!("{}.{}.{}", parts[0], encode_segment(&flipped), parts[2]);

            let result = verifier.verify_credential(&token);
            assert!(!result.verified, "byte {} accepted", index);
            assert_eq!(
                result.failure(),
                Some(FailureReason::SignatureInvalid),
                "byte {}: {:?}",
                index,
                result.reasons
            );
        }
    }

    #[test]
    fn test_undecodable_payload_is_signature_invalid() {
        let (key, did) = identity();
        let credential = issue(&key, &did, &did);
        let parts: Vec<&str> = credential.token.split('.').collect();
        let token = format!("{}.{}.{}", parts[0], encode_segment(&[0xc3, 0x28, b'{']), parts[2]);

        let result = Verifier::default().verify_credential(&token);
        assert_eq!(result.failure(), Some(FailureReason::SignatureInvalid));
        assert_eq!(result.failed_check(), Some(Check::Signature));
    }

    #[test]
    fn test_swapped_issuer_is_signature_invalid() {
        // Claiming someone else's DID in both kid and iss still fails:
        // the signature recovers to the real signer.
        let (key, did) = identity();
        let (_, victim) = identity();
        let header = TokenHeader::for_signer(&victim.to_string());
        let payload = json!({
            "iss": victim.to_string(),
            "sub": did.to_string(),
            "nbf": 0,
            "vc": {
                "@context": ["https://www.w3.org/2018/credentials/v1"],
                "type": ["VerifiableCredential"],
                "credentialSubject": {"role": "admin"}
            }
        });
        let token = sign_compact(&key, &header, &payload).unwrap();

        let result = Verifier::default().verify_credential(&token);
        assert_eq!(result.failure(), Some(FailureReason::SignatureInvalid));
    }

    #[test]
    fn test_signer_not_issuer_is_issuer_mismatch() {
        let (key, did) = identity();
        let (_, claimed) = identity();
        let header = TokenHeader::for_signer(&did.to_string());
        let payload = json!({
            "iss": claimed.to_string(),
            "sub": did.to_string(),
            "nbf": 0,
            "vc": {
                "@context": ["https://www.w3.org/2018/credentials/v1"],
                "type": ["VerifiableCredential"],
                "credentialSubject": {"role": "admin"}
            }
        });
        let token = sign_compact(&key, &header, &payload).unwrap();

        let result = Verifier::default().verify_credential(&token);
        assert!(!result.verified);
        assert_eq!(result.failure(), Some(FailureReason::IssuerMismatch));
        assert_eq!(result.failed_check(), Some(Check::DidBinding));
    }

    #[test]
    fn test_corrupted_signature_is_rejected() {
        let (key, did) = identity();
        let credential = issue(&key, &did, &did);
        let (head, signature) = credential.token.rsplit_once('.').unwrap();
        let mut chars: Vec<char> = signature.chars().collect();
        chars[10] = if chars[10] == 'A' { 'B' } else { 'A' };
        let corrupted = format!("{}.{}", head, chars.into_iter().collect::<String>());

        let result = Verifier::default().verify_credential(&corrupted);
        assert!(!result.verified);
        assert_eq!(result.failure(), Some(FailureReason::SignatureInvalid));
    }

    #[test]
    fn test_garbage_is_malformed() {
        let verifier = Verifier::default();
        for bad in ["", "abc", "a.b.c", "a.b.c.d"] {
            let result = verifier.verify_credential(bad);
            assert!(!result.verified);
            assert_eq!(result.failure(), Some(FailureReason::MalformedToken));
            assert_eq!(result.subject_or_holder_did, None);
        }
    }

    #[test]
    fn test_presentation_token_is_not_a_credential() {
        let (key, did) = identity();
        let credential = issue(&key, &did, &did);
        let presentation = PresentationBuilder::new()
            .present(&[credential], &did, &key, None)
            .unwrap();

        let result = Verifier::default().verify_credential(&presentation.token);
        assert_eq!(result.failure(), Some(FailureReason::MalformedToken));
    }

    #[test]
    fn test_not_before_is_enforced() {
        let (key, did) = identity();
        let credential = issue(&key, &did, &did);
        let issued = credential.issued_at.timestamp();

        let strict = Verifier::default();
        let result = strict.verify_credential_at(&credential.token, issued - 60);
        assert_eq!(result.failure(), Some(FailureReason::NotYetValid));

        let lenient = Verifier::new(VerificationPolicy {
            enforce_not_before: false,
            ..VerificationPolicy::default()
        });
        assert!(lenient.verify_credential_at(&credential.token, issued - 60).verified);

        let skewed = Verifier::new(VerificationPolicy {
            clock_skew_secs: 120,
            ..VerificationPolicy::default()
        });
        assert!(skewed.verify_credential_at(&credential.token, issued - 60).verified);
    }

    #[test]
    fn test_expiry_is_enforced() {
        let (key, did) = identity();
        let expires = Utc::now() + Duration::hours(1);
        let credential = CredentialIssuer::new()
            .issue_with_expiry(claims(&[("a", "b")]), &did, &did, &key, Some(expires))
            .unwrap();
        let verifier = Verifier::default();

        assert!(verifier.verify_credential(&credential.token).verified);
        let result = verifier.verify_credential_at(&credential.token, expires.timestamp());
        assert_eq!(result.failure(), Some(FailureReason::Expired));
    }

    #[test]
    fn test_presentation_challenge_binding() {
        let (key, did) = identity();
        let credential = issue(&key, &did, &did);
        let presentation = PresentationBuilder::new()
            .present(&[credential], &did, &key, Some("abc123"))
            .unwrap();
        let verifier = Verifier::default();

        let wrong = verifier.verify_presentation(&presentation.token, Some("xyz"));
        assert!(!wrong.verified);
        assert_eq!(wrong.failure(), Some(FailureReason::ChallengeMismatch));

        let right = verifier.verify_presentation(&presentation.token, Some("abc123"));
        assert!(right.verified, "{:?}", right);
        assert_eq!(right.subject_or_holder_did, Some(did.to_string()));

        let missing = verifier.verify_presentation(&presentation.token, None);
        assert_eq!(missing.failure(), Some(FailureReason::ChallengeRequired));
    }

    #[test]
    fn test_unbound_presentation_policy() {
        let (key, did) = identity();
        let credential = issue(&key, &did, &did);
        let presentation = PresentationBuilder::new()
            .present(&[credential], &did, &key, None)
            .unwrap();

        assert!(Verifier::default()
            .verify_presentation(&presentation.token, None)
            .verified);

        let strict = Verifier::new(VerificationPolicy {
            require_challenge: true,
            ..VerificationPolicy::default()
        });
        let result = strict.verify_presentation(&presentation.token, None);
        assert_eq!(result.failure(), Some(FailureReason::ChallengeRequired));

        let expecting = Verifier::default().verify_presentation(&presentation.token, Some("c1"));
        assert_eq!(expecting.failure(), Some(FailureReason::ChallengeMismatch));
    }

    #[test]
    fn test_tampered_embedded_credential_fails_presentation() {
        let (key, did) = identity();
        let valid = issue(&key, &did, &did);
        let tampered = tamper_payload(&issue(&key, &did, &did).token, |payload| {
            payload["vc"]["credentialSubject"]["role"] = json!("root");
        });

        let presentation = PresentationBuilder::new()
            .present_tokens(vec![valid.token, tampered], &did, &key, Some("n"))
            .unwrap();
        let result = Verifier::default().verify_presentation(&presentation.token, Some("n"));

        assert!(!result.verified);
        assert_eq!(result.failure(), Some(FailureReason::SignatureInvalid));
        assert_eq!(result.failed_check(), Some(Check::EmbeddedCredential(1)));
        assert!(result
            .reasons
            .contains(&CheckOutcome::pass(Check::EmbeddedCredential(0))));
    }

    #[test]
    fn test_presentation_by_other_holder_is_holder_mismatch() {
        let (key, did) = identity();
        let (_, claimed) = identity();
        let credential = issue(&key, &did, &did);
        let header = TokenHeader::for_signer(&did.to_string());
        let payload = json!({
            "iss": claimed.to_string(),
            "nbf": 0,
            "vp": {
                "@context": ["https://www.w3.org/2018/credentials/v1"],
                "type": ["VerifiablePresentation"],
                "verifiableCredential": [credential.token]
            }
        });
        let token = sign_compact(&key, &header, &payload).unwrap();

        let result = Verifier::default().verify_presentation(&token, None);
        assert_eq!(result.failure(), Some(FailureReason::HolderMismatch));
    }

    #[test]
    fn test_tampered_presentation_nonce_is_signature_invalid() {
        let (key, did) = identity();
        let credential = issue(&key, &did, &did);
        let presentation = PresentationBuilder::new()
            .present(&[credential], &did, &key, Some("c1"))
            .unwrap();
        let replayed = tamper_payload(&presentation.token, |payload| {
            payload["nonce"] = json!("c2");
        });

        let result = Verifier::default().verify_presentation(&replayed, Some("c2"));
        assert_eq!(result.failure(), Some(FailureReason::SignatureInvalid));
    }

    #[test]
    fn test_end_to_end_scenario() {
        let vault = KeyVault::new("example");
        let pair = vault.generate().unwrap();
        let did = vault.derive_did(&pair.address(), "net");
        assert!(did.to_string().starts_with("did:example:net:0x"));

        let credential = CredentialIssuer::new()
            .issue(claims(&[("role", "admin")]), &did, &did, pair.private_key())
            .unwrap();
        let verifier = Verifier::default();
        assert!(verifier.verify_credential(&credential.token).verified);

        let presentation = PresentationBuilder::new()
            .present(&[credential], &did, pair.private_key(), Some("c1"))
            .unwrap();
        assert!(verifier.verify_presentation(&presentation.token, Some("c1")).verified);

        let result = verifier.verify_presentation(&presentation.token, Some("c2"));
        assert!(!result.verified);
        assert_eq!(result.failure(), Some(FailureReason::ChallengeMismatch));
    }
}
