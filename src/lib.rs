// src/lib.rs

//! # DID Wallet
//!
//! On-device identity key lifecycle plus a signing and verification engine
//! for W3C Verifiable Credentials and Presentations.
//!
//! ## Layout
//! 1. **Wallet**: key generation, DID derivation, signing, local storage
//! 2. **Services**: credential issuance, presentation building, verification,
//!    DID ownership proofs and onboarding
//! 3. **Blockchain**: the remote registrar that anchors ownership proofs
//! 4. **Storage**: the secure key/value capability the wallet persists through
//!
//! Private keys never leave the wallet: tokens and proofs are signed locally
//! and carry recoverable signatures, so a verifier needs nothing but the token.

pub mod blockchain;
pub mod error;
pub mod models;
pub mod services;
pub mod settings;
pub mod storage;
pub mod utils;
pub mod wallet;

pub use error::IdentityError;
pub use models::credential::{Claims, Credential};
pub use models::did::Did;
pub use models::presentation::Presentation;
pub use models::verification::{Check, CheckOutcome, FailureReason, VerificationResult};
pub use services::credential_issuer::CredentialIssuer;
pub use services::presentation_builder::PresentationBuilder;
pub use services::registration::{Onboarding, OnboardingOutcome, OwnershipProof};
pub use services::verifier::{VerificationPolicy, Verifier};
pub use settings::Settings;
pub use storage::secure_store::{MemoryStore, SecureStore};
pub use wallet::key_management::{KeyPair, KeyVault, PrivateKey};
pub use wallet::Wallet;
