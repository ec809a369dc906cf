// src/services/mod.rs
//! Issuance, presentation, verification and registration services.

pub mod credential_issuer;
pub mod presentation_builder;
pub mod registration;
pub mod verifier;
