// src/utils/mod.rs
//! Helper functions shared across the wallet core.

pub mod crypto;
pub mod serialization;
