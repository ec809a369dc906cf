// src/models/mod.rs
//! Data structures shared by the wallet, services and verifier.

pub mod credential;
pub mod did;
pub mod presentation;
pub mod token;
pub mod verification;
