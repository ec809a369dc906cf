// src/blockchain/mod.rs
//! Ledger-facing collaborators.

pub mod registrar_client;
