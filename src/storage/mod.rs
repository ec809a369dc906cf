// src/storage/mod.rs
//! Storage layer consumed by the wallet.

pub mod secure_store;
