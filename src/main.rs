// src/main.rs

//! # DID Wallet - Demo Entry Point
//!
//! Walks one holder through the whole credential lifecycle against an
//! in-memory store and prints each artifact as JSON.
//!
//! ## Flow
//! 1. Load `.env` and settings, initialize logging
//! 2. Create an identity (and register it when `registrar.url` is set)
//! 3. Self-issue a credential and verify it
//! 4. Present it bound to a challenge and verify the presentation
//!
//! ## Environment Variables
//! - `DID_WALLET__NETWORK`: DID network segment (default: mainnet)
//! - `DID_WALLET__REGISTRAR__URL`: (Optional) registrar root URL
//! - `RUST_LOG`: log filter, e.g. `did_wallet=debug`

use anyhow::Context;
use dotenv::dotenv;
use log::info;
use serde_json::json;
use std::sync::Arc;

use did_wallet::blockchain::registrar_client::HttpRegistrar;
use did_wallet::{Claims, KeyVault, MemoryStore, Onboarding, Settings, Verifier, Wallet};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    env_logger::init();

    let settings = Settings::load().context("failed to load settings")?;
    info!("using did:{} on {}", settings.did_method, settings.network);

    let wallet = Wallet::new(Arc::new(MemoryStore::new()));
    let vault = KeyVault::new(&settings.did_method);

    match &settings.registrar.url {
        Some(url) => {
            let registrar = HttpRegistrar::new(url, settings.registrar.timeout())?;
            let outcome = Onboarding::new(Arc::new(registrar))
                .create_and_register(&wallet, &vault, &settings.network)
                .await?;
            let registration = match &outcome.registration {
                Ok(receipt) => json!(receipt),
                Err(e) => json!({ "error": e.to_string() }),
            };
            print_json(
                "identity",
                &json!({
                    "did": outcome.did,
                    "address": outcome.address,
                    "publicKey": outcome.public_key,
                    "registration": registration,
                }),
            )?;
        }
        None => {
            let identity = wallet.create_identity(&vault, &settings.network)?;
            print_json(
                "identity",
                &json!({
                    "did": identity.did,
                    "address": identity.key_pair.address_checksum(),
                    "publicKey": identity.key_pair.public_key_hex(),
                }),
            )?;
        }
    }

    let did = wallet.active_identity()?.did;
    let mut claims = Claims::new();
    claims.insert("role".to_string(), "admin".to_string());
    let credential = wallet.issue_credential(claims, &did)?;
    print_json("credential", &json!(credential))?;

    let verifier = Verifier::new(settings.verification.clone());
    print_json(
        "credential verification",
        &json!(verifier.verify_credential(&credential.token)),
    )?;

    let challenge = format!("{:016x}", rand::random::<u64>());
    let presentation = wallet.present(&[credential.id.as_str()], Some(&challenge))?;
    print_json("presentation", &json!(presentation))?;
    print_json(
        "presentation verification",
        &json!(verifier.verify_presentation(&presentation.token, Some(&challenge))),
    )?;
    print_json(
        "replayed with another challenge",
        &json!(verifier.verify_presentation(&presentation.token, Some("stale-challenge"))),
    )?;

    Ok(())
}

fn print_json(label: &str, value: &serde_json::Value) -> anyhow::Result<()> {
    println!("== {}\n{}", label, serde_json::to_string_pretty(value)?);
    Ok(())
}
