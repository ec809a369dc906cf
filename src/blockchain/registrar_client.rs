// src/blockchain/registrar_client.rs
//! Client for the remote DID registrar.
//!
//! The registrar anchors a DID ownership proof on a shared ledger and
//! answers with the transaction receipt. Submission is a single request;
//! retry policy belongs to the caller.

use async_trait::async_trait;
use log::{debug, info, warn};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::IdentityError;

/// Path appended to the registrar base URL.
pub const REGISTER_PATH: &str = "/register-did";

/// Body of a registration request.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationRequest {
    pub did: String,
    /// Uncompressed SEC1 public key, `0x04...`.
    pub public_key: String,
    /// Checksummed account address.
    pub address: String,
    /// Hex EIP-191 signature over `message`.
    pub signature: String,
    pub message: String,
}

/// Ledger receipt returned by the registrar.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TxReceipt {
    pub tx_hash: String,
    pub block_number: u64,
}

/// Anything that can anchor a DID registration.
#[async_trait]
pub trait Registrar: Send + Sync {
    /// Submits one registration.
    ///
    /// # Errors
    /// [`IdentityError::RegistrarUnavailable`] on transport failure or rejection.
    async fn submit_registration(
        &self,
        request: &RegistrationRequest,
    ) -> Result<TxReceipt, IdentityError>;
}

/// [`Registrar`] speaking JSON over HTTP.
///
/// Sends `POST <base_url>/register-did` with a [`RegistrationRequest`] body
/// and expects a [`TxReceipt`] back.
#[derive(Clone, Debug)]
pub struct HttpRegistrar {
    client: Client,
    endpoint: String,
}

impl HttpRegistrar {
    /// Creates a registrar client.
    ///
    /// # Arguments
    /// * `base_url` - Registrar root URL, with or without trailing slash
    /// * `timeout` - Deadline for the whole request
    ///
    /// # Errors
    /// Returns [`IdentityError::RegistrarUnavailable`] if the HTTP client
    /// cannot be built.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, IdentityError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| IdentityError::RegistrarUnavailable(e.to_string()))?;
        Ok(HttpRegistrar {
            client,
            endpoint: format!("{}{}", base_url.trim_end_matches('/'), REGISTER_PATH),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl Registrar for HttpRegistrar {
    async fn submit_registration(
        &self,
        request: &RegistrationRequest,
    ) -> Result<TxReceipt, IdentityError> {
        debug!("submitting registration for {} to {}", request.did, self.endpoint);

        let response = self
            .client
            .post(&self.endpoint)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                warn!("registrar request failed: {}", e);
                IdentityError::RegistrarUnavailable(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("registrar rejected {}: {} {}", request.did, status, body);
            return Err(IdentityError::RegistrarUnavailable(format!(
                "registrar returned {}: {}",
                status, body
            )));
        }

        let receipt: TxReceipt = response
            .json()
            .await
            .map_err(|e| IdentityError::RegistrarUnavailable(format!("bad receipt: {}", e)))?;
        info!(
            "registered {} in tx {} (block {})",
            request.did, receipt.tx_hash, receipt.block_number
        );
        Ok(receipt)
    }
}
