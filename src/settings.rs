// src/settings.rs
//! Runtime settings.
//!
//! Built-in defaults overlaid with `DID_WALLET__*` environment variables,
//! using `__` between nested keys:
//!
//! ```text
//! DID_WALLET__DID_METHOD=ethr
//! DID_WALLET__NETWORK=sepolia
//! DID_WALLET__REGISTRAR__URL=https://registrar.example.org
//! DID_WALLET__REGISTRAR__TIMEOUT_SECS=10
//! DID_WALLET__VERIFICATION__REQUIRE_CHALLENGE=true
//! ```

use config::{Config, Environment, Source};
use serde::Deserialize;
use std::time::Duration;

use crate::error::IdentityError;
use crate::services::verifier::VerificationPolicy;

pub const ENV_PREFIX: &str = "DID_WALLET";

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct RegistrarSettings {
    /// Registrar root URL; no registration is attempted without one.
    pub url: Option<String>,
    pub timeout_secs: u64,
}

impl RegistrarSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Settings {
    pub did_method: String,
    pub network: String,
    pub registrar: RegistrarSettings,
    pub verification: VerificationPolicy,
}

impl Settings {
    /// Loads defaults plus environment overrides.
    pub fn load() -> Result<Self, IdentityError> {
        Self::from_source(Environment::with_prefix(ENV_PREFIX).separator("__"))
    }

    /// Loads defaults overlaid with `source`.
    pub fn from_source<S>(source: S) -> Result<Self, IdentityError>
    where
        S: Source + Send + Sync + 'static,
    {
        let defaults = VerificationPolicy::default();
        let settings = Config::builder()
            .set_default("did_method", "ethr")?
            .set_default("network", "mainnet")?
            .set_default("registrar.timeout_secs", 30_i64)?
            .set_default("verification.enforce_not_before", defaults.enforce_not_before)?
            .set_default("verification.require_challenge", defaults.require_challenge)?
            .set_default("verification.clock_skew_secs", defaults.clock_skew_secs)?
            .add_source(source)
            .build()?;
        Ok(settings.try_deserialize()?)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            did_method: "ethr".to_string(),
            network: "mainnet".to_string(),
            registrar: RegistrarSettings {
                url: None,
                timeout_secs: 30,
            },
            verification: VerificationPolicy::default(),
        }
    }
}
