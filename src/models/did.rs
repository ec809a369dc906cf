// src/models/did.rs
//! Decentralized Identifier (DID) data model.
//!
//! DIDs in this wallet bind a method and network to an account address:
//!
//! ```text
//! did:<method>:<network>:<address>
//! ```
//!
//! The address segment is always lowercased, so deriving a DID twice from
//! the same address and network yields the identical string.

use ethers::types::Address;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::error::IdentityError;
use crate::utils::crypto::{format_address, parse_address};

/// A parsed, canonical DID.
///
/// # DID Format
/// - `did:<method>:<network>:<address>` (the form this wallet derives)
/// - `did:<method>:<address>` (accepted when parsing, network omitted)
///
/// The address is the last segment and must be `0x` followed by 40 hex digits.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Did {
    method: String,
    network: Option<String>,
    address: Address,
}

impl Did {
    /// Builds the canonical DID for `address` on `network`.
    pub fn new(method: &str, network: &str, address: Address) -> Self {
        Did {
            method: method.to_string(),
            network: Some(network.to_string()),
            address,
        }
    }

    /// Parses a DID string.
    ///
    /// # Errors
    /// Returns [`IdentityError::InvalidDid`] if:
    /// - The scheme is not `did`
    /// - The method is empty
    /// - The string has fewer than 3 or more than 4 segments
    /// - The last segment is not a valid address
    pub fn parse(s: &str) -> Result<Self, IdentityError> {
        let parts: Vec<&str> = s.split(':').collect();

        if parts.len() < 3 || parts.len() > 4 {
            return Err(IdentityError::invalid_did(
                s,
                format!("expected 3 or 4 segments separated by ':', got {}", parts.len()),
            ));
        }
        if parts[0] != "did" {
            return Err(IdentityError::invalid_did(s, "scheme must be 'did'"));
        }
        if parts[1].is_empty() {
            return Err(IdentityError::invalid_did(s, "method must not be empty"));
        }

        let network = match parts.len() {
            4 if parts[2].is_empty() => {
                return Err(IdentityError::invalid_did(s, "network must not be empty"))
            }
            4 => Some(parts[2].to_string()),
            _ => None,
        };

        let address_part = parts[parts.len() - 1];
        let address = parse_address(address_part)
            .ok_or_else(|| IdentityError::invalid_did(s, "last segment is not an address"))?;

        Ok(Did {
            method: parts[1].to_string(),
            network,
            address,
        })
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn network(&self) -> Option<&str> {
        self.network.as_deref()
    }

    /// The account address this DID is bound to.
    pub fn address(&self) -> Address {
        self.address
    }
}

impl fmt::Display for Did {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.network {
            Some(network) => write!(
                f,
                "did:{}:{}:{}",
                self.method,
                network,
                format_address(&self.address)
            ),
            None => write!(f, "did:{}:{}", self.method, format_address(&self.address)),
        }
    }
}

impl FromStr for Did {
    type Err = IdentityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Did::parse(s)
    }
}

impl Serialize for Did {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Did {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Did::parse(&s).map_err(serde::de::Error::custom)
    }
}
