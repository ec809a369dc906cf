// src/wallet/key_management.rs
//! Cryptographic key management for the DID wallet.
//!
//! Provides generation of DID-bound key pairs and deterministic DID
//! derivation. Uses the following primitives:
//! - secp256k1 curve (via `k256` crate)
//! - Keccak-256 address derivation (via `ethers` crate)
//! - Operating-system random number generation
//!
//! Nothing here persists key material; see
//! [`crate::wallet::identity_storage`] for that.

use ethers::types::Address;
use ethers::utils::{hex, to_checksum};
use k256::ecdsa::{SigningKey, VerifyingKey};
use k256::elliptic_curve::zeroize::Zeroize;
use log::debug;
use rand::rngs::OsRng;
use rand::{CryptoRng, RngCore};
use std::fmt;

use crate::error::IdentityError;
use crate::models::did::Did;
use crate::utils::crypto::address_from_public_key;

/// A secp256k1 private key.
///
/// The key can only be used through the signer; its `Debug` output is
/// redacted and the scalar is zeroized on drop.
#[derive(Clone)]
pub struct PrivateKey(SigningKey);

impl PrivateKey {
    /// Parses a 32-byte hex key, with or without a `0x` prefix.
    ///
    /// # Errors
    /// [`IdentityError::SigningKeyInvalid`] if the string is not 64 hex
    /// digits or the value is zero or not below the curve order.
    pub fn from_hex(value: &str) -> Result<Self, IdentityError> {
        let trimmed = value.trim();
        let hex_part = trimmed.strip_prefix("0x").unwrap_or(trimmed);
        let mut bytes = hex::decode(hex_part)
            .map_err(|e| IdentityError::SigningKeyInvalid(format!("not hex: {}", e)))?;
        let key = Self::from_bytes(&bytes);
        bytes.zeroize();
        key
    }

    /// Interprets 32 raw bytes as a private scalar.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, IdentityError> {
        if bytes.len() != 32 {
            return Err(IdentityError::SigningKeyInvalid(format!(
                "expected 32 bytes, got {}",
                bytes.len()
            )));
        }
        SigningKey::from_slice(bytes)
            .map(PrivateKey)
            .map_err(|_| IdentityError::SigningKeyInvalid("scalar out of range".to_string()))
    }

    pub(crate) fn signing_key(&self) -> &SigningKey {
        &self.0
    }

    /// The public point for this key.
    pub fn public_key(&self) -> VerifyingKey {
        *self.0.verifying_key()
    }

    /// The account address derived from the public key.
    pub fn address(&self) -> Address {
        address_from_public_key(self.0.verifying_key())
    }

    /// `0x`-prefixed hex of the scalar, for handing to secure storage only.
    pub(crate) fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0.to_bytes()))
    }
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PrivateKey(<redacted>)")
    }
}

/// A DID-bound key pair.
///
/// # Fields
/// - private key (never exposed outside signing and secure storage)
/// - public key: uncompressed SEC1 point
/// - address: last 20 bytes of Keccak-256 over the public point
#[derive(Clone, Debug)]
pub struct KeyPair {
    private_key: PrivateKey,
    public_key: VerifyingKey,
    address: Address,
}

impl KeyPair {
    /// Derives the public key and address for an existing private key.
    pub fn from_private_key(private_key: PrivateKey) -> Self {
        let public_key = private_key.public_key();
        let address = address_from_public_key(&public_key);
        KeyPair {
            private_key,
            public_key,
            address,
        }
    }

    pub fn private_key(&self) -> &PrivateKey {
        &self.private_key
    }

    pub fn public_key(&self) -> &VerifyingKey {
        &self.public_key
    }

    /// Uncompressed public key (`0x04 || X || Y`) as `0x`-prefixed hex.
    pub fn public_key_hex(&self) -> String {
        format!(
            "0x{}",
            hex::encode(self.public_key.to_encoded_point(false).as_bytes())
        )
    }

    pub fn address(&self) -> Address {
        self.address
    }

    /// EIP-55 checksummed address, as shown to users and registrars.
    pub fn address_checksum(&self) -> String {
        to_checksum(&self.address, None)
    }
}

/// Generates key pairs and derives their DIDs.
///
/// Stateless apart from the configured DID method, so one vault can be
/// shared freely between callers.
#[derive(Clone, Debug)]
pub struct KeyVault {
    method: String,
}

impl KeyVault {
    /// Creates a vault that derives `did:<method>:...` identifiers.
    pub fn new(method: &str) -> Self {
        KeyVault {
            method: method.to_string(),
        }
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    /// Generates a fresh key pair from the operating-system RNG.
    ///
    /// # Errors
    /// [`IdentityError::EntropyUnavailable`] if the OS cannot supply random bytes.
    pub fn generate(&self) -> Result<KeyPair, IdentityError> {
        self.generate_from(&mut OsRng)
    }

    /// Generates a key pair from the given random source.
    ///
    /// Draws 32 bytes at a time until they form a valid private scalar
    /// (a non-zero value below the curve order).
    pub fn generate_from<R: RngCore + CryptoRng>(
        &self,
        rng: &mut R,
    ) -> Result<KeyPair, IdentityError> {
        let mut bytes = [0u8; 32];
        loop {
            rng.try_fill_bytes(&mut bytes)
                .map_err(|e| IdentityError::EntropyUnavailable(e.to_string()))?;
            let candidate = PrivateKey::from_bytes(&bytes);
            if let Ok(private_key) = candidate {
                bytes.zeroize();
                let pair = KeyPair::from_private_key(private_key);
                debug!("generated key pair for address {}", pair.address_checksum());
                return Ok(pair);
            }
            debug!("random bytes outside curve order, drawing again");
        }
    }

    /// Derives the DID for `address` on `network`.
    ///
    /// Pure: the same address and network always yield the same string,
    /// with the address lowercased.
    pub fn derive_did(&self, address: &Address, network: &str) -> Did {
        Did::new(&self.method, network, *address)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Random source whose OS backend is unavailable.
    struct FailingRng;

    impl RngCore for FailingRng {
        fn next_u32(&mut self) -> u32 {
            unimplemented!()
        }
        fn next_u64(&mut self) -> u64 {
            unimplemented!()
        }
        fn fill_bytes(&mut self, _dest: &mut [u8]) {
            unimplemented!()
        }
        fn try_fill_bytes(&mut self, _dest: &mut [u8]) -> Result<(), rand::Error> {
            Err(rand::Error::new("entropy source offline"))
        }
    }

    impl CryptoRng for FailingRng {}

    /// Yields an all-zero (invalid) scalar first, then bytes of value 1.
    struct ZeroThenOnesRng {
        calls: usize,
    }

    impl RngCore for ZeroThenOnesRng {
        fn next_u32(&mut self) -> u32 {
            unimplemented!()
        }
        fn next_u64(&mut self) -> u64 {
            unimplemented!()
        }
        fn fill_bytes(&mut self, dest: &mut [u8]) {
            let byte = if self.calls == 0 { 0 } else { 1 };
            dest.iter_mut().for_each(|b| *b = byte);
            self.calls += 1;
        }
        fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
            self.fill_bytes(dest);
            Ok(())
        }
    }

    impl CryptoRng for ZeroThenOnesRng {}

    #[test]
    fn test_generate_produces_consistent_pair() {
        let vault = KeyVault::new("ethr");
        let pair = vault.generate().unwrap();

        assert_eq!(pair.address(), pair.private_key().address());
        let public_hex = pair.public_key_hex();
        assert!(public_hex.starts_with("0x04"));
        assert_eq!(public_hex.len(), 2 + 130);
        assert_eq!(pair.address_checksum().len(), 42);
    }

    #[test]
    fn test_generate_reports_missing_entropy() {
        let vault = KeyVault::new("ethr");
        let result = vault.generate_from(&mut FailingRng);
        assert!(matches!(result, Err(IdentityError::EntropyUnavailable(_))));
    }

    #[test]
    fn test_generate_redraws_invalid_scalar() {
        let vault = KeyVault::new("ethr");
        let mut rng = ZeroThenOnesRng { calls: 0 };
        let pair = vault.generate_from(&mut rng).unwrap();
        assert_eq!(rng.calls, 2);
        assert_eq!(
            pair.private_key().to_hex(),
            format!("0x{}", "01".repeat(32))
        );
    }

    #[test]
    fn test_derive_did_is_deterministic() {
        let vault = KeyVault::new("ethr");
        let pair = vault.generate().unwrap();
        let first = vault.derive_did(&pair.address(), "sepolia");
        let second = vault.derive_did(&pair.address(), "sepolia");
        assert_eq!(first.to_string(), second.to_string());
        assert_eq!(
            first.to_string(),
            format!("did:ethr:sepolia:{}", pair.address_checksum().to_lowercase())
        );
    }

    #[test]
    fn test_private_key_hex_round_trip() {
        let pair = KeyVault::new("ethr").generate().unwrap();
        let hex_key = pair.private_key().to_hex();
        let restored = PrivateKey::from_hex(&hex_key).unwrap();
        assert_eq!(restored.address(), pair.address());
        // Prefix is optional.
        let restored = PrivateKey::from_hex(&hex_key[2..]).unwrap();
        assert_eq!(restored.address(), pair.address());
    }

    #[test]
    fn test_private_key_rejects_invalid_input() {
        let zero = "00".repeat(32);
        let above_order = "ff".repeat(32);
        for bad in ["", "0x1234", "zz", zero.as_str(), above_order.as_str()] {
            assert!(
                matches!(PrivateKey::from_hex(bad), Err(IdentityError::SigningKeyInvalid(_))),
                "expected rejection of {:?}",
                bad
            );
        }
    }

    #[test]
    fn test_debug_is_redacted() {
        let pair = KeyVault::new("ethr").generate().unwrap();
        let hex_key = pair.private_key().to_hex();
        let debug = format!("{:?}", pair);
        assert!(debug.contains("<redacted>"));
        assert!(!debug.contains(&hex_key[2..]));
    }
}
