// src/utils/crypto.rs
//! Hashing and address helpers shared by the key vault, signer and verifier.
//!
//! - Keccak-256 (Ethereum's hash) derives addresses from public keys.
//! - SHA-256 digests token signing inputs (`ES256K-R`).

use ethers::types::Address;
use ethers::utils::keccak256;
use k256::ecdsa::VerifyingKey;
use sha2::{Digest, Sha256};

/// Computes a Keccak-256 hash of the input data (Ethereum-compatible).
///
/// # Arguments
/// * `data` - Binary data to hash (as bytes slice)
///
/// # Returns
/// Fixed-size 32-byte array (`[u8; 32]`) containing the hash.
pub fn hash_data(data: &[u8]) -> [u8; 32] {
    keccak256(data)
}

/// Computes the SHA-256 digest used for token signatures.
pub fn sha256(data: &[u8]) -> [u8; 32] {
    Sha256::digest(data).into()
}

/// Derives the 20-byte account address of a secp256k1 public key.
///
/// The address is the last 20 bytes of the Keccak-256 hash of the
/// uncompressed SEC1 point with its `0x04` tag stripped.
pub fn address_from_public_key(public_key: &VerifyingKey) -> Address {
    let point = public_key.to_encoded_point(false);
    let hash = hash_data(&point.as_bytes()[1..]);
    Address::from_slice(&hash[12..])
}

/// Formats an address as lowercase hex with a `0x` prefix.
pub fn format_address(address: &Address) -> String {
    format!("0x{:x}", address)
}

/// Parses a `0x`-prefixed, 40 hex digit address (any case).
///
/// Returns `None` if the string is not a well-formed address.
pub fn parse_address(value: &str) -> Option<Address> {
    let hex_part = value.strip_prefix("0x").or_else(|| value.strip_prefix("0X"))?;
    if hex_part.len() != 40 || !hex_part.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    hex_part.parse::<Address>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use k256::ecdsa::SigningKey;

    #[test]
    fn test_known_address_derivation() {
        // Private key 1 maps to the well-known generator-point address.
        let mut bytes = [0u8; 32];
        bytes[31] = 1;
        let key = SigningKey::from_slice(&bytes).unwrap();
        let address = address_from_public_key(key.verifying_key());
        assert_eq!(
            format_address(&address),
            "0x7e5f4552091a69125d5dfcb7b8c2659029395bdf"
        );
    }

    #[test]
    fn test_parse_address_rejects_garbage() {
        assert!(parse_address("0x7e5f4552091a69125d5dfcb7b8c2659029395bdf").is_some());
        assert!(parse_address("0x7E5F4552091A69125D5DFCB7B8C2659029395BDF").is_some());
        assert!(parse_address("7e5f4552091a69125d5dfcb7b8c2659029395bdf").is_none());
        assert!(parse_address("0x7e5f").is_none());
        assert!(parse_address("0xzz5f4552091a69125d5dfcb7b8c2659029395bdf").is_none());
    }

    #[test]
    fn test_sha256_empty_input() {
        assert_eq!(
            ethers::utils::hex::encode(sha256(b"")),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }
}
