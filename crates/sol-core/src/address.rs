//! Base58 codec and address helpers.
//!
//! Solana addresses are Base58-encoded 32-byte Ed25519 public keys. There is
//! no hashing step — the public key bytes ARE the address bytes. The alphabet
//! is the standard Bitcoin alphabet (no `0`, `O`, `I`, `l`), and leading zero
//! bytes encode as leading `'1'` characters.

use crate::error::CoreError;

/// Encode arbitrary bytes as a Base58 string.
pub fn encode(bytes: &[u8]) -> String {
    bs58::encode(bytes).into_string()
}

/// Decode a Base58 string into bytes.
///
/// Characters outside the alphabet are reported with their position.
pub fn decode(text: &str) -> Result<Vec<u8>, CoreError> {
    bs58::decode(text).into_vec().map_err(|e| match e {
        bs58::decode::Error::InvalidCharacter { character, index } => {
            CoreError::InvalidCharacter { character, index }
        }
        other => CoreError::InvalidAddress(format!("base58 decode failed: {other}")),
    })
}

/// Decode an address string to its 32-byte public key form.
pub fn address_to_bytes(address: &str) -> Result<[u8; 32], CoreError> {
    let bytes = decode(address)?;
    bytes.try_into().map_err(|v: Vec<u8>| {
        CoreError::InvalidAddress(format!("expected 32 bytes, got {}", v.len()))
    })
}

/// Encode 32 bytes as an address string.
pub fn bytes_to_address(bytes: &[u8; 32]) -> String {
    bs58::encode(bytes).into_string()
}

/// Validate that a string is a well-formed address (Base58, 32 bytes).
pub fn validate_address(address: &str) -> Result<(), CoreError> {
    address_to_bytes(address).map(|_| ())
}
