//! Ed25519 key derivation, signing, and verification.
//!
//! Key material comes in two shapes: a 32-byte seed (expanded per RFC 8032:
//! SHA-512, clamp byte 0 with `& 0xF8` and byte 31 with `& 0x7F | 0x40`,
//! scalar-multiply the basepoint) or a 64-byte `seed ‖ public-key` pair as
//! exported by most Solana wallets. The engine only borrows the bytes for the
//! duration of a call and zeroizes every transient copy.

use ed25519_dalek::{Signer, SigningKey, VerifyingKey};
use zeroize::Zeroize;

use crate::error::CoreError;

/// Length of a public key / address in bytes.
pub const PUBLIC_KEY_LEN: usize = 32;
/// Length of an Ed25519 signature in bytes.
pub const SIGNATURE_LEN: usize = 64;

/// Derive the 32-byte public key from raw key material.
///
/// A 64-byte keypair is already expanded: the trailing 32 bytes are returned
/// verbatim. A 32-byte seed is run through the RFC 8032 expansion. Any other
/// length is rejected.
pub fn derive_public_key(key_material: &[u8]) -> Result<[u8; 32], CoreError> {
    match key_material.len() {
        64 => {
            let mut pubkey = [0u8; 32];
            pubkey.copy_from_slice(&key_material[32..]);
            Ok(pubkey)
        }
        32 => {
            let signing_key = signing_key_from_seed(&key_material[..32]);
            Ok(signing_key.verifying_key().to_bytes())
        }
        other => Err(CoreError::InvalidKeyLength(other)),
    }
}

/// Sign a message with the given key material (deterministic, RFC 8032).
///
/// For 64-byte material the leading 32 bytes are the seed.
pub fn sign(message: &[u8], key_material: &[u8]) -> Result<[u8; 64], CoreError> {
    let seed = match key_material.len() {
        32 => &key_material[..32],
        64 => &key_material[..32],
        other => return Err(CoreError::InvalidKeyLength(other)),
    };
    let signing_key = signing_key_from_seed(seed);
    Ok(signing_key.sign(message).to_bytes())
}

/// Verify a signature over a message.
///
/// Structural problems (wrong lengths, undecodable public key) are a normal
/// `false`, not an error — verification failure is an expected outcome.
pub fn verify(message: &[u8], signature: &[u8], public_key: &[u8]) -> bool {
    let Ok(sig_bytes) = <[u8; 64]>::try_from(signature) else {
        return false;
    };
    let Ok(key_bytes) = <[u8; 32]>::try_from(public_key) else {
        return false;
    };
    let Ok(verifying_key) = VerifyingKey::from_bytes(&key_bytes) else {
        return false;
    };
    let sig = ed25519_dalek::Signature::from_bytes(&sig_bytes);
    verifying_key.verify_strict(message, &sig).is_ok()
}

/// Check whether 32 bytes decode to a valid Edwards curve point.
///
/// Decompression failure means "not on the curve". Program derived addresses
/// rely on this being a real point decode, not a bit heuristic.
pub fn is_on_curve(candidate: &[u8; 32]) -> bool {
    curve25519_dalek::edwards::CompressedEdwardsY(*candidate)
        .decompress()
        .is_some()
}

fn signing_key_from_seed(seed: &[u8]) -> SigningKey {
    let mut seed_bytes = [0u8; 32];
    seed_bytes.copy_from_slice(seed);
    let signing_key = SigningKey::from_bytes(&seed_bytes);
    seed_bytes.zeroize();
    signing_key
}
