//! Program Derived Address (PDA) search.
//!
//! A PDA is a deterministic 32-byte address that is guaranteed NOT to be a
//! valid Ed25519 point, so no private key can ever sign for it. Derivation
//! scans bump seeds from 255 down to 0 and hashes
//! `SHA-256(seeds ‖ bump ‖ program_id ‖ "ProgramDerivedAddress")`
//! until the digest fails Edwards point decompression.

use sha2::{Digest, Sha256};

use crate::error::CoreError;
use crate::instruction::{ASSOCIATED_TOKEN_PROGRAM_ID, TOKEN_PROGRAM_ID};
use crate::keys::is_on_curve;

/// Domain separator appended to every PDA hash input.
const PDA_MARKER: &[u8] = b"ProgramDerivedAddress";

/// A derived program address together with the bump seed that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PdaResult {
    pub address: [u8; 32],
    pub bump: u8,
}

/// Find the program derived address for `seeds` under `program_id`.
///
/// Returns the first off-curve digest scanning bumps downward from 255.
/// Exhausting all 256 bumps is astronomically unlikely but still a defined
/// error rather than a panic.
pub fn find_program_address(
    seeds: &[&[u8]],
    program_id: &[u8; 32],
) -> Result<PdaResult, CoreError> {
    for bump in (0u8..=255).rev() {
        if let Some(address) = try_create_program_address(seeds, bump, program_id) {
            return Ok(PdaResult { address, bump });
        }
    }
    Err(CoreError::NoViableAddress)
}

/// Hash one candidate. `Some(address)` when the digest is OFF the curve,
/// `None` when it lands on the curve and the next bump must be tried.
fn try_create_program_address(
    seeds: &[&[u8]],
    bump: u8,
    program_id: &[u8; 32],
) -> Option<[u8; 32]> {
    let mut hasher = Sha256::new();
    for seed in seeds {
        hasher.update(seed);
    }
    hasher.update([bump]);
    hasher.update(program_id);
    hasher.update(PDA_MARKER);

    let digest: [u8; 32] = hasher.finalize().into();
    if is_on_curve(&digest) {
        return None;
    }
    Some(digest)
}

/// Derive the associated token account (ATA) for a wallet + mint pair.
///
/// Seeds are `[wallet, token_program, mint]` under the associated-token
/// program.
pub fn derive_associated_token_address(
    wallet: &[u8; 32],
    mint: &[u8; 32],
) -> Result<PdaResult, CoreError> {
    find_program_address(
        &[wallet.as_ref(), &TOKEN_PROGRAM_ID, mint.as_ref()],
        &ASSOCIATED_TOKEN_PROGRAM_ID,
    )
}
