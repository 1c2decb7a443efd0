//! Builders for the well-known instruction layouts.
//!
//! Each builder is pure: given addresses and amounts it returns an
//! [`Instruction`](crate::message::Instruction) value and touches nothing
//! else. Program ids are precomputed 32-byte constants (Base58 cannot be
//! decoded in a const context).

use crate::error::CoreError;
use crate::message::{AccountMeta, Instruction};

/// System program: 32 zero bytes (`11111111111111111111111111111111`).
pub const SYSTEM_PROGRAM_ID: [u8; 32] = [0u8; 32];

/// SPL token program: `TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA`.
pub const TOKEN_PROGRAM_ID: [u8; 32] = [
    0x06, 0xdd, 0xf6, 0xe1, 0xd7, 0x65, 0xa1, 0x93, 0xd9, 0xcb, 0xe1, 0x46, 0xce, 0xeb, 0x79,
    0xac, 0x1c, 0xb4, 0x85, 0xed, 0x5f, 0x5b, 0x37, 0x91, 0x3a, 0x8c, 0xf5, 0x85, 0x7e, 0xff,
    0x00, 0xa9,
];

/// Associated token program: `ATokenGPvbdGVxr1b2hvZbsiqW5xWH25efTNsLJA8knL`.
pub const ASSOCIATED_TOKEN_PROGRAM_ID: [u8; 32] = [
    0x8c, 0x97, 0x25, 0x8f, 0x4e, 0x24, 0x89, 0xf1, 0xbb, 0x3d, 0x10, 0x29, 0x14, 0x8e, 0x0d,
    0x83, 0x0b, 0x5a, 0x13, 0x99, 0xda, 0xff, 0x10, 0x84, 0x04, 0x8e, 0x7b, 0xd8, 0xdb, 0xe9,
    0xf8, 0x59,
];

/// Rent sysvar: `SysvarRent111111111111111111111111111111111`.
pub const RENT_SYSVAR_ID: [u8; 32] = [
    0x06, 0xa7, 0xd5, 0x17, 0x19, 0x2c, 0x5c, 0x51, 0x21, 0x8c, 0xc9, 0x4c, 0x3d, 0x4a, 0xf1,
    0x7f, 0x58, 0xda, 0xee, 0x08, 0x9b, 0xa1, 0xfd, 0x44, 0xe3, 0xdb, 0xd9, 0x8a, 0x00, 0x00,
    0x00, 0x00,
];

/// System program `Transfer` discriminant (little-endian u32).
const SYSTEM_TRANSFER_INDEX: u32 = 2;

/// SPL token `Transfer` discriminant (single byte).
const TOKEN_TRANSFER_INDEX: u8 = 3;

/// Build a native lamport transfer.
///
/// Data: u32 LE discriminant (2) + u64 LE lamports, 12 bytes total.
pub fn system_transfer(
    from: &[u8; 32],
    to: &[u8; 32],
    lamports: u64,
) -> Result<Instruction, CoreError> {
    if lamports == 0 {
        return Err(CoreError::MessageBuild("lamports must be > 0".into()));
    }

    let mut data = Vec::with_capacity(12);
    data.extend_from_slice(&SYSTEM_TRANSFER_INDEX.to_le_bytes());
    data.extend_from_slice(&lamports.to_le_bytes());

    Ok(Instruction {
        program_id: SYSTEM_PROGRAM_ID,
        accounts: vec![
            AccountMeta::writable(*from, true),
            AccountMeta::writable(*to, false),
        ],
        data,
    })
}

/// Build an SPL token transfer between two token accounts.
///
/// Data: discriminant (3) + u64 LE amount, 9 bytes total. `decimals` is kept
/// for API parity with `TransferChecked` and does not enter the layout.
pub fn token_transfer(
    source: &[u8; 32],
    destination: &[u8; 32],
    authority: &[u8; 32],
    amount: u64,
    _decimals: u8,
) -> Result<Instruction, CoreError> {
    if amount == 0 {
        return Err(CoreError::MessageBuild("token amount must be > 0".into()));
    }

    let mut data = Vec::with_capacity(9);
    data.push(TOKEN_TRANSFER_INDEX);
    data.extend_from_slice(&amount.to_le_bytes());

    Ok(Instruction {
        program_id: TOKEN_PROGRAM_ID,
        accounts: vec![
            AccountMeta::writable(*source, false),
            AccountMeta::writable(*destination, false),
            AccountMeta::readonly(*authority, true),
        ],
        data,
    })
}

/// Build an associated-token-account creation instruction.
///
/// The ATA program reads everything it needs from the account list, so the
/// data stays empty.
pub fn create_associated_token_account(
    payer: &[u8; 32],
    associated_account: &[u8; 32],
    owner: &[u8; 32],
    mint: &[u8; 32],
) -> Instruction {
    Instruction {
        program_id: ASSOCIATED_TOKEN_PROGRAM_ID,
        accounts: vec![
            AccountMeta::writable(*payer, true),
            AccountMeta::writable(*associated_account, false),
            AccountMeta::readonly(*owner, false),
            AccountMeta::readonly(*mint, false),
            AccountMeta::readonly(SYSTEM_PROGRAM_ID, false),
            AccountMeta::readonly(TOKEN_PROGRAM_ID, false),
            AccountMeta::readonly(RENT_SYSVAR_ID, false),
        ],
        data: vec![],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address::bytes_to_address;

    #[test]
    fn program_id_constants_decode_to_known_addresses() {
        assert_eq!(
            bytes_to_address(&TOKEN_PROGRAM_ID),
            "TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA"
        );
        assert_eq!(
            bytes_to_address(&ASSOCIATED_TOKEN_PROGRAM_ID),
            "ATokenGPvbdGVxr1b2hvZbsiqW5xWH25efTNsLJA8knL"
        );
        assert_eq!(
            bytes_to_address(&RENT_SYSVAR_ID),
            "SysvarRent111111111111111111111111111111111"
        );
    }

    #[test]
    fn system_transfer_layout() {
        let ix = system_transfer(&[1u8; 32], &[2u8; 32], 1_000_000).unwrap();
        assert_eq!(ix.program_id, SYSTEM_PROGRAM_ID);
        assert_eq!(ix.data.len(), 12);
        assert_eq!(&ix.data[..4], &[2, 0, 0, 0]);
        assert_eq!(&ix.data[4..], &1_000_000u64.to_le_bytes());
    }

    #[test]
    fn system_transfer_account_roles() {
        let ix = system_transfer(&[0xAAu8; 32], &[0xBBu8; 32], 500).unwrap();
        assert_eq!(ix.accounts.len(), 2);
        assert!(ix.accounts[0].is_signer && ix.accounts[0].is_writable);
        assert!(!ix.accounts[1].is_signer && ix.accounts[1].is_writable);
    }

    #[test]
    fn system_transfer_rejects_zero_lamports() {
        assert!(system_transfer(&[1u8; 32], &[2u8; 32], 0).is_err());
    }

    #[test]
    fn token_transfer_layout() {
        let ix = token_transfer(&[1u8; 32], &[2u8; 32], &[3u8; 32], 250_000, 6).unwrap();
        assert_eq!(ix.program_id, TOKEN_PROGRAM_ID);
        assert_eq!(ix.data.len(), 9);
        assert_eq!(ix.data[0], 3);
        assert_eq!(u64::from_le_bytes(ix.data[1..9].try_into().unwrap()), 250_000);
    }

    #[test]
    fn token_transfer_account_roles() {
        let ix = token_transfer(&[1u8; 32], &[2u8; 32], &[3u8; 32], 10, 0).unwrap();
        assert_eq!(ix.accounts.len(), 3);
        // source and destination writable, authority signs.
        assert!(ix.accounts[0].is_writable && !ix.accounts[0].is_signer);
        assert!(ix.accounts[1].is_writable && !ix.accounts[1].is_signer);
        assert!(ix.accounts[2].is_signer && !ix.accounts[2].is_writable);
    }

    #[test]
    fn token_transfer_rejects_zero_amount() {
        assert!(token_transfer(&[1u8; 32], &[2u8; 32], &[3u8; 32], 0, 6).is_err());
    }

    #[test]
    fn ata_creation_has_empty_data_and_seven_accounts() {
        let ix = create_associated_token_account(
            &[0x01u8; 32],
            &[0x02u8; 32],
            &[0x03u8; 32],
            &[0x04u8; 32],
        );
        assert_eq!(ix.program_id, ASSOCIATED_TOKEN_PROGRAM_ID);
        assert!(ix.data.is_empty());
        assert_eq!(ix.accounts.len(), 7);

        // payer signs and funds, the new account is written.
        assert!(ix.accounts[0].is_signer && ix.accounts[0].is_writable);
        assert!(!ix.accounts[1].is_signer && ix.accounts[1].is_writable);
        // everything else is read-only.
        for meta in &ix.accounts[2..] {
            assert!(!meta.is_signer && !meta.is_writable);
        }
        assert_eq!(ix.accounts[4].pubkey, SYSTEM_PROGRAM_ID);
        assert_eq!(ix.accounts[5].pubkey, TOKEN_PROGRAM_ID);
        assert_eq!(ix.accounts[6].pubkey, RENT_SYSVAR_ID);
    }
}
