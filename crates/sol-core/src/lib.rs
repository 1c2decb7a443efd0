//! Solana transaction primitives, implemented by hand.
//!
//! No `solana-sdk`: the compact wire format, key derivation, PDA search, and
//! instruction layouts live here directly, built on `ed25519-dalek`,
//! `curve25519-dalek`, `sha2`, and `bs58`. Everything in this crate is pure
//! and synchronous; the async RPC and orchestration layer lives in
//! `sol-client`.

pub mod address;
pub mod error;
pub mod instruction;
pub mod keys;
pub mod message;
pub mod pda;

pub use address::{address_to_bytes, bytes_to_address, validate_address};
pub use error::CoreError;
pub use instruction::{
    create_associated_token_account, system_transfer, token_transfer,
    ASSOCIATED_TOKEN_PROGRAM_ID, RENT_SYSVAR_ID, SYSTEM_PROGRAM_ID, TOKEN_PROGRAM_ID,
};
pub use keys::{derive_public_key, is_on_curve, sign, verify};
pub use message::{
    assemble_transaction, compile, decode_compact_u16, encode_compact_u16, serialize,
    AccountMeta, CompiledInstruction, CompiledMessage, Instruction, MessageHeader,
};
pub use pda::{derive_associated_token_address, find_program_address, PdaResult};
