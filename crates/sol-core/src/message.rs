//! Transaction message compilation and wire serialization.
//!
//! Wire layout (legacy message format):
//!
//! ```text
//! Transaction:
//!   num_signatures          compact-u16
//!   signatures              64 bytes * num_signatures
//!   message:
//!     num_required_sigs     u8
//!     num_readonly_signed   u8
//!     num_readonly_unsigned u8
//!     num_accounts          compact-u16
//!     account_keys          32 bytes * num_accounts
//!     recent_blockhash      32 bytes
//!     num_instructions      compact-u16
//!     instructions[]        (see below)
//!
//! Instruction:
//!   program_id_index        u8
//!   num_accounts            compact-u16
//!   account_indices         u8 * num_accounts
//!   data_len                compact-u16
//!   data                    u8 * data_len
//! ```
//!
//! Account-key ordering is first-reference order: the fee payer occupies
//! index 0, then every account of every instruction in encounter order, then
//! each instruction's program id. Callers rely on these indices being stable
//! for a fixed instruction list.

use crate::error::CoreError;

/// A single account reference inside an instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountMeta {
    pub pubkey: [u8; 32],
    pub is_signer: bool,
    pub is_writable: bool,
}

impl AccountMeta {
    pub fn writable(pubkey: [u8; 32], is_signer: bool) -> Self {
        Self {
            pubkey,
            is_signer,
            is_writable: true,
        }
    }

    pub fn readonly(pubkey: [u8; 32], is_signer: bool) -> Self {
        Self {
            pubkey,
            is_signer,
            is_writable: false,
        }
    }
}

/// An instruction before compilation: program id, ordered account metas, and
/// opaque data. Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instruction {
    pub program_id: [u8; 32],
    pub accounts: Vec<AccountMeta>,
    pub data: Vec<u8>,
}

/// The three-byte message header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageHeader {
    pub num_required_signatures: u8,
    pub num_readonly_signed: u8,
    pub num_readonly_unsigned: u8,
}

/// An instruction with account references replaced by indices into the
/// message's key list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledInstruction {
    pub program_id_index: u8,
    pub account_indices: Vec<u8>,
    pub data: Vec<u8>,
}

/// A compiled, signable message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledMessage {
    pub header: MessageHeader,
    pub account_keys: Vec<[u8; 32]>,
    pub recent_blockhash: [u8; 32],
    pub instructions: Vec<CompiledInstruction>,
}

// ---------------------------------------------------------------------------
// Compact-u16 encoding
// ---------------------------------------------------------------------------

/// Encode a length in the compact-u16 varint format.
///
/// - 0..=0x7f      -> 1 byte
/// - 0x80..=0x3fff -> 2 bytes (continuation bit 0x80 on the first)
/// - above         -> 3 bytes
pub fn encode_compact_u16(value: u16) -> Vec<u8> {
    let mut val = value as u32;
    let mut out = Vec::with_capacity(3);
    loop {
        let mut byte = (val & 0x7f) as u8;
        val >>= 7;
        if val > 0 {
            byte |= 0x80;
        }
        out.push(byte);
        if val == 0 {
            break;
        }
    }
    out
}

/// Decode a compact-u16, returning `(value, bytes_consumed)`.
pub fn decode_compact_u16(data: &[u8]) -> Result<(u16, usize), CoreError> {
    let mut value: u32 = 0;
    let mut consumed = 0usize;
    loop {
        let byte = *data.get(consumed).ok_or_else(|| {
            CoreError::Serialization("unexpected end of data in compact-u16".into())
        })?;
        value |= ((byte & 0x7f) as u32) << (7 * consumed as u32);
        consumed += 1;
        if byte & 0x80 == 0 {
            break;
        }
        if consumed >= 3 {
            break;
        }
    }
    if value > u16::MAX as u32 {
        return Err(CoreError::Serialization("compact-u16 overflow".into()));
    }
    Ok((value as u16, consumed))
}

// ---------------------------------------------------------------------------
// Compilation
// ---------------------------------------------------------------------------

/// Compile instructions into a signable message.
///
/// The fee payer is forced signer + writable and always sits at index 0.
/// Repeat references to an account OR-merge their signer/writable flags; the
/// key list keeps first-reference order. The read-only header counts are
/// computed from the merged flags.
pub fn compile(
    instructions: &[Instruction],
    fee_payer: &[u8; 32],
    recent_blockhash: &[u8; 32],
) -> Result<CompiledMessage, CoreError> {
    struct Entry {
        pubkey: [u8; 32],
        is_signer: bool,
        is_writable: bool,
    }

    // Instruction account lists are tiny, so a Vec scan beats a map here.
    let mut entries: Vec<Entry> = Vec::new();
    let mut upsert = |pubkey: [u8; 32], signer: bool, writable: bool| {
        if let Some(entry) = entries.iter_mut().find(|e| e.pubkey == pubkey) {
            entry.is_signer |= signer;
            entry.is_writable |= writable;
        } else {
            entries.push(Entry {
                pubkey,
                is_signer: signer,
                is_writable: writable,
            });
        }
    };

    upsert(*fee_payer, true, true);
    for ix in instructions {
        for meta in &ix.accounts {
            upsert(meta.pubkey, meta.is_signer, meta.is_writable);
        }
        // Program ids are read-only non-signers.
        upsert(ix.program_id, false, false);
    }

    if entries.len() > u8::MAX as usize + 1 {
        return Err(CoreError::MessageBuild(format!(
            "too many distinct accounts: {}",
            entries.len()
        )));
    }

    let header = MessageHeader {
        num_required_signatures: entries.iter().filter(|e| e.is_signer).count() as u8,
        num_readonly_signed: entries
            .iter()
            .filter(|e| e.is_signer && !e.is_writable)
            .count() as u8,
        num_readonly_unsigned: entries
            .iter()
            .filter(|e| !e.is_signer && !e.is_writable)
            .count() as u8,
    };
    let account_keys: Vec<[u8; 32]> = entries.iter().map(|e| e.pubkey).collect();

    let index_of = |pubkey: &[u8; 32]| -> Result<u8, CoreError> {
        account_keys
            .iter()
            .position(|k| k == pubkey)
            .map(|i| i as u8)
            .ok_or_else(|| CoreError::MessageBuild("account missing from key list".into()))
    };

    let mut compiled = Vec::with_capacity(instructions.len());
    for ix in instructions {
        let account_indices = ix
            .accounts
            .iter()
            .map(|meta| index_of(&meta.pubkey))
            .collect::<Result<Vec<u8>, _>>()?;
        compiled.push(CompiledInstruction {
            program_id_index: index_of(&ix.program_id)?,
            account_indices,
            data: ix.data.clone(),
        });
    }

    Ok(CompiledMessage {
        header,
        account_keys,
        recent_blockhash: *recent_blockhash,
        instructions: compiled,
    })
}

/// Serialize a compiled message into the bytes that get signed.
pub fn serialize(message: &CompiledMessage) -> Vec<u8> {
    let mut buf = Vec::with_capacity(256);

    buf.push(message.header.num_required_signatures);
    buf.push(message.header.num_readonly_signed);
    buf.push(message.header.num_readonly_unsigned);

    buf.extend_from_slice(&encode_compact_u16(message.account_keys.len() as u16));
    for key in &message.account_keys {
        buf.extend_from_slice(key);
    }

    buf.extend_from_slice(&message.recent_blockhash);

    buf.extend_from_slice(&encode_compact_u16(message.instructions.len() as u16));
    for ix in &message.instructions {
        buf.push(ix.program_id_index);
        buf.extend_from_slice(&encode_compact_u16(ix.account_indices.len() as u16));
        buf.extend_from_slice(&ix.account_indices);
        buf.extend_from_slice(&encode_compact_u16(ix.data.len() as u16));
        buf.extend_from_slice(&ix.data);
    }

    buf
}

/// Assemble the full wire transaction: compact signature count, the 64-byte
/// signatures in order, then the message bytes.
pub fn assemble_transaction(message: &[u8], signatures: &[[u8; 64]]) -> Vec<u8> {
    let mut wire = Vec::with_capacity(1 + signatures.len() * 64 + message.len());
    wire.extend_from_slice(&encode_compact_u16(signatures.len() as u16));
    for sig in signatures {
        wire.extend_from_slice(sig);
    }
    wire.extend_from_slice(message);
    wire
}
