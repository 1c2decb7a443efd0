//! Async RPC and orchestration layer for the transaction engine.
//!
//! `sol-core` builds, serializes, and signs transaction bytes; this crate
//! moves them: a JSON-RPC client, a retry policy with bounded exponential
//! backoff, a confirmation tracker, local and hardware-backed signers, and
//! the [`TransferService`] that composes the full submit pipeline.

pub mod confirm;
pub mod error;
pub mod retry;
pub mod rpc;
pub mod service;
pub mod signer;

pub use confirm::{wait_for_confirmation, ConfirmationConfig, ConfirmationStatus};
pub use error::ClientError;
pub use retry::{classify, with_retry, Classification, RetryConfig};
pub use rpc::{
    rpc_error_name, AccountInfo, HttpRpcClient, LatestBlockhash, RpcApi, SendConfig,
    SignatureStatus,
};
pub use service::{TransferReceipt, TransferService};
pub use signer::{
    select_signer, ApprovalOutcome, ApprovalRequest, HardwareKey, HardwareSigner, LocalSigner,
    TransactionSigner,
};
