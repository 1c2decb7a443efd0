//! JSON-RPC 2.0 client for the ledger's HTTP endpoint.
//!
//! The engine consumes exactly four methods: `getLatestBlockhash`,
//! `sendTransaction`, `getSignatureStatuses`, and `getAccountInfo`. They are
//! abstracted behind [`RpcApi`] so the retry/confirmation/orchestration code
//! can run against a scripted mock in tests.

use std::time::Duration;

use async_trait::async_trait;
use base64::Engine as _;
use log::debug;
use serde_json::{json, Value};

use crate::confirm::ConfirmationStatus;
use crate::error::ClientError;

/// A recent blockhash and the last block height it is valid for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LatestBlockhash {
    pub blockhash: [u8; 32],
    pub last_valid_block_height: u64,
}

/// Per-signature status as reported by `getSignatureStatuses`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureStatus {
    pub slot: u64,
    pub confirmations: Option<u64>,
    pub status: ConfirmationStatus,
    /// Stringified ledger error, if the transaction failed on-chain.
    pub err: Option<String>,
}

/// Minimal account view used to decide whether an account exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountInfo {
    pub lamports: u64,
    pub owner: String,
}

/// Options forwarded to `sendTransaction`.
#[derive(Debug, Clone, Copy)]
pub struct SendConfig {
    pub skip_preflight: bool,
    pub max_retries: u64,
}

impl Default for SendConfig {
    fn default() -> Self {
        Self {
            skip_preflight: false,
            max_retries: 0,
        }
    }
}

/// The RPC surface this engine consumes. Implementations must be safe for
/// concurrent use; every call is stateless request/response.
#[async_trait]
pub trait RpcApi: Send + Sync {
    async fn get_latest_blockhash(&self) -> Result<LatestBlockhash, ClientError>;

    /// Submit a fully signed wire transaction; returns its signature.
    async fn send_transaction(
        &self,
        wire: &[u8],
        config: &SendConfig,
    ) -> Result<String, ClientError>;

    /// `None` when the ledger has not seen the signature yet.
    async fn get_signature_status(
        &self,
        signature: &str,
    ) -> Result<Option<SignatureStatus>, ClientError>;

    /// `None` when the account does not exist.
    async fn get_account_info(&self, address: &str) -> Result<Option<AccountInfo>, ClientError>;
}

/// Human-readable names for the fixed JSON-RPC error codes. Diagnostics
/// only — retry classification works on the error message, never the code.
pub fn rpc_error_name(code: i64) -> &'static str {
    match code {
        -32700 => "parse error",
        -32600 => "invalid request",
        -32601 => "method not found",
        -32602 => "invalid params",
        -32603 => "internal error",
        -32002 => "transaction simulation failed",
        -32003 => "transaction signature verification failure",
        -32004 => "block not available",
        -32005 => "node is behind",
        -32010..=-32000 => "server error",
        _ => "unknown error",
    }
}

// ---------------------------------------------------------------------------
// HTTP implementation
// ---------------------------------------------------------------------------

/// `reqwest`-backed [`RpcApi`] implementation.
pub struct HttpRpcClient {
    endpoint: String,
    http: reqwest::Client,
}

impl HttpRpcClient {
    pub fn new(endpoint: impl Into<String>) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self {
            endpoint: endpoint.into(),
            http,
        })
    }

    async fn raw_request(&self, method: &str, params: Value) -> Result<Value, ClientError> {
        debug!("rpc request: {method}");
        let body = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": method,
            "params": params,
        });

        let response: Value = self
            .http
            .post(&self.endpoint)
            .json(&body)
            .send()
            .await?
            .json()
            .await?;

        if let Some(error) = response.get("error") {
            let code = error.get("code").and_then(Value::as_i64).unwrap_or(0);
            let message = error
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("no message")
                .to_string();
            debug!("rpc error on {method}: {code} ({}) {message}", rpc_error_name(code));
            return Err(ClientError::Rpc { code, message });
        }

        response
            .get("result")
            .cloned()
            .ok_or_else(|| ClientError::InvalidResponse(format!("{method}: missing result")))
    }
}

#[async_trait]
impl RpcApi for HttpRpcClient {
    async fn get_latest_blockhash(&self) -> Result<LatestBlockhash, ClientError> {
        let result = self
            .raw_request(
                "getLatestBlockhash",
                json!([{ "commitment": "confirmed" }]),
            )
            .await?;
        parse_latest_blockhash(&result)
    }

    async fn send_transaction(
        &self,
        wire: &[u8],
        config: &SendConfig,
    ) -> Result<String, ClientError> {
        let encoded = base64::engine::general_purpose::STANDARD.encode(wire);
        let result = self
            .raw_request(
                "sendTransaction",
                json!([encoded, {
                    "encoding": "base64",
                    "skipPreflight": config.skip_preflight,
                    "maxRetries": config.max_retries,
                }]),
            )
            .await?;
        result
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| ClientError::InvalidResponse("sendTransaction: non-string result".into()))
    }

    async fn get_signature_status(
        &self,
        signature: &str,
    ) -> Result<Option<SignatureStatus>, ClientError> {
        let result = self
            .raw_request(
                "getSignatureStatuses",
                json!([[signature], { "searchTransactionHistory": true }]),
            )
            .await?;
        let entry = result
            .get("value")
            .and_then(|v| v.get(0))
            .ok_or_else(|| ClientError::InvalidResponse("getSignatureStatuses: missing value".into()))?;
        parse_signature_status(entry)
    }

    async fn get_account_info(&self, address: &str) -> Result<Option<AccountInfo>, ClientError> {
        let result = self
            .raw_request(
                "getAccountInfo",
                json!([address, { "encoding": "base64" }]),
            )
            .await?;
        let value = result
            .get("value")
            .ok_or_else(|| ClientError::InvalidResponse("getAccountInfo: missing value".into()))?;
        parse_account_info(value)
    }
}

// ---------------------------------------------------------------------------
// Response parsing
// ---------------------------------------------------------------------------

fn parse_latest_blockhash(result: &Value) -> Result<LatestBlockhash, ClientError> {
    let value = result
        .get("value")
        .ok_or_else(|| ClientError::InvalidResponse("getLatestBlockhash: missing value".into()))?;
    let blockhash_str = value
        .get("blockhash")
        .and_then(Value::as_str)
        .ok_or_else(|| ClientError::InvalidResponse("getLatestBlockhash: missing blockhash".into()))?;
    let blockhash = sol_core::address_to_bytes(blockhash_str)?;
    let last_valid_block_height = value
        .get("lastValidBlockHeight")
        .and_then(Value::as_u64)
        .ok_or_else(|| {
            ClientError::InvalidResponse("getLatestBlockhash: missing lastValidBlockHeight".into())
        })?;
    Ok(LatestBlockhash {
        blockhash,
        last_valid_block_height,
    })
}

fn parse_signature_status(entry: &Value) -> Result<Option<SignatureStatus>, ClientError> {
    if entry.is_null() {
        return Ok(None);
    }
    let slot = entry.get("slot").and_then(Value::as_u64).unwrap_or(0);
    let confirmations = entry.get("confirmations").and_then(Value::as_u64);
    let status = entry
        .get("confirmationStatus")
        .and_then(Value::as_str)
        .map(ConfirmationStatus::from_rpc)
        .unwrap_or(ConfirmationStatus::Unknown);
    let err = match entry.get("err") {
        None | Some(Value::Null) => None,
        Some(other) => Some(other.to_string()),
    };
    Ok(Some(SignatureStatus {
        slot,
        confirmations,
        status,
        err,
    }))
}

fn parse_account_info(value: &Value) -> Result<Option<AccountInfo>, ClientError> {
    if value.is_null() {
        return Ok(None);
    }
    let lamports = value
        .get("lamports")
        .and_then(Value::as_u64)
        .ok_or_else(|| ClientError::InvalidResponse("getAccountInfo: missing lamports".into()))?;
    let owner = value
        .get("owner")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    Ok(Some(AccountInfo { lamports, owner }))
}
