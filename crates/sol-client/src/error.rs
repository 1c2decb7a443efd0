use thiserror::Error;

/// Errors from the RPC, signing, and orchestration layer.
#[derive(Debug, Error)]
pub enum ClientError {
    /// An RPC-level error object ({code, message}) returned by the node.
    #[error("rpc error {code}: {message}")]
    Rpc { code: i64, message: String },

    /// HTTP transport failure.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The node answered, but not in the shape we expect.
    #[error("invalid rpc response: {0}")]
    InvalidResponse(String),

    /// Confirmation polling ran out of time.
    #[error("confirmation timeout for {signature} after {waited_ms}ms")]
    ConfirmationTimeout { signature: String, waited_ms: u64 },

    /// The ledger executed the transaction and reported an error. Fatal:
    /// never retried as if it were a transient RPC failure.
    #[error("transaction rejected by ledger: {0}")]
    TransactionRejected(String),

    /// The user dismissed a hardware-signer approval. A normal outcome,
    /// distinct from a signing fault.
    #[error("signing cancelled by user")]
    Cancelled,

    /// Signer-side failure (bad key material, dead hardware channel).
    #[error("signing failed: {0}")]
    Signing(String),

    #[error(transparent)]
    Core(#[from] sol_core::CoreError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rpc_error_display_includes_code() {
        let err = ClientError::Rpc {
            code: -32002,
            message: "Blockhash not found".into(),
        };
        assert_eq!(err.to_string(), "rpc error -32002: Blockhash not found");
    }

    #[test]
    fn core_errors_convert_transparently() {
        let err: ClientError = sol_core::CoreError::NoViableAddress.into();
        assert!(err.to_string().contains("no viable program address"));
    }

    #[test]
    fn timeout_display_carries_signature() {
        let err = ClientError::ConfirmationTimeout {
            signature: "5VERYfake".into(),
            waited_ms: 30_000,
        };
        assert!(err.to_string().contains("5VERYfake"));
        assert!(err.to_string().contains("30000ms"));
    }
}
