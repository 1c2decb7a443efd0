//! Confirmation tracking: poll a signature until it reaches a target
//! commitment level or the deadline passes.
//!
//! Status lifecycle is monotone: `Unknown → Processed → Confirmed →
//! Finalized`. A poll that reports a lower level than one already observed
//! never regresses the recorded state.

use std::time::Duration;

use log::{debug, info};
use serde::Deserialize;
use tokio::time::Instant;

use crate::error::ClientError;
use crate::rpc::RpcApi;

/// Commitment level of a submitted transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ConfirmationStatus {
    Unknown,
    Processed,
    Confirmed,
    Finalized,
}

impl ConfirmationStatus {
    /// Parse the `confirmationStatus` string from `getSignatureStatuses`.
    pub fn from_rpc(value: &str) -> Self {
        match value {
            "processed" => Self::Processed,
            "confirmed" => Self::Confirmed,
            "finalized" => Self::Finalized,
            _ => Self::Unknown,
        }
    }

    /// Whether this observed status satisfies `target`.
    ///
    /// `Processed` as a target accepts any non-Unknown observation;
    /// `Confirmed` accepts Confirmed or Finalized; `Finalized` accepts only
    /// itself.
    pub fn satisfies(self, target: ConfirmationStatus) -> bool {
        self != Self::Unknown && self >= target
    }
}

/// Poll-loop parameters.
#[derive(Debug, Clone, Deserialize)]
pub struct ConfirmationConfig {
    pub max_wait_ms: u64,
    pub poll_interval_ms: u64,
}

impl Default for ConfirmationConfig {
    fn default() -> Self {
        Self {
            max_wait_ms: 30_000,
            poll_interval_ms: 1_000,
        }
    }
}

/// Block (cooperatively) until `signature` reaches `target`.
///
/// A ledger-reported transaction error ends the loop immediately with
/// [`ClientError::TransactionRejected`] — that failure class is final and
/// must never be treated as a transient RPC problem. Running past the
/// deadline is [`ClientError::ConfirmationTimeout`].
pub async fn wait_for_confirmation<R: RpcApi + ?Sized>(
    rpc: &R,
    signature: &str,
    target: ConfirmationStatus,
    config: &ConfirmationConfig,
) -> Result<ConfirmationStatus, ClientError> {
    let started = Instant::now();
    let deadline = started + Duration::from_millis(config.max_wait_ms);
    let mut observed = ConfirmationStatus::Unknown;

    loop {
        if let Some(status) = rpc.get_signature_status(signature).await? {
            if let Some(err) = status.err {
                return Err(ClientError::TransactionRejected(err));
            }
            // Monotone: never step back below what we have already seen.
            observed = observed.max(status.status);
            debug!("{signature}: observed {observed:?} at slot {}", status.slot);
            if observed.satisfies(target) {
                info!(
                    "{signature}: reached {observed:?} after {:?}",
                    started.elapsed()
                );
                return Ok(observed);
            }
        }

        if Instant::now() + Duration::from_millis(config.poll_interval_ms) > deadline {
            return Err(ClientError::ConfirmationTimeout {
                signature: signature.to_string(),
                waited_ms: started.elapsed().as_millis() as u64,
            });
        }
        tokio::time::sleep(Duration::from_millis(config.poll_interval_ms)).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rpc::{AccountInfo, LatestBlockhash, SendConfig, SignatureStatus};
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Replays a scripted sequence of `getSignatureStatuses` answers.
    struct ScriptedRpc {
        statuses: Mutex<VecDeque<Option<SignatureStatus>>>,
    }

    impl ScriptedRpc {
        fn new(script: Vec<Option<SignatureStatus>>) -> Self {
            Self {
                statuses: Mutex::new(script.into()),
            }
        }
    }

    fn at(status: ConfirmationStatus) -> Option<SignatureStatus> {
        Some(SignatureStatus {
            slot: 7,
            confirmations: Some(1),
            status,
            err: None,
        })
    }

    #[async_trait]
    impl RpcApi for ScriptedRpc {
        async fn get_latest_blockhash(&self) -> Result<LatestBlockhash, ClientError> {
            unimplemented!("not used by confirmation tests")
        }

        async fn send_transaction(
            &self,
            _wire: &[u8],
            _config: &SendConfig,
        ) -> Result<String, ClientError> {
            unimplemented!("not used by confirmation tests")
        }

        async fn get_signature_status(
            &self,
            _signature: &str,
        ) -> Result<Option<SignatureStatus>, ClientError> {
            let mut script = self.statuses.lock().unwrap();
            Ok(script.pop_front().unwrap_or(None))
        }

        async fn get_account_info(
            &self,
            _address: &str,
        ) -> Result<Option<AccountInfo>, ClientError> {
            unimplemented!("not used by confirmation tests")
        }
    }

    fn fast_config() -> ConfirmationConfig {
        ConfirmationConfig {
            max_wait_ms: 200,
            poll_interval_ms: 1,
        }
    }

    #[test]
    fn satisfies_matrix() {
        use ConfirmationStatus::*;
        assert!(Processed.satisfies(Processed));
        assert!(Confirmed.satisfies(Processed));
        assert!(Confirmed.satisfies(Confirmed));
        assert!(Finalized.satisfies(Confirmed));
        assert!(Finalized.satisfies(Finalized));

        assert!(!Unknown.satisfies(Processed));
        assert!(!Processed.satisfies(Confirmed));
        assert!(!Confirmed.satisfies(Finalized));
    }

    #[test]
    fn from_rpc_strings() {
        assert_eq!(
            ConfirmationStatus::from_rpc("processed"),
            ConfirmationStatus::Processed
        );
        assert_eq!(
            ConfirmationStatus::from_rpc("finalized"),
            ConfirmationStatus::Finalized
        );
        assert_eq!(
            ConfirmationStatus::from_rpc("anything else"),
            ConfirmationStatus::Unknown
        );
    }

    #[tokio::test]
    async fn succeeds_only_when_target_is_reached() {
        // Unknown -> Processed -> Confirmed: the loop must keep polling past
        // Processed and stop exactly at Confirmed.
        let rpc = ScriptedRpc::new(vec![
            None,
            at(ConfirmationStatus::Processed),
            at(ConfirmationStatus::Confirmed),
        ]);
        let status =
            wait_for_confirmation(&rpc, "sig", ConfirmationStatus::Confirmed, &fast_config())
                .await
                .unwrap();
        assert_eq!(status, ConfirmationStatus::Confirmed);
        assert!(rpc.statuses.lock().unwrap().is_empty(), "polled too few times");
    }

    #[tokio::test]
    async fn finalized_observation_satisfies_confirmed_target() {
        let rpc = ScriptedRpc::new(vec![at(ConfirmationStatus::Finalized)]);
        let status =
            wait_for_confirmation(&rpc, "sig", ConfirmationStatus::Confirmed, &fast_config())
                .await
                .unwrap();
        assert_eq!(status, ConfirmationStatus::Finalized);
    }

    #[tokio::test]
    async fn ledger_error_ends_the_loop_immediately() {
        let rpc = ScriptedRpc::new(vec![
            Some(SignatureStatus {
                slot: 3,
                confirmations: None,
                status: ConfirmationStatus::Processed,
                err: Some("{\"InstructionError\":[0,\"Custom\"]}".into()),
            }),
            at(ConfirmationStatus::Finalized),
        ]);
        let err = wait_for_confirmation(&rpc, "sig", ConfirmationStatus::Confirmed, &fast_config())
            .await
            .unwrap_err();
        match err {
            ClientError::TransactionRejected(detail) => {
                assert!(detail.contains("InstructionError"))
            }
            other => panic!("expected TransactionRejected, got {other:?}"),
        }
        // The second scripted answer was never consumed.
        assert_eq!(rpc.statuses.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn times_out_when_target_never_arrives() {
        let rpc = ScriptedRpc::new(vec![]);
        let err = wait_for_confirmation(&rpc, "sig", ConfirmationStatus::Finalized, &fast_config())
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::ConfirmationTimeout { .. }));
    }
}
