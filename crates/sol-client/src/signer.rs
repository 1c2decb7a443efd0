//! Transaction signers: an in-process key and a hardware-backed delegate.
//!
//! Both variants are stateless between calls. The hardware path carries a
//! fresh oneshot response channel inside every request, so concurrent signing
//! requests never share a result slot.

use std::sync::Arc;

use async_trait::async_trait;
use log::debug;
use tokio::sync::{mpsc, oneshot};
use zeroize::Zeroizing;

use crate::error::ClientError;

/// Signs serialized message bytes. Implementations never persist the message
/// and never expose key material.
#[async_trait]
pub trait TransactionSigner: Send + Sync {
    fn public_key(&self) -> [u8; 32];

    async fn sign(&self, message: &[u8]) -> Result<[u8; 64], ClientError>;
}

// ---------------------------------------------------------------------------
// Local signer
// ---------------------------------------------------------------------------

/// Holds raw key material in memory (zeroized on drop) and signs
/// synchronously. Never blocks on I/O.
pub struct LocalSigner {
    key_material: Zeroizing<Vec<u8>>,
    public_key: [u8; 32],
}

impl LocalSigner {
    /// Validates the key length (32 or 64 bytes) up front.
    pub fn new(key_material: Vec<u8>) -> Result<Self, ClientError> {
        let public_key = sol_core::derive_public_key(&key_material)?;
        Ok(Self {
            key_material: Zeroizing::new(key_material),
            public_key,
        })
    }
}

#[async_trait]
impl TransactionSigner for LocalSigner {
    fn public_key(&self) -> [u8; 32] {
        self.public_key
    }

    async fn sign(&self, message: &[u8]) -> Result<[u8; 64], ClientError> {
        Ok(sol_core::sign(message, &self.key_material)?)
    }
}

// ---------------------------------------------------------------------------
// Hardware signer
// ---------------------------------------------------------------------------

/// The approval UI's answer to one signing request.
#[derive(Debug)]
pub enum ApprovalOutcome {
    Approved([u8; 64]),
    /// The user dismissed the approval prompt.
    Dismissed,
}

/// One signing request handed to the secure-element channel. The responder
/// is per-request: there is no shared pending-result state.
#[derive(Debug)]
pub struct ApprovalRequest {
    pub unsigned_message: Vec<u8>,
    pub derivation_path: String,
    pub respond_to: oneshot::Sender<ApprovalOutcome>,
}

/// Routes signing through an external secure element. Each `sign` call
/// suspends until the human-in-the-loop approves, dismisses, or the channel
/// dies.
pub struct HardwareSigner {
    requests: mpsc::Sender<ApprovalRequest>,
    public_key: [u8; 32],
    derivation_path: String,
}

impl HardwareSigner {
    pub fn new(
        requests: mpsc::Sender<ApprovalRequest>,
        public_key: [u8; 32],
        derivation_path: impl Into<String>,
    ) -> Self {
        Self {
            requests,
            public_key,
            derivation_path: derivation_path.into(),
        }
    }
}

#[async_trait]
impl TransactionSigner for HardwareSigner {
    fn public_key(&self) -> [u8; 32] {
        self.public_key
    }

    async fn sign(&self, message: &[u8]) -> Result<[u8; 64], ClientError> {
        let (respond_to, response) = oneshot::channel();
        debug!(
            "requesting hardware approval for {} message bytes at {}",
            message.len(),
            self.derivation_path
        );
        self.requests
            .send(ApprovalRequest {
                unsigned_message: message.to_vec(),
                derivation_path: self.derivation_path.clone(),
                respond_to,
            })
            .await
            .map_err(|_| ClientError::Signing("secure element channel closed".into()))?;

        match response.await {
            Ok(ApprovalOutcome::Approved(signature)) => Ok(signature),
            Ok(ApprovalOutcome::Dismissed) => Err(ClientError::Cancelled),
            Err(_) => Err(ClientError::Signing(
                "secure element dropped the request".into(),
            )),
        }
    }
}

// ---------------------------------------------------------------------------
// Selection
// ---------------------------------------------------------------------------

/// Connection details for a hardware-backed wallet key.
pub struct HardwareKey {
    pub channel: mpsc::Sender<ApprovalRequest>,
    pub public_key: [u8; 32],
    pub derivation_path: String,
}

/// Pick the signer for a wallet key. Empty key material is the sentinel for
/// hardware-backed storage; anything else must be a valid 32/64-byte key.
pub fn select_signer(
    key_material: Vec<u8>,
    hardware: Option<HardwareKey>,
) -> Result<Arc<dyn TransactionSigner>, ClientError> {
    if key_material.is_empty() {
        let hw = hardware.ok_or_else(|| {
            ClientError::Signing("hardware-backed key but no secure element channel".into())
        })?;
        return Ok(Arc::new(HardwareSigner::new(
            hw.channel,
            hw.public_key,
            hw.derivation_path,
        )));
    }
    Ok(Arc::new(LocalSigner::new(key_material)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn local_signer_signs_verifiably() {
        let signer = LocalSigner::new(vec![0x01u8; 32]).unwrap();
        let msg = b"transfer approval";
        let sig = signer.sign(msg).await.unwrap();
        assert!(sol_core::verify(msg, &sig, &signer.public_key()));
    }

    #[tokio::test]
    async fn local_signer_rejects_bad_key_length() {
        assert!(matches!(
            LocalSigner::new(vec![0u8; 33]),
            Err(ClientError::Core(_))
        ));
    }

    #[tokio::test]
    async fn hardware_signer_returns_approved_signature() {
        let (tx, mut rx) = mpsc::channel::<ApprovalRequest>(1);
        let signer = HardwareSigner::new(tx, [0xA1u8; 32], "m/44'/501'/0'/0'");

        // Stand-in for the secure element: sign with a known key.
        tokio::spawn(async move {
            let request = rx.recv().await.unwrap();
            assert_eq!(request.derivation_path, "m/44'/501'/0'/0'");
            let sig = sol_core::sign(&request.unsigned_message, &[0x01u8; 32]).unwrap();
            request.respond_to.send(ApprovalOutcome::Approved(sig)).ok();
        });

        let sig = signer.sign(b"hardware test").await.unwrap();
        let pubkey = sol_core::derive_public_key(&[0x01u8; 32]).unwrap();
        assert!(sol_core::verify(b"hardware test", &sig, &pubkey));
    }

    #[tokio::test]
    async fn dismissal_surfaces_as_cancelled() {
        let (tx, mut rx) = mpsc::channel::<ApprovalRequest>(1);
        let signer = HardwareSigner::new(tx, [0xA1u8; 32], "m/44'/501'/0'/0'");

        tokio::spawn(async move {
            let request = rx.recv().await.unwrap();
            request.respond_to.send(ApprovalOutcome::Dismissed).ok();
        });

        assert!(matches!(
            signer.sign(b"payload").await,
            Err(ClientError::Cancelled)
        ));
    }

    #[tokio::test]
    async fn dead_channel_is_a_signing_error_not_cancellation() {
        let (tx, rx) = mpsc::channel::<ApprovalRequest>(1);
        drop(rx);
        let signer = HardwareSigner::new(tx, [0xA1u8; 32], "m/44'/501'/0'/0'");

        assert!(matches!(
            signer.sign(b"payload").await,
            Err(ClientError::Signing(_))
        ));
    }

    #[tokio::test]
    async fn concurrent_requests_get_independent_responses() {
        let (tx, mut rx) = mpsc::channel::<ApprovalRequest>(4);
        let signer = Arc::new(HardwareSigner::new(tx, [0xA1u8; 32], "m/44'/501'/0'/0'"));

        tokio::spawn(async move {
            while let Some(request) = rx.recv().await {
                // Echo a signature derived from the payload so each caller
                // can check it got its own answer.
                let sig = sol_core::sign(&request.unsigned_message, &[0x01u8; 32]).unwrap();
                request.respond_to.send(ApprovalOutcome::Approved(sig)).ok();
            }
        });

        let a = tokio::spawn({
            let signer = Arc::clone(&signer);
            async move { signer.sign(b"first").await.unwrap() }
        });
        let b = tokio::spawn({
            let signer = Arc::clone(&signer);
            async move { signer.sign(b"second").await.unwrap() }
        });

        let (sig_a, sig_b) = (a.await.unwrap(), b.await.unwrap());
        let pubkey = sol_core::derive_public_key(&[0x01u8; 32]).unwrap();
        assert!(sol_core::verify(b"first", &sig_a, &pubkey));
        assert!(sol_core::verify(b"second", &sig_b, &pubkey));
    }

    #[tokio::test]
    async fn selection_uses_the_empty_sentinel() {
        // Non-empty: local.
        let local = select_signer(vec![0x01u8; 32], None).unwrap();
        assert_eq!(
            local.public_key(),
            sol_core::derive_public_key(&[0x01u8; 32]).unwrap()
        );

        // Empty with a channel: hardware.
        let (tx, _rx) = mpsc::channel(1);
        let hw = select_signer(
            vec![],
            Some(HardwareKey {
                channel: tx,
                public_key: [0xB2u8; 32],
                derivation_path: "m/44'/501'/0'/0'".into(),
            }),
        )
        .unwrap();
        assert_eq!(hw.public_key(), [0xB2u8; 32]);

        // Empty without a channel: error.
        assert!(select_signer(vec![], None).is_err());
    }
}
