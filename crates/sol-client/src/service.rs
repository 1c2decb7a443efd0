//! Transfer orchestration: blockhash → instructions → compile → sign →
//! submit → confirm.
//!
//! Each operation is one strictly sequential pipeline. Concurrent transfers
//! share nothing but the RPC client; callers racing transfers from the same
//! key before confirmation are on their own.

use std::sync::Arc;

use log::{debug, info};

use sol_core::message::Instruction;

use crate::confirm::{wait_for_confirmation, ConfirmationConfig, ConfirmationStatus};
use crate::error::ClientError;
use crate::retry::{with_retry, RetryConfig};
use crate::rpc::{RpcApi, SendConfig};
use crate::signer::TransactionSigner;

/// Outcome of a completed transfer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferReceipt {
    /// Base58 transaction signature, usable as a tracking identifier.
    pub signature: String,
    pub status: ConfirmationStatus,
}

/// High-level transfer operations over a wallet key.
pub struct TransferService<R: RpcApi> {
    rpc: Arc<R>,
    signer: Arc<dyn TransactionSigner>,
    retry: RetryConfig,
    confirmation: ConfirmationConfig,
    target: ConfirmationStatus,
}

impl<R: RpcApi> TransferService<R> {
    pub fn new(rpc: Arc<R>, signer: Arc<dyn TransactionSigner>) -> Self {
        Self {
            rpc,
            signer,
            retry: RetryConfig::default(),
            confirmation: ConfirmationConfig::default(),
            target: ConfirmationStatus::Confirmed,
        }
    }

    pub fn with_retry_config(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_confirmation_config(mut self, confirmation: ConfirmationConfig) -> Self {
        self.confirmation = confirmation;
        self
    }

    pub fn with_confirmation_target(mut self, target: ConfirmationStatus) -> Self {
        self.target = target;
        self
    }

    /// Send `lamports` of native value to `recipient`.
    pub async fn transfer_sol(
        &self,
        recipient: [u8; 32],
        lamports: u64,
    ) -> Result<TransferReceipt, ClientError> {
        let payer = self.signer.public_key();
        info!(
            "native transfer of {lamports} lamports to {}",
            sol_core::bytes_to_address(&recipient)
        );

        let blockhash = self.fetch_blockhash().await?;
        let ix = sol_core::system_transfer(&payer, &recipient, lamports)?;
        self.execute(&[ix], blockhash).await
    }

    /// Send `amount` base units of `mint` to `recipient`'s associated token
    /// account, creating that account first when it does not exist yet.
    pub async fn transfer_token(
        &self,
        mint: [u8; 32],
        recipient: [u8; 32],
        amount: u64,
        decimals: u8,
    ) -> Result<TransferReceipt, ClientError> {
        let payer = self.signer.public_key();
        info!(
            "token transfer of {amount} (decimals {decimals}) of mint {} to {}",
            sol_core::bytes_to_address(&mint),
            sol_core::bytes_to_address(&recipient)
        );

        let blockhash = self.fetch_blockhash().await?;

        let source = sol_core::derive_associated_token_address(&payer, &mint)?;
        let destination = sol_core::derive_associated_token_address(&recipient, &mint)?;

        let destination_address = sol_core::bytes_to_address(&destination.address);
        let existing = with_retry(&self.retry, "getAccountInfo", || {
            let rpc = Arc::clone(&self.rpc);
            let address = destination_address.clone();
            async move { rpc.get_account_info(&address).await }
        })
        .await?;

        let mut instructions: Vec<Instruction> = Vec::with_capacity(2);
        if existing.is_none() {
            debug!("destination token account {destination_address} missing, creating it");
            instructions.push(sol_core::create_associated_token_account(
                &payer,
                &destination.address,
                &recipient,
                &mint,
            ));
        }
        instructions.push(sol_core::token_transfer(
            &source.address,
            &destination.address,
            &payer,
            amount,
            decimals,
        )?);

        self.execute(&instructions, blockhash).await
    }

    /// Send a non-fungible: a token transfer of amount 1 with 0 decimals.
    pub async fn transfer_nft(
        &self,
        mint: [u8; 32],
        recipient: [u8; 32],
    ) -> Result<TransferReceipt, ClientError> {
        self.transfer_token(mint, recipient, 1, 0).await
    }

    async fn fetch_blockhash(&self) -> Result<[u8; 32], ClientError> {
        let latest = with_retry(&self.retry, "getLatestBlockhash", || {
            let rpc = Arc::clone(&self.rpc);
            async move { rpc.get_latest_blockhash().await }
        })
        .await?;
        debug!(
            "using blockhash {} (valid through block {})",
            sol_core::bytes_to_address(&latest.blockhash),
            latest.last_valid_block_height
        );
        Ok(latest.blockhash)
    }

    async fn execute(
        &self,
        instructions: &[Instruction],
        blockhash: [u8; 32],
    ) -> Result<TransferReceipt, ClientError> {
        let payer = self.signer.public_key();
        let message = sol_core::compile(instructions, &payer, &blockhash)?;
        if message.header.num_required_signatures != 1 {
            return Err(ClientError::Signing(format!(
                "message needs {} signatures but only the fee payer can sign",
                message.header.num_required_signatures
            )));
        }

        let message_bytes = sol_core::serialize(&message);
        let signature = self.signer.sign(&message_bytes).await?;
        let wire = sol_core::assemble_transaction(&message_bytes, &[signature]);

        // Preflight simulation is skipped: a simulation against stale state
        // produces false negatives for just-created accounts.
        let send_config = SendConfig {
            skip_preflight: true,
            max_retries: 0,
        };
        let tracking_signature = with_retry(&self.retry, "sendTransaction", || {
            let rpc = Arc::clone(&self.rpc);
            let wire = wire.clone();
            async move { rpc.send_transaction(&wire, &send_config).await }
        })
        .await?;
        info!("submitted transaction {tracking_signature}");

        let status = wait_for_confirmation(
            self.rpc.as_ref(),
            &tracking_signature,
            self.target,
            &self.confirmation,
        )
        .await?;

        Ok(TransferReceipt {
            signature: tracking_signature,
            status,
        })
    }
}
