use log::debug;
use solana_account_decoder::UiAccountEncoding;
use solana_client::client_error::{ClientError, ClientErrorKind};
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_client::rpc_config::{
    RpcSimulateTransactionAccountsConfig, RpcSimulateTransactionConfig, RpcTransactionConfig,
};
use solana_client::rpc_response::RpcSimulateTransactionResult;
use solana_sdk::account::Account;
use solana_sdk::commitment_config::CommitmentConfig;
use solana_sdk::hash::Hash;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Signature;
use solana_sdk::transaction::{Transaction, TransactionError};
use solana_transaction_status::{EncodedConfirmedTransactionWithStatusMeta, UiTransactionEncoding};
use std::sync::Arc;

use crate::error::{LiquidityError, Result};

/// Shared handle to a Solana RPC node, passed to the wallet, verifier and pool client
#[derive(Clone)]
pub struct SolanaClient {
    rpc_client: Arc<RpcClient>,
    commitment: CommitmentConfig,
}

impl SolanaClient {
    /// Create a new Solana client with the given RPC URL
    pub fn new(rpc_url: &str) -> Self {
        Self::new_with_commitment(rpc_url, CommitmentConfig::confirmed())
    }

    pub fn new_with_commitment(rpc_url: &str, commitment: CommitmentConfig) -> Self {
        let rpc_client = RpcClient::new_with_commitment(rpc_url.to_string(), commitment);
        Self { rpc_client: Arc::new(rpc_client), commitment }
    }

    pub async fn get_latest_blockhash(&self) -> Result<Hash> {
        Ok(self.rpc_client.get_latest_blockhash().await?)
    }

    pub async fn send_transaction(&self, transaction: &Transaction) -> Result<Signature> {
        let signature = self.rpc_client.send_transaction(transaction).await?;
        debug!("Sent transaction {}", signature);
        Ok(signature)
    }

    /// `None` while the cluster has not yet processed the signature
    pub async fn get_signature_status(
        &self,
        signature: &Signature,
    ) -> Result<Option<std::result::Result<(), TransactionError>>> {
        Ok(self
            .rpc_client
            .get_signature_status_with_commitment(signature, self.commitment)
            .await?)
    }

    /// Fetch an account, returning `None` when it does not exist
    pub async fn get_account(&self, pubkey: &Pubkey) -> Result<Option<Account>> {
        let response = self
            .rpc_client
            .get_account_with_commitment(pubkey, self.commitment)
            .await?;
        Ok(response.value)
    }

    pub async fn get_multiple_accounts(&self, pubkeys: &[Pubkey]) -> Result<Vec<Option<Account>>> {
        Ok(self.rpc_client.get_multiple_accounts(pubkeys).await?)
    }

    /// Fetch a confirmed transaction with token balance snapshots
    pub async fn get_transaction(
        &self,
        signature: &Signature,
    ) -> Result<EncodedConfirmedTransactionWithStatusMeta> {
        let config = RpcTransactionConfig {
            encoding: Some(UiTransactionEncoding::Json),
            commitment: Some(self.commitment),
            max_supported_transaction_version: Some(0),
        };

        self.rpc_client
            .get_transaction_with_config(signature, config)
            .await
            .map_err(|e| {
                if is_null_result(&e) {
                    LiquidityError::TransactionNotFound(*signature)
                } else {
                    LiquidityError::Rpc(e)
                }
            })
    }

    /// Dry-run a transaction, returning the post-simulation state of `addresses`
    pub async fn simulate_transaction(
        &self,
        transaction: &Transaction,
        addresses: &[Pubkey],
    ) -> Result<RpcSimulateTransactionResult> {
        let config = RpcSimulateTransactionConfig {
            sig_verify: false,
            replace_recent_blockhash: true,
            commitment: Some(self.commitment),
            accounts: Some(RpcSimulateTransactionAccountsConfig {
                encoding: Some(UiAccountEncoding::Base64),
                addresses: addresses.iter().map(|address| address.to_string()).collect(),
            }),
            ..RpcSimulateTransactionConfig::default()
        };

        let response = self
            .rpc_client
            .simulate_transaction_with_config(transaction, config)
            .await?;
        Ok(response.value)
    }
}

/// `getTransaction` answers `null` for unknown signatures, which surfaces as a
/// deserialization error in the client
fn is_null_result(error: &ClientError) -> bool {
    matches!(error.kind(), ClientErrorKind::SerdeJson(_))
}
