use async_trait::async_trait;
use log::{debug, info};
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Signature;
use solana_sdk::signer::keypair::Keypair;
use solana_sdk::signer::Signer;
use solana_sdk::transaction::Transaction;
use std::path::Path;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time;

use crate::error::{LiquidityError, Result};
use crate::solana::client::SolanaClient;
use crate::solana::wallet::Wallet;

const CONFIRMATION_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Outcome of waiting for a transaction to land
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmationStatus {
    /// Error reported by the chain, if the transaction failed
    pub err: Option<String>,
}

/// Signing and broadcasting capability of the acting wallet
#[async_trait]
pub trait WalletSigner: Send + Sync {
    fn public_key(&self) -> Pubkey;

    /// Sign with the wallet key plus `extra_signers` and broadcast
    async fn sign_and_send(
        &self,
        transaction: Transaction,
        extra_signers: &[&Keypair],
    ) -> Result<Signature>;

    /// Block until the signature reaches the configured commitment or the timeout elapses
    async fn wait_for_confirmation(&self, signature: &Signature) -> Result<ConfirmationStatus>;
}

/// Keypair-backed signer that sends through a Solana RPC node
pub struct WalletManager {
    wallet: Wallet,
    client: SolanaClient,
    confirmation_timeout: Duration,
    /// Serializes sends from this wallet so blockhash fetch and broadcast do not interleave
    send_lock: Mutex<()>,
}

impl WalletManager {
    pub fn new(wallet: Wallet, client: SolanaClient, confirmation_timeout: Duration) -> Self {
        Self {
            wallet,
            client,
            confirmation_timeout,
            send_lock: Mutex::new(()),
        }
    }

    /// Load a wallet from a keypair file and create a wallet manager
    pub fn from_file<P: AsRef<Path>>(
        path: P,
        client: SolanaClient,
        confirmation_timeout: Duration,
    ) -> anyhow::Result<Self> {
        let wallet = Wallet::from_file(path)?;
        Ok(Self::new(wallet, client, confirmation_timeout))
    }

    async fn poll_status(&self, signature: &Signature) -> Result<ConfirmationStatus> {
        loop {
            match self.client.get_signature_status(signature).await? {
                Some(Ok(())) => {
                    debug!("Transaction {} confirmed", signature);
                    return Ok(ConfirmationStatus { err: None });
                }
                Some(Err(e)) => return Ok(ConfirmationStatus { err: Some(e.to_string()) }),
                None => time::sleep(CONFIRMATION_POLL_INTERVAL).await,
            }
        }
    }
}

#[async_trait]
impl WalletSigner for WalletManager {
    fn public_key(&self) -> Pubkey {
        self.wallet.pubkey()
    }

    async fn sign_and_send(
        &self,
        mut transaction: Transaction,
        extra_signers: &[&Keypair],
    ) -> Result<Signature> {
        let _guard = self.send_lock.lock().await;

        let blockhash = self.client.get_latest_blockhash().await?;

        {
            let mut signers: Vec<&dyn Signer> = Vec::with_capacity(extra_signers.len() + 1);
            signers.push(self.wallet.keypair());
            for signer in extra_signers {
                signers.push(*signer);
            }

            transaction.try_sign(&signers, blockhash).map_err(|e| {
                LiquidityError::InvalidParameters(format!("Failed to sign transaction: {}", e))
            })?;
        }

        let signature = self.client.send_transaction(&transaction).await?;
        info!("Submitted transaction {}", signature);
        Ok(signature)
    }

    async fn wait_for_confirmation(&self, signature: &Signature) -> Result<ConfirmationStatus> {
        match time::timeout(self.confirmation_timeout, self.poll_status(signature)).await {
            Ok(status) => status,
            Err(_) => Err(LiquidityError::ConfirmationTimeout(*signature)),
        }
    }
}
