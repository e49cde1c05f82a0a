pub mod client;
pub mod wallet;
pub mod rpc_helpers;
pub mod wallet_manager;

pub use client::SolanaClient;
pub use wallet::Wallet;
pub use wallet_manager::ConfirmationStatus;
pub use wallet_manager::WalletManager;
pub use wallet_manager::WalletSigner;
pub use rpc_helpers::*;

use crate::config::Config;
use anyhow::{Result, Context};

/// Create a Solana client from the application configuration
pub fn create_client_from_config(config: &Config) -> SolanaClient {
    SolanaClient::new(&config.rpc_url)
}

/// Create a wallet manager from the application configuration
pub fn create_wallet_manager_from_config(
    config: &Config,
    client: SolanaClient,
) -> Result<WalletManager> {
    WalletManager::from_file(&config.keypair_path, client, config.confirmation_timeout())
        .with_context(|| format!("Failed to create wallet manager from {}", config.keypair_path))
}
