//! Post-hoc checks of what a liquidity transaction actually moved.
//!
//! A DLMM deposit can confirm while applying only part of the requested
//! liquidity, so the manager never trusts the instruction amounts. It asks a
//! [`TransactionVerifier`] for the wallet's real token deltas after
//! confirmation, and for the simulated deltas before submission.

pub mod attribution;
mod rpc;

pub use attribution::BalanceChanges;
pub use rpc::RpcTransactionVerifier;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Signature;
use solana_sdk::transaction::Transaction;

use crate::error::Result;
use crate::models::Pool;

/// Predicted movement of one token in a simulated deposit
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimulatedAmount {
    /// Base units
    pub amount: u64,
    pub ui_amount: f64,
}

#[async_trait]
pub trait TransactionVerifier: Send + Sync {
    /// Wallet token deltas of a confirmed transaction, split into liquidity and claimed fees
    async fn extract_balance_changes(
        &self,
        signature: &Signature,
        mint_x: &Pubkey,
        mint_y: &Pubkey,
    ) -> Result<BalanceChanges>;

    /// Dry-run a deposit; returns the predicted X and Y amounts leaving the wallet
    async fn simulate_add_liquidity(
        &self,
        transaction: &Transaction,
        pool: &Pool,
    ) -> Result<[SimulatedAmount; 2]>;
}
