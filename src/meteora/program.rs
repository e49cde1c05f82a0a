use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use solana_sdk::pubkey::Pubkey;
use solana_sdk::transaction::Transaction;

use crate::error::Result;
use crate::models::{Bin, Position};

/// Shape of a deposit across its bin range, interpreted by the program
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StrategyType {
    /// Uniform across the range (imbalanced sides allowed)
    #[default]
    Spot,
    /// Concentrated around the active bin
    Curve,
    /// Weighted towards the range edges
    BidAsk,
}

/// Bin range and shape of a deposit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiquidityStrategy {
    pub min_bin_id: i32,
    pub max_bin_id: i32,
    pub strategy_type: StrategyType,
}

/// Parameters for an `add_liquidity_by_strategy` transaction
#[derive(Debug, Clone)]
pub struct DepositRequest {
    pub pool: Pubkey,
    pub owner: Pubkey,
    pub position: Pubkey,
    /// Prepend an "initialize position" instruction; the position keypair must co-sign
    pub initialize_position: bool,
    pub total_x: u64,
    pub total_y: u64,
    pub strategy: LiquidityStrategy,
    pub slippage_bps: u16,
}

/// Parameters for a `remove_liquidity` transaction set
#[derive(Debug, Clone)]
pub struct WithdrawRequest {
    pub pool: Pubkey,
    pub owner: Pubkey,
    pub position: Pubkey,
    pub bin_ids: Vec<i32>,
    /// Share of each bin's liquidity to withdraw, 10_000 = 100%
    pub bps: u16,
    /// Claim outstanding fees and close the position account once empty
    pub claim_and_close: bool,
}

/// The DLMM program as seen through its SDK: on-chain reads and unsigned
/// transaction construction. Instruction encoding lives behind this trait.
#[async_trait]
pub trait DlmmProgram: Send + Sync {
    /// Active bin of `pool`, `None` if the pair account does not exist
    async fn active_bin(&self, pool: &Pubkey) -> Result<Option<Bin>>;

    /// Positions owned by `owner`, across all pools or in `pool` only
    async fn positions_by_owner(
        &self,
        owner: &Pubkey,
        pool: Option<&Pubkey>,
    ) -> Result<Vec<Position>>;

    async fn position(&self, address: &Pubkey) -> Result<Option<Position>>;

    async fn build_add_liquidity(&self, request: &DepositRequest) -> Result<Transaction>;

    /// May return several transactions when the bins do not fit in one
    async fn build_remove_liquidity(&self, request: &WithdrawRequest) -> Result<Vec<Transaction>>;

    async fn build_claim_fee(&self, owner: &Pubkey, position: &Position) -> Result<Transaction>;
}
