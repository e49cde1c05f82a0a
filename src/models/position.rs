use serde::{Deserialize, Serialize};
use solana_sdk::pubkey::Pubkey;
use chrono::{DateTime, Utc};

/// A wallet's liquidity over a fixed bin range of one pool
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Position {
    pub address: Pubkey,
    pub pool: Pubkey,
    pub owner: Pubkey,
    pub min_bin_id: i32,
    pub max_bin_id: i32,
    /// Bins currently holding a share of this position's liquidity
    pub bins: Vec<PositionBin>,
    /// Accrued but unclaimed fees, in base units
    pub fee_x: u64,
    pub fee_y: u64,
    pub last_updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PositionBin {
    pub bin_id: i32,
    pub x_amount: u64,
    pub y_amount: u64,
    pub liquidity_share: u128,
}

impl Position {
    pub fn bin_ids(&self) -> Vec<i32> {
        self.bins.iter().map(|bin| bin.bin_id).collect()
    }

    pub fn total_x(&self) -> u64 {
        self.bins.iter().map(|bin| bin.x_amount).sum()
    }

    pub fn total_y(&self) -> u64 {
        self.bins.iter().map(|bin| bin.y_amount).sum()
    }
}
