pub mod client;
pub mod indexer;
pub mod program;

pub use client::PoolClient;
pub use program::{DepositRequest, DlmmProgram, LiquidityStrategy, StrategyType, WithdrawRequest};

use solana_sdk::pubkey::Pubkey;

/// Meteora DLMM program
pub const DLMM_PROGRAM_ID: Pubkey =
    solana_sdk::pubkey!("LBUZKhRxPF3XUpBCjp4YzTKgLccjZhTSDM9YuVaPwxo");

/// Anchor discriminator of `claim_fee`
pub const CLAIM_FEE_DISCRIMINATOR: [u8; 8] = [169, 32, 79, 137, 136, 232, 70, 137];
/// Anchor discriminator of `claim_fee2` (Token-2022 aware variant)
pub const CLAIM_FEE2_DISCRIMINATOR: [u8; 8] = [112, 191, 101, 171, 28, 144, 127, 187];

/// Withdrawal share meaning "all liquidity in the bin"
pub const FULL_WITHDRAWAL_BPS: u16 = 10_000;
