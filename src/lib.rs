pub mod config;
pub mod error;
pub mod meteora;
pub mod models;
pub mod retry;
pub mod solana;
pub mod strategy;
pub mod utils;
pub mod verifier;

pub use error::{LiquidityError, Result};
pub use strategy::{
    AddLiquidityOutcome, AddLiquidityParams, ClaimFeesOutcome, LiquidityPositionManager,
    RemoveLiquidityOutcome,
};
