pub mod manager;
pub mod sizing;

pub use manager::{
    AddLiquidityOutcome, AddLiquidityParams, ClaimFeesOutcome, LiquidityPositionManager,
    RemoveLiquidityOutcome,
};
pub use sizing::{calculate_amounts, calculate_pool_amounts};
