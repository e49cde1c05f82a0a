pub mod amount;
pub mod bin;
pub mod pool;
mod position;

pub use amount::Amount;
pub use bin::Bin;
pub use pool::Pool;
pub use pool::TokenInfo;
pub use position::Position;
pub use position::PositionBin;
