use serde::{Deserialize, Serialize};
use solana_sdk::pubkey::Pubkey;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

/// SPL Token program
pub const TOKEN_PROGRAM_ID: Pubkey =
    solana_sdk::pubkey!("TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA");
/// SPL Token-2022 program
pub const TOKEN_2022_PROGRAM_ID: Pubkey =
    solana_sdk::pubkey!("TokenzQdBNbLqP5VEhdkAS6EPFLC1PHnBqCSTgZ6ozr");
/// Wrapped SOL
pub const NATIVE_MINT: Pubkey =
    solana_sdk::pubkey!("So11111111111111111111111111111111111111112");

/// Represents a Meteora DLMM pair (a two-token bin-based pool)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pool {
    pub address: Pubkey,
    pub name: String,
    pub token_x: TokenInfo,
    pub token_y: TokenInfo,
    /// Price granularity between adjacent bins, in basis points
    pub bin_step: u16,
    pub base_fee_percentage: Decimal,
    pub max_fee_percentage: Decimal,
    pub protocol_fee_percentage: Decimal,
    /// Total value locked as reported by the indexer
    pub liquidity: Decimal,
    pub volume_24h: f64,
    pub fees_24h: f64,
    /// Price of X in Y at the active bin, in UI units
    pub current_price: Decimal,
    pub fetched_at: DateTime<Utc>,
}

/// Information about a token in a pool
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenInfo {
    pub mint: Pubkey,
    pub symbol: Option<String>,
    pub decimals: u8,
    /// Token program owning the mint (SPL Token or Token-2022)
    pub token_program: Pubkey,
}

impl TokenInfo {
    pub fn new(mint: Pubkey, decimals: u8) -> Self {
        Self { mint, symbol: None, decimals, token_program: TOKEN_PROGRAM_ID }
    }
}

impl Pool {
    pub fn mints(&self) -> (Pubkey, Pubkey) {
        (self.token_x.mint, self.token_y.mint)
    }

    /// True when the pool trades exactly this unordered pair of mints
    pub fn matches_pair(&self, a: &Pubkey, b: &Pubkey) -> bool {
        let (x, y) = self.mints();
        (x == *a && y == *b) || (x == *b && y == *a)
    }
}
