//! Response types of the DLMM indexer HTTP API

use chrono::Utc;
use rust_decimal::prelude::*;
use rust_decimal::Decimal;
use serde::Deserialize;
use solana_sdk::pubkey::Pubkey;

use crate::error::{LiquidityError, Result};
use crate::models::{Pool, TokenInfo};
use crate::solana::parse_pubkey;

/// A pair as returned by `/pair/all` and `/pair/{address}`
#[derive(Debug, Clone, Deserialize)]
pub struct ApiPair {
    pub address: String,
    #[serde(default)]
    pub name: String,
    pub mint_x: String,
    pub mint_y: String,
    pub bin_step: u16,
    #[serde(default)]
    pub base_fee_percentage: String,
    #[serde(default)]
    pub max_fee_percentage: String,
    #[serde(default)]
    pub protocol_fee_percentage: String,
    #[serde(default)]
    pub liquidity: String,
    #[serde(default)]
    pub trade_volume_24h: f64,
    #[serde(default)]
    pub fees_24h: f64,
    #[serde(default)]
    pub current_price: f64,
    #[serde(default)]
    pub hide: bool,
    #[serde(default)]
    pub is_blacklisted: bool,
}

/// `/pair/all` answers either a bare array or `{ "pairs": [...] }`
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum PairListResponse {
    List(Vec<ApiPair>),
    Wrapped { pairs: Vec<ApiPair> },
}

impl PairListResponse {
    pub fn into_pairs(self) -> Vec<ApiPair> {
        match self {
            PairListResponse::List(pairs) => pairs,
            PairListResponse::Wrapped { pairs } => pairs,
        }
    }
}

fn decimal_field(value: &str) -> Decimal {
    Decimal::from_str(value.trim())
        .or_else(|_| Decimal::from_scientific(value.trim()))
        .unwrap_or(Decimal::ZERO)
}

impl ApiPair {
    pub fn mints(&self) -> Result<(Pubkey, Pubkey)> {
        Ok((parse_pubkey(&self.mint_x)?, parse_pubkey(&self.mint_y)?))
    }

    pub fn is_listed(&self) -> bool {
        !self.hide && !self.is_blacklisted
    }

    /// Build a `Pool` once the mint metadata has been resolved on chain
    pub fn into_pool(self, token_x: TokenInfo, token_y: TokenInfo) -> Result<Pool> {
        let address = parse_pubkey(&self.address)?;
        let current_price = Decimal::from_f64(self.current_price).ok_or_else(|| {
            LiquidityError::Program(anyhow::anyhow!(
                "pair {} reports an unrepresentable price {}",
                self.address,
                self.current_price
            ))
        })?;

        Ok(Pool {
            address,
            name: self.name,
            token_x,
            token_y,
            bin_step: self.bin_step,
            base_fee_percentage: decimal_field(&self.base_fee_percentage),
            max_fee_percentage: decimal_field(&self.max_fee_percentage),
            protocol_fee_percentage: decimal_field(&self.protocol_fee_percentage),
            liquidity: decimal_field(&self.liquidity),
            volume_24h: self.trade_volume_24h,
            fees_24h: self.fees_24h,
            current_price,
            fetched_at: Utc::now(),
        })
    }

    pub fn symbols(&self) -> (Option<String>, Option<String>) {
        match self.name.split_once('-') {
            Some((x, y)) if !x.is_empty() && !y.is_empty() => {
                (Some(x.to_string()), Some(y.to_string()))
            }
            _ => (None, None),
        }
    }
}
