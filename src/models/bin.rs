use serde::{Deserialize, Serialize};
use rust_decimal::prelude::*;
use rust_decimal::Decimal;

/// A discrete price bucket of a DLMM pool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bin {
    pub bin_id: i32,
    /// Price of one base unit of X in base units of Y
    pub price: Decimal,
    /// Price of one X in Y, adjusted for mint decimals
    pub price_per_token: Decimal,
    pub x_amount: u64,
    pub y_amount: u64,
}

/// Raw bin price: `(1 + bin_step / 10_000) ^ bin_id`
pub fn bin_id_to_price(bin_id: i32, bin_step: u16) -> Option<Decimal> {
    let step = 1.0 + f64::from(bin_step) / 10_000.0;
    Decimal::from_f64(step.powi(bin_id))
}

/// Bin price converted to UI units using the mint decimals
pub fn price_per_token(price: Decimal, decimals_x: u8, decimals_y: u8) -> Decimal {
    let diff = i32::from(decimals_x) - i32::from(decimals_y);
    // 10^-|diff|
    let unit = Decimal::new(1, diff.unsigned_abs());
    if diff >= 0 {
        price / unit
    } else {
        price * unit
    }
}

impl Bin {
    /// Build a bin from its id, computing prices from the pool parameters
    pub fn from_id(bin_id: i32, bin_step: u16, decimals_x: u8, decimals_y: u8) -> Option<Self> {
        let price = bin_id_to_price(bin_id, bin_step)?;
        Some(Self {
            bin_id,
            price,
            price_per_token: price_per_token(price, decimals_x, decimals_y),
            x_amount: 0,
            y_amount: 0,
        })
    }
}
