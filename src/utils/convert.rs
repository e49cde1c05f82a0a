use rust_decimal::prelude::*;
use rust_decimal::Decimal;

use crate::error::LiquidityError;

/// Convert a UI amount to base units, rounding down
pub fn ui_to_base_units(
    amount: Decimal,
    decimals: u8,
) -> std::result::Result<u64, LiquidityError> {
    let scaled = Decimal::from(10u64)
        .checked_powu(u64::from(decimals))
        .and_then(|factor| amount.checked_mul(factor))
        .ok_or_else(|| {
            LiquidityError::InvalidAmount(format!("{} overflows {} decimals", amount, decimals))
        })?;

    scaled.floor().to_u64().ok_or_else(|| {
        LiquidityError::InvalidAmount(format!("{} does not fit in base units", amount))
    })
}

/// Convert base units to a UI amount
pub fn base_units_to_ui(amount: u64, decimals: u8) -> Decimal {
    let mut value = Decimal::from(amount);
    // Decimal supports at most 28 fractional digits
    match value.set_scale(u32::from(decimals.min(28))) {
        Ok(()) => value,
        Err(_) => Decimal::ZERO,
    }
}
