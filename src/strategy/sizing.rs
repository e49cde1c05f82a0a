use log::debug;
use rust_decimal::Decimal;

use crate::error::{LiquidityError, Result};
use crate::models::{Amount, Pool};
use crate::utils::ui_to_base_units;

/// Resolve both sides of a deposit into base units.
///
/// `price_per_token` is the price of one X in Y (UI units). A derived side is
/// computed from the fixed side: `y = x * price` or `x = y / price`.
pub fn calculate_amounts(
    amount_x: &Amount,
    amount_y: &Amount,
    price_per_token: Decimal,
    decimals_x: u8,
    decimals_y: u8,
) -> Result<(u64, u64)> {
    let (ui_x, ui_y) = match (amount_x, amount_y) {
        (Amount::Derived, Amount::Derived) => return Err(LiquidityError::AmbiguousAmount),
        (Amount::Fixed(x), Amount::Fixed(y)) => (*x, *y),
        (Amount::Fixed(x), Amount::Derived) => {
            let y = x.checked_mul(price_per_token).ok_or_else(|| {
                LiquidityError::InvalidAmount(format!("{} x {} overflows", x, price_per_token))
            })?;
            (*x, y)
        }
        (Amount::Derived, Amount::Fixed(y)) => {
            if price_per_token <= Decimal::ZERO {
                return Err(LiquidityError::InvalidParameters(format!(
                    "cannot derive X from a non-positive price {}",
                    price_per_token
                )));
            }
            let x = y.checked_div(price_per_token).ok_or_else(|| {
                LiquidityError::InvalidAmount(format!("{} / {} overflows", y, price_per_token))
            })?;
            (x, *y)
        }
    };

    if ui_x < Decimal::ZERO || ui_y < Decimal::ZERO {
        return Err(LiquidityError::InvalidAmount(format!(
            "negative amount derived at price {}",
            price_per_token
        )));
    }

    let total_x = ui_to_base_units(ui_x, decimals_x)?;
    let total_y = ui_to_base_units(ui_y, decimals_y)?;
    debug!(
        "Sized deposit {} / {} at price {} -> ({}, {})",
        amount_x, amount_y, price_per_token, total_x, total_y
    );

    Ok((total_x, total_y))
}

/// `calculate_amounts` using the mint decimals of `pool`
pub fn calculate_pool_amounts(
    amount_x: &Amount,
    amount_y: &Amount,
    price_per_token: Decimal,
    pool: &Pool,
) -> Result<(u64, u64)> {
    calculate_amounts(
        amount_x,
        amount_y,
        price_per_token,
        pool.token_x.decimals,
        pool.token_y.decimals,
    )
}
