use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::LiquidityError;

/// Amount requested for one side of a deposit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Amount {
    /// A positive amount in UI units
    Fixed(Decimal),
    /// Derive from the other side using the active bin price
    Derived,
}

impl Amount {
    pub fn is_derived(&self) -> bool {
        matches!(self, Amount::Derived)
    }
}

impl FromStr for Amount {
    type Err = LiquidityError;

    /// `"auto"` (any case) means derived; anything else must be a positive decimal
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.eq_ignore_ascii_case("auto") {
            return Ok(Amount::Derived);
        }

        let value = Decimal::from_str(trimmed)
            .or_else(|_| Decimal::from_scientific(trimmed))
            .map_err(|_| LiquidityError::InvalidAmount(format!("'{}' is not a number", s)))?;

        if value <= Decimal::ZERO {
            return Err(LiquidityError::InvalidAmount(format!("'{}' must be positive", s)));
        }

        Ok(Amount::Fixed(value))
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Amount::Fixed(value) => write!(f, "{}", value),
            Amount::Derived => write!(f, "auto"),
        }
    }
}
