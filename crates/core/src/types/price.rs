//! Decimal money amounts as priced by the backend.
//!
//! All amounts the client shows are computed server-side (taxes, delivery
//! fees and handling charges are not reproducible locally). `Price` therefore
//! offers formatting and comparison but no arithmetic.

use core::fmt;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// A price in the store currency (Indian rupees).
///
/// Deserializes from either a JSON number (`149.5`) or a numeric string
/// (`"149.50"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(Decimal);

impl Price {
    /// Currency symbol used when formatting.
    pub const SYMBOL: &'static str = "₹";

    /// A zero amount.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Wrap a decimal amount.
    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Build a price from a whole number of paise.
    #[must_use]
    pub fn from_paise(paise: i64) -> Self {
        Self(Decimal::new(paise, 2))
    }

    /// The underlying decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Whether the amount is zero.
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.0.is_zero()
    }
}

impl From<Decimal> for Price {
    fn from(amount: Decimal) -> Self {
        Self(amount)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rounded = self
            .0
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        write!(f, "{}{rounded:.2}", Self::SYMBOL)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_deserializes_from_number_and_string() {
        let from_number: Price = serde_json::from_str("149.5").unwrap();
        let from_string: Price = serde_json::from_str("\"149.50\"").unwrap();
        assert_eq!(from_number, from_string);
        assert_eq!(from_number, Price::from_paise(14950));
    }

    #[test]
    fn test_display_rounds_to_two_places() {
        assert_eq!(Price::from_paise(9900).to_string(), "₹99.00");
        assert_eq!(Price::new(Decimal::new(12345, 3)).to_string(), "₹12.35");
        assert_eq!(Price::ZERO.to_string(), "₹0.00");
    }
}
