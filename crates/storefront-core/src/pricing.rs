//! # Pricing
//!
//! Whole-unit price arithmetic and display formatting.
//!
//! Prices are integers in whole rubles. There is no minor unit and no tax or
//! discount model: a cart total is Σ(price × quantity) and nothing else.
//!
//! ## Usage
//! ```rust
//! use storefront_core::pricing::Price;
//!
//! let line = Price::new(2500).times(3);
//! assert_eq!(line.value(), 7500);
//! assert_eq!(line.to_string(), "7\u{a0}500 ₽");
//!
//! let total: Price = [Price::new(500), line].into_iter().sum();
//! assert_eq!(total.value(), 8000);
//! ```

use std::fmt;
use std::iter::Sum;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Currency symbol appended to formatted prices.
pub const CURRENCY_SYMBOL: &str = "₽";

/// Group separator used by ru-RU number formatting (no-break space).
const GROUP_SEPARATOR: char = '\u{a0}';

// =============================================================================
// Price Type
// =============================================================================

/// An amount in whole rubles.
///
/// Arithmetic saturates instead of overflowing; real catalog prices are
/// nowhere near the limit.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS,
)]
#[ts(export)]
pub struct Price(i64);

impl Price {
    #[inline]
    pub const fn new(amount: i64) -> Self {
        Price(amount)
    }

    #[inline]
    pub const fn value(&self) -> i64 {
        self.0
    }

    /// Price of `quantity` units.
    #[inline]
    pub const fn times(&self, quantity: i64) -> Self {
        Price(self.0.saturating_mul(quantity))
    }

    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }
}

impl From<i64> for Price {
    fn from(amount: i64) -> Self {
        Price(amount)
    }
}

impl Sum for Price {
    fn sum<I: Iterator<Item = Price>>(iter: I) -> Self {
        iter.fold(Price(0), |acc, p| Price(acc.0.saturating_add(p.0)))
    }
}

/// Grouped by thousands with a no-break space, followed by the ruble sign.
impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let digits = self.0.unsigned_abs().to_string();
        let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 * 2);

        for (i, digit) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                grouped.push(GROUP_SEPARATOR);
            }
            grouped.push(digit);
        }

        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{sign}{grouped} {CURRENCY_SYMBOL}")
    }
}

/// Formats a whole-unit amount the way the storefront displays prices.
///
/// ## Example
/// ```rust
/// use storefront_core::pricing::format_price;
///
/// assert_eq!(format_price(5000), "5\u{a0}000 ₽");
/// assert_eq!(format_price(500), "500 ₽");
/// ```
pub fn format_price(amount: i64) -> String {
    Price::new(amount).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_price_grouping() {
        assert_eq!(format_price(0), "0 ₽");
        assert_eq!(format_price(999), "999 ₽");
        assert_eq!(format_price(1000), "1\u{a0}000 ₽");
        assert_eq!(format_price(15000), "15\u{a0}000 ₽");
        assert_eq!(format_price(1_234_567), "1\u{a0}234\u{a0}567 ₽");
        assert_eq!(format_price(-2500), "-2\u{a0}500 ₽");
    }

    #[test]
    fn test_times_saturates() {
        assert_eq!(Price::new(1000).times(2), Price::new(2000));
        assert_eq!(Price::new(0).times(5).value(), 0);
        assert_eq!(Price::new(i64::MAX).times(2).value(), i64::MAX);
    }

    #[test]
    fn test_sum_saturates() {
        let total: Price = [Price::new(i64::MAX), Price::new(1)].into_iter().sum();
        assert_eq!(total.value(), i64::MAX);

        let empty: Price = std::iter::empty().sum();
        assert_eq!(empty, Price::default());
    }

    #[test]
    fn test_serializes_as_plain_number() {
        assert_eq!(serde_json::to_string(&Price::new(4500)).unwrap(), "4500");
        let parsed: Price = serde_json::from_str("4500").unwrap();
        assert_eq!(parsed, Price::new(4500));
        assert!(parsed.is_positive());
    }
}
