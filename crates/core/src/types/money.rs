//! Type-safe money representation using decimal arithmetic.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A monetary amount with currency information.
///
/// Amounts are carried as `rust_decimal::Decimal` in the currency's standard
/// unit (dollars, not cents) and serialized as strings to preserve precision
/// on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Money {
    /// Amount in the currency's standard unit.
    pub amount: Decimal,
    /// ISO 4217 currency code.
    pub currency_code: CurrencyCode,
}

impl Money {
    /// Create a new money value.
    #[must_use]
    pub const fn new(amount: Decimal, currency_code: CurrencyCode) -> Self {
        Self {
            amount,
            currency_code,
        }
    }

    /// Zero in the given currency.
    #[must_use]
    pub const fn zero(currency_code: CurrencyCode) -> Self {
        Self::new(Decimal::ZERO, currency_code)
    }

    /// Multiply by a line quantity.
    #[must_use]
    pub fn times(&self, quantity: u32) -> Self {
        Self::new(self.amount * Decimal::from(quantity), self.currency_code)
    }

    /// Add another amount, keeping this value's currency.
    ///
    /// Mixed-currency carts do not occur in this system; the backend prices
    /// every line of a cart in the cart's single currency.
    #[must_use]
    pub fn plus(&self, other: &Self) -> Self {
        Self::new(self.amount + other.amount, self.currency_code)
    }

    /// Format for display (e.g., "$19.99").
    #[must_use]
    pub fn display(&self) -> String {
        format!("{}{:.2}", self.currency_code.symbol(), self.amount)
    }
}

/// ISO 4217 currency codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CurrencyCode {
    #[default]
    USD,
    EUR,
    GBP,
    CAD,
    AUD,
}

impl CurrencyCode {
    /// Currency symbol for display.
    #[must_use]
    pub const fn symbol(&self) -> &'static str {
        match self {
            Self::USD | Self::CAD | Self::AUD => "$",
            Self::EUR => "\u{20ac}",
            Self::GBP => "\u{a3}",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    #[test]
    fn test_times_and_plus() {
        let ten = Money::new(Decimal::new(1000, 2), CurrencyCode::USD);
        let five = Money::new(Decimal::new(500, 2), CurrencyCode::USD);
        let total = ten.times(2).plus(&five);
        assert_eq!(total.amount, Decimal::new(2500, 2));
    }

    #[test]
    fn test_display() {
        let price = Money::new(Decimal::new(1999, 2), CurrencyCode::USD);
        assert_eq!(price.display(), "$19.99");
    }

    #[test]
    fn test_serde_preserves_precision() {
        let price = Money::new(Decimal::new(1050, 2), CurrencyCode::USD);
        let json = serde_json::to_string(&price).unwrap();
        assert!(json.contains("\"10.50\""));
        let back: Money = serde_json::from_str(&json).unwrap();
        assert_eq!(back, price);
    }
}
