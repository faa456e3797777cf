//! Whole-unit price representation.
//!
//! Catalog prices are quoted in whole currency units (dollars for USD). The
//! payment provider wants minor units (cents), so conversion lives here too.

use core::fmt;
use core::iter::Sum;
use core::ops::{Add, Mul};

use serde::{Deserialize, Serialize};

/// A price in whole units of the store currency.
///
/// Serialized as a bare number so persisted carts stay readable:
///
/// ```
/// use print_shop_core::Price;
///
/// let price = Price::new(163);
/// assert_eq!(serde_json::to_string(&price).unwrap(), "163");
/// assert_eq!(price.to_string(), "$163.00");
/// ```
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Price(u64);

impl Price {
    /// A zero price.
    pub const ZERO: Self = Self(0);

    /// Create a price from whole currency units.
    #[must_use]
    pub const fn new(amount: u64) -> Self {
        Self(amount)
    }

    /// Amount in whole currency units.
    #[must_use]
    pub const fn amount(&self) -> u64 {
        self.0
    }

    /// Amount in minor units (cents), saturating on overflow.
    #[must_use]
    pub const fn to_minor_units(&self) -> u64 {
        self.0.saturating_mul(100)
    }
}

impl Add for Price {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0.saturating_add(rhs.0))
    }
}

impl Mul<u32> for Price {
    type Output = Self;

    fn mul(self, rhs: u32) -> Self::Output {
        Self(self.0.saturating_mul(u64::from(rhs)))
    }
}

impl Sum for Price {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_price(*self))
    }
}

/// ISO 4217 currency codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CurrencyCode {
    #[default]
    USD,
}

impl CurrencyCode {
    /// Display symbol.
    #[must_use]
    pub const fn symbol(&self) -> &'static str {
        match self {
            Self::USD => "$",
        }
    }

    /// Lowercase code as expected by the payment provider.
    #[must_use]
    pub const fn api_code(&self) -> &'static str {
        match self {
            Self::USD => "usd",
        }
    }
}

/// Format a whole-unit amount for display, e.g. `$1,234.00`.
///
/// Matches en-US currency formatting: symbol prefix, comma thousands
/// separators, and two fraction digits.
#[must_use]
pub fn format_price(price: Price) -> String {
    let digits = price.amount().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    format!("{}{grouped}.00", CurrencyCode::default().symbol())
}
