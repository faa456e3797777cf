//! Print sizes, paper types, and line pricing.
//!
//! The catalog is fixed configuration compiled into the binary. Prices are
//! derived as `round(size.base_price * paper.price_multiplier)` using exact
//! decimal arithmetic, rounding half away from zero to whole currency units.
//!
//! ```
//! use print_shop_core::catalog;
//!
//! let medium = catalog::size("medium").unwrap();
//! let metallic = catalog::paper("metallic").unwrap();
//! assert_eq!(catalog::price(medium, metallic).amount(), 163);
//! ```

use std::borrow::Cow;
use std::ops::RangeInclusive;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::types::Price;

/// A print size offered for every photograph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrintSize {
    /// Stable identifier used in cart keys (e.g. `medium`).
    pub id: Cow<'static, str>,
    /// Display name.
    pub name: Cow<'static, str>,
    /// Physical dimensions, e.g. `16" × 20"`.
    pub dimensions: Cow<'static, str>,
    /// Price on standard paper, in whole currency units.
    pub base_price: Decimal,
    /// Marketing description.
    pub description: Cow<'static, str>,
}

/// A paper or substrate a print can be produced on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaperType {
    /// Stable identifier used in cart keys (e.g. `metallic`).
    pub id: Cow<'static, str>,
    /// Display name.
    pub name: Cow<'static, str>,
    /// Marketing description.
    pub description: Cow<'static, str>,
    /// Multiplier applied to the size's base price; `1.0` is the base price.
    pub price_multiplier: Decimal,
}

/// Identifier of the size preselected on a product page.
pub const DEFAULT_SIZE_ID: &str = "medium";

/// Identifier of the paper preselected on a product page.
pub const DEFAULT_PAPER_ID: &str = "standard";

/// Quantities offered by the product page picker.
pub const QUANTITY_CHOICES: RangeInclusive<u32> = 1..=5;

static PRINT_SIZES: [PrintSize; 3] = [
    PrintSize {
        id: Cow::Borrowed("small"),
        name: Cow::Borrowed("Small"),
        dimensions: Cow::Borrowed("12\" × 16\""),
        base_price: Decimal::from_parts(85, 0, 0, false, 0),
        description: Cow::Borrowed("Perfect for smaller spaces and galleries"),
    },
    PrintSize {
        id: Cow::Borrowed("medium"),
        name: Cow::Borrowed("Medium"),
        dimensions: Cow::Borrowed("16\" × 20\""),
        base_price: Decimal::from_parts(125, 0, 0, false, 0),
        description: Cow::Borrowed("Most popular size for home and office"),
    },
    PrintSize {
        id: Cow::Borrowed("large"),
        name: Cow::Borrowed("Large"),
        dimensions: Cow::Borrowed("24\" × 32\""),
        base_price: Decimal::from_parts(195, 0, 0, false, 0),
        description: Cow::Borrowed("Statement piece for larger walls"),
    },
];

static PAPER_TYPES: [PaperType; 3] = [
    PaperType {
        id: Cow::Borrowed("standard"),
        name: Cow::Borrowed("Fine Art Paper"),
        description: Cow::Borrowed("Premium matte finish on archival paper"),
        price_multiplier: Decimal::ONE,
    },
    PaperType {
        id: Cow::Borrowed("metallic"),
        name: Cow::Borrowed("Metallic Print"),
        description: Cow::Borrowed("Vibrant colors with metallic sheen"),
        price_multiplier: Decimal::from_parts(13, 0, 0, false, 1),
    },
    PaperType {
        id: Cow::Borrowed("canvas"),
        name: Cow::Borrowed("Gallery Canvas"),
        description: Cow::Borrowed("Museum-quality canvas with gallery wrap"),
        price_multiplier: Decimal::from_parts(15, 0, 0, false, 1),
    },
];

/// All print sizes, smallest first.
#[must_use]
pub fn list_sizes() -> &'static [PrintSize] {
    &PRINT_SIZES
}

/// All paper types, in display order.
#[must_use]
pub fn list_papers() -> &'static [PaperType] {
    &PAPER_TYPES
}

/// Look up a print size by identifier.
#[must_use]
pub fn size(id: &str) -> Option<&'static PrintSize> {
    PRINT_SIZES.iter().find(|s| s.id == id)
}

/// Look up a paper type by identifier.
#[must_use]
pub fn paper(id: &str) -> Option<&'static PaperType> {
    PAPER_TYPES.iter().find(|p| p.id == id)
}

/// The size preselected on a product page.
#[must_use]
pub fn default_size() -> &'static PrintSize {
    let [_, medium, _] = &PRINT_SIZES;
    medium
}

/// The paper preselected on a product page.
#[must_use]
pub fn default_paper() -> &'static PaperType {
    let [standard, _, _] = &PAPER_TYPES;
    standard
}

/// Unit price of a print in the given configuration.
///
/// Rounds half away from zero: `85 × 1.3 = 110.5` prices at `111`.
#[must_use]
pub fn price(size: &PrintSize, paper: &PaperType) -> Price {
    let exact = size.base_price * paper.price_multiplier;
    let rounded = exact.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
    // Catalog values are positive, so this only falls back for hand-built entries.
    Price::new(rounded.to_u64().unwrap_or_default())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn half_case() -> (PrintSize, PaperType) {
        (size("small").unwrap().clone(), paper("metallic").unwrap().clone())
    }

    #[test]
    fn test_catalog_order() {
        let sizes: Vec<_> = list_sizes().iter().map(|s| s.id.as_ref()).collect();
        assert_eq!(sizes, ["small", "medium", "large"]);
        let papers: Vec<_> = list_papers().iter().map(|p| p.id.as_ref()).collect();
        assert_eq!(papers, ["standard", "metallic", "canvas"]);
    }

    #[test]
    fn test_lookup() {
        assert_eq!(size("large").unwrap().name, "Large");
        assert_eq!(paper("canvas").unwrap().name, "Gallery Canvas");
        assert!(size("poster").is_none());
        assert!(paper("glossy").is_none());
    }

    #[test]
    fn test_defaults() {
        assert_eq!(default_size().id, DEFAULT_SIZE_ID);
        assert_eq!(default_paper().id, DEFAULT_PAPER_ID);
        assert_eq!(QUANTITY_CHOICES.collect::<Vec<_>>(), [1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_price_medium_metallic() {
        let p = price(size("medium").unwrap(), paper("metallic").unwrap());
        assert_eq!(p, Price::new(163));
    }

    #[test]
    fn test_price_standard_is_base() {
        for s in list_sizes() {
            assert_eq!(
                price(s, default_paper()).amount(),
                s.base_price.to_u64().unwrap()
            );
        }
    }

    #[test]
    fn test_price_half_rounds_away_from_zero() {
        let (small, metallic) = half_case();
        assert_eq!(small.base_price * metallic.price_multiplier, Decimal::new(1105, 1));
        assert_eq!(price(&small, &metallic), Price::new(111));
    }

    #[test]
    fn test_price_half_would_be_110_under_bankers_rounding() {
        let (small, metallic) = half_case();
        let bankers = (small.base_price * metallic.price_multiplier)
            .round_dp_with_strategy(0, RoundingStrategy::MidpointNearestEven);
        assert_eq!(bankers, Decimal::from(110));
        assert_ne!(price(&small, &metallic).amount(), 110);
    }

    #[test]
    fn test_full_price_matrix() {
        let matrix: Vec<u64> = list_sizes()
            .iter()
            .flat_map(|s| list_papers().iter().map(move |p| price(s, p).amount()))
            .collect();
        assert_eq!(matrix, [85, 111, 128, 125, 163, 188, 195, 254, 293]);
    }

    #[test]
    fn test_serialized_shape() {
        let json = serde_json::to_value(paper("metallic").unwrap()).unwrap();
        assert_eq!(json["id"], "metallic");
        assert_eq!(json["priceMultiplier"], "1.3");
    }
}
