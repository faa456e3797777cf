//! Core value types for the print shop.
//!
//! This module provides type-safe wrappers for keys, prices, and quantities.

pub mod id;
pub mod price;
pub mod quantity;

pub use id::{CartItemKey, ProductKey};
pub use price::{CurrencyCode, Price, format_price};
pub use quantity::{Quantity, QuantityError};
