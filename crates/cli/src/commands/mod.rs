//! CLI command implementations.

pub mod cart;
pub mod catalog;

use print_shop_core::QuantityError;
use thiserror::Error;

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CommandError {
    /// Unknown print size id.
    #[error("Unknown print size: {0}. Valid sizes: small, medium, large")]
    UnknownSize(String),

    /// Unknown paper type id.
    #[error("Unknown paper type: {0}. Valid papers: standard, metallic, canvas")]
    UnknownPaper(String),

    /// Quantity rejected.
    #[error("Invalid quantity: {0}")]
    Quantity(#[from] QuantityError),
}
