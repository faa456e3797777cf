//! Product route handlers.
//!
//! Products are photographs identified by their storage key; nothing is
//! looked up, the detail is derived from the key itself.

use axum::{
    Json,
    extract::{Path, State},
};
use print_shop_core::catalog;
use print_shop_core::product::Product;
use print_shop_core::Price;
use serde::Serialize;
use tracing::instrument;

use crate::error::{AppError, Result};
use crate::state::AppState;

/// Longest image key accepted.
const MAX_KEY_LEN: usize = 1024;

/// Product detail with the preselected configuration.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDetail {
    #[serde(flatten)]
    pub product: Product,
    pub default_size: &'static str,
    pub default_paper: &'static str,
    /// Price of the preselected configuration.
    pub price: Price,
}

/// Product detail page data.
///
/// `GET /api/products/{*key}`
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<ProductDetail>> {
    let key = validate_key(&key)?;
    let size = catalog::default_size();
    let paper = catalog::default_paper();

    Ok(Json(ProductDetail {
        product: Product::from_key(key, state.image_base()),
        default_size: &size.id,
        default_paper: &paper.id,
        price: catalog::price(size, paper),
    }))
}

/// Check that an image key is usable as a product id.
///
/// # Errors
///
/// Returns `BadRequest` for empty, oversized, or path-traversing keys.
pub fn validate_key(key: &str) -> Result<&str> {
    let key = key.trim_start_matches('/');
    if key.is_empty() || key.len() > MAX_KEY_LEN {
        return Err(AppError::BadRequest("Invalid product key".to_string()));
    }
    if key.split('/').any(|segment| segment == "..") || key.chars().any(char::is_control) {
        return Err(AppError::BadRequest("Invalid product key".to_string()));
    }
    Ok(key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_key() {
        assert_eq!(validate_key("prints/a.jpg").ok(), Some("prints/a.jpg"));
        assert_eq!(validate_key("/prints/a.jpg").ok(), Some("prints/a.jpg"));
        assert!(validate_key("").is_err());
        assert!(validate_key("/").is_err());
        assert!(validate_key("prints/../secret").is_err());
        assert!(validate_key("a\nb.jpg").is_err());
        assert!(validate_key(&"k".repeat(MAX_KEY_LEN + 1)).is_err());
    }
}
