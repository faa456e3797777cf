//! Catalog route handler.

use axum::Json;
use print_shop_core::Price;
use print_shop_core::catalog::{self, PaperType, PrintSize};
use serde::Serialize;

/// Everything a product page needs to render its option pickers.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogResponse {
    pub sizes: &'static [PrintSize],
    pub papers: &'static [PaperType],
    pub prices: Vec<PriceEntry>,
    pub default_size: &'static str,
    pub default_paper: &'static str,
    pub quantity_choices: Vec<u32>,
}

/// Line price for one size and paper combination.
#[derive(Debug, Serialize)]
pub struct PriceEntry {
    pub size: &'static str,
    pub paper: &'static str,
    pub price: Price,
}

/// Sizes, papers, and the full price matrix.
///
/// `GET /api/catalog`
pub async fn show() -> Json<CatalogResponse> {
    let prices = catalog::list_sizes()
        .iter()
        .flat_map(|size| {
            catalog::list_papers().iter().map(move |paper| PriceEntry {
                size: &size.id,
                paper: &paper.id,
                price: catalog::price(size, paper),
            })
        })
        .collect();

    Json(CatalogResponse {
        sizes: catalog::list_sizes(),
        papers: catalog::list_papers(),
        prices,
        default_size: catalog::DEFAULT_SIZE_ID,
        default_paper: catalog::DEFAULT_PAPER_ID,
        quantity_choices: catalog::QUANTITY_CHOICES.collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_price_matrix_covers_every_combination() {
        let Json(response) = show().await;
        assert_eq!(response.prices.len(), 9);
        assert!(
            response
                .prices
                .iter()
                .any(|p| p.size == "small" && p.paper == "metallic" && p.price.amount() == 111)
        );
        assert_eq!(response.quantity_choices, vec![1, 2, 3, 4, 5]);
        assert_eq!(response.default_size, "medium");
    }
}
