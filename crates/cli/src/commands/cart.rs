//! Local cart commands.
//!
//! The cart is kept in `<data-dir>/print-shop-cart.json`, the same versioned
//! document the storefront keeps in its sessions.

use std::fmt::Write;
use std::path::PathBuf;

use print_shop_core::cart::{Cart, CartStore, FileStorage, NewCartItem, Subscription};
use print_shop_core::product::Product;
use print_shop_core::{CartItemKey, Quantity, catalog};

use super::CommandError;

/// Open the cart stored under `data_dir`.
pub fn open(data_dir: PathBuf) -> CartStore<FileStorage> {
    CartStore::new(FileStorage::new(data_dir))
}

/// Log every cart change until the returned subscription is dropped.
pub fn log_changes(store: &CartStore<FileStorage>) -> Subscription {
    store.subscribe(|cart| {
        tracing::info!(
            lines = cart.items().len(),
            item_count = cart.item_count(),
            total = %cart.total(),
            "cart updated"
        );
    })
}

/// Add a print of `product_key`.
///
/// # Errors
///
/// Returns error if the size or paper is unknown or the quantity is not
/// positive.
pub fn add(
    store: &mut CartStore<FileStorage>,
    product_key: &str,
    size: &str,
    paper: &str,
    quantity: i64,
    image_base: Option<&str>,
) -> Result<Cart, CommandError> {
    let size = catalog::size(size).ok_or_else(|| CommandError::UnknownSize(size.to_owned()))?;
    let paper =
        catalog::paper(paper).ok_or_else(|| CommandError::UnknownPaper(paper.to_owned()))?;
    let quantity = Quantity::new(quantity)?;
    let product = Product::from_key(product_key, image_base);

    Ok(store.add(NewCartItem {
        product_id: product.id,
        title: product.title,
        image_url: product.image_url,
        size: size.clone(),
        paper: paper.clone(),
        quantity,
    }))
}

/// Set a line's quantity; zero or less removes it.
pub fn set(store: &mut CartStore<FileStorage>, item_key: &str, quantity: i64) -> Cart {
    store.set_quantity(&CartItemKey::new(item_key), quantity)
}

/// Remove a line.
pub fn remove(store: &mut CartStore<FileStorage>, item_key: &str) -> Cart {
    store.remove(&CartItemKey::new(item_key))
}

/// Render a cart as plain text.
pub fn render(cart: &Cart) -> String {
    if cart.is_empty() {
        return "Cart is empty".to_string();
    }

    let mut out = String::new();
    for item in cart.items() {
        let _ = writeln!(
            out,
            "{}\n  {} ({}) on {}\n  {} x {} = {}",
            item.id,
            item.size.name,
            item.size.dimensions,
            item.paper.name,
            item.quantity,
            item.price,
            item.line_total()
        );
    }
    let _ = write!(out, "{} items, total {}", cart.item_count(), cart.total());
    out
}
