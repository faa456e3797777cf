//! Cart state, persistence, and change notification.
//!
//! [`CartStore`] owns one [`Cart`] and the persistence slot it lives in.
//! Every mutation follows the same sequence:
//!
//! 1. compute the new cart (totals are always re-derived from the items)
//! 2. write it to the slot
//! 3. notify every registered observer with the full cart
//!
//! # Example
//!
//! ```
//! use print_shop_core::cart::{CartStore, MemoryStorage, NewCartItem};
//! use print_shop_core::{catalog, ProductKey, Quantity};
//!
//! let mut store = CartStore::new(MemoryStorage::new());
//! let badge = store.subscribe(|cart| assert!(cart.item_count() > 0));
//!
//! let cart = store.add(NewCartItem {
//!     product_id: ProductKey::new("cliff-01"),
//!     title: "Cliff".to_string(),
//!     image_url: "https://img.example.com/cliff-01.jpg".to_string(),
//!     size: catalog::size("small").unwrap().clone(),
//!     paper: catalog::paper("standard").unwrap().clone(),
//!     quantity: Quantity::ONE,
//! });
//! assert_eq!(cart.total().amount(), 85);
//! badge.unsubscribe();
//! ```

mod observers;
pub mod schema;
mod storage;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::catalog::{self, PaperType, PrintSize};
use crate::types::{CartItemKey, Price, ProductKey, Quantity};

use observers::Observers;
pub use observers::Subscription;
pub use schema::SchemaError;
pub use storage::{CartStorage, FileStorage, FileStorageError, MemoryStorage};

/// Name of the persistence slot the cart is stored under.
pub const CART_STORAGE_KEY: &str = "print-shop-cart";

/// One configured print in the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    /// Composite key: `{product_id}-{size.id}-{paper.id}`.
    pub id: CartItemKey,
    pub product_id: ProductKey,
    pub title: String,
    pub image_url: String,
    /// Size as it was when the line was created.
    pub size: PrintSize,
    /// Paper as it was when the line was created.
    pub paper: PaperType,
    pub quantity: u32,
    /// Unit price at the time the line was created. Never recomputed.
    pub price: Price,
}

impl CartItem {
    /// `price × quantity`.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.price * self.quantity
    }
}

/// A selection to add to the cart.
#[derive(Debug, Clone)]
pub struct NewCartItem {
    pub product_id: ProductKey,
    pub title: String,
    pub image_url: String,
    pub size: PrintSize,
    pub paper: PaperType,
    pub quantity: Quantity,
}

impl NewCartItem {
    /// Key of the line this selection merges into.
    #[must_use]
    pub fn key(&self) -> CartItemKey {
        CartItemKey::compose(&self.product_id, &self.size.id, &self.paper.id)
    }
}

/// The cart aggregate.
///
/// `total` and `item_count` are derived from the items on construction and
/// cannot be set independently.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    items: Vec<CartItem>,
    total: Price,
    item_count: u64,
}

impl Cart {
    /// An empty cart.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    fn from_items(items: Vec<CartItem>) -> Self {
        let total = items.iter().map(CartItem::line_total).sum();
        let item_count = items.iter().map(|item| u64::from(item.quantity)).sum();
        Self {
            items,
            total,
            item_count,
        }
    }

    /// Line items in insertion order.
    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// Sum of `price × quantity` over all lines.
    #[must_use]
    pub const fn total(&self) -> Price {
        self.total
    }

    /// Sum of quantities over all lines.
    #[must_use]
    pub const fn item_count(&self) -> u64 {
        self.item_count
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Find a line by key.
    #[must_use]
    pub fn get(&self, key: &CartItemKey) -> Option<&CartItem> {
        self.items.iter().find(|item| &item.id == key)
    }

    /// Consume the cart and return its lines.
    #[must_use]
    pub fn into_items(self) -> Vec<CartItem> {
        self.items
    }
}

/// Owner of the cart state for one visitor.
///
/// The cart is loaded from the slot on first use. A missing, unreadable, or
/// invalid slot yields an empty cart; that fallback is logged, never returned
/// as an error.
pub struct CartStore<S> {
    storage: S,
    slot: String,
    cart: Option<Cart>,
    observers: Observers,
}

impl<S: CartStorage> CartStore<S> {
    /// Create a store persisted under [`CART_STORAGE_KEY`].
    pub fn new(storage: S) -> Self {
        Self::with_slot(storage, CART_STORAGE_KEY)
    }

    /// Create a store persisted under a custom slot name.
    pub fn with_slot(storage: S, slot: impl Into<String>) -> Self {
        Self {
            storage,
            slot: slot.into(),
            cart: None,
            observers: Observers::default(),
        }
    }

    /// Current cart. Never writes to the slot and never notifies.
    pub fn read(&mut self) -> Cart {
        self.current().clone()
    }

    /// Add a selection, merging into an existing line with the same key.
    ///
    /// A merge increments the quantity and keeps the line's original price.
    /// A new line is priced from the catalog.
    pub fn add(&mut self, selection: NewCartItem) -> Cart {
        let key = selection.key();
        let mut items = self.current().items.clone();

        if let Some(existing) = items.iter_mut().find(|item| item.id == key) {
            existing.quantity = existing.quantity.saturating_add(selection.quantity.get());
            debug!(item = %key, quantity = existing.quantity, "merged cart line");
        } else {
            let price = catalog::price(&selection.size, &selection.paper);
            debug!(item = %key, %price, "added cart line");
            items.push(CartItem {
                id: key,
                product_id: selection.product_id,
                title: selection.title,
                image_url: selection.image_url,
                size: selection.size,
                paper: selection.paper,
                quantity: selection.quantity.get(),
                price,
            });
        }

        self.commit(Cart::from_items(items))
    }

    /// Set a line's quantity. Zero or negative removes the line.
    ///
    /// An unknown key leaves the items unchanged but still persists and
    /// notifies.
    pub fn set_quantity(&mut self, key: &CartItemKey, quantity: i64) -> Cart {
        let mut items = self.current().items.clone();

        if quantity <= 0 {
            items.retain(|item| &item.id != key);
        } else if let Some(item) = items.iter_mut().find(|item| &item.id == key) {
            item.quantity = u32::try_from(quantity).unwrap_or(u32::MAX);
        }

        self.commit(Cart::from_items(items))
    }

    /// Remove a line. An unknown key still persists and notifies.
    pub fn remove(&mut self, key: &CartItemKey) -> Cart {
        let mut items = self.current().items.clone();
        items.retain(|item| &item.id != key);
        self.commit(Cart::from_items(items))
    }

    /// Reset to the empty cart.
    pub fn clear(&mut self) -> Cart {
        self.commit(Cart::empty())
    }

    /// Register an observer called with the full cart after every mutation.
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&Cart) + Send + Sync + 'static,
    {
        self.observers.subscribe(callback)
    }

    /// Borrow the backing storage.
    pub const fn storage(&self) -> &S {
        &self.storage
    }

    /// Give up the store and return the backing storage.
    pub fn into_storage(self) -> S {
        self.storage
    }

    fn current(&mut self) -> &Cart {
        if self.cart.is_none() {
            self.cart = Some(self.load());
        }
        self.cart.get_or_insert_with(Cart::empty)
    }

    fn load(&self) -> Cart {
        match self.storage.get_item(&self.slot) {
            Ok(Some(raw)) => schema::decode(&raw).unwrap_or_else(|e| {
                warn!(slot = %self.slot, error = %e, "discarding malformed persisted cart");
                Cart::empty()
            }),
            Ok(None) => Cart::empty(),
            Err(e) => {
                warn!(slot = %self.slot, error = %e, "failed to read persisted cart");
                Cart::empty()
            }
        }
    }

    fn commit(&mut self, cart: Cart) -> Cart {
        match schema::encode(&cart) {
            Ok(raw) => {
                if let Err(e) = self.storage.set_item(&self.slot, raw) {
                    warn!(slot = %self.slot, error = %e, "failed to persist cart");
                }
            }
            Err(e) => warn!(slot = %self.slot, error = %e, "failed to serialize cart"),
        }

        self.cart = Some(cart.clone());
        self.observers.notify(&cart);
        cart
    }
}

impl<S: std::fmt::Debug> std::fmt::Debug for CartStore<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartStore")
            .field("storage", &self.storage)
            .field("slot", &self.slot)
            .field("cart", &self.cart)
            .field("observers", &self.observers.len())
            .finish()
    }
}
