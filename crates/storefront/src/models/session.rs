//! Session-related types.
//!
//! The visitor's cart and pending checkout live in the session rather than
//! in a database.

/// Session keys for storefront data.
pub mod keys {
    /// Key for the persisted cart document (the same JSON the cart store
    /// writes to any other storage slot).
    pub const CART: &str = "cart";

    /// Key for the id of the most recently created Stripe checkout session.
    pub const PENDING_CHECKOUT: &str = "pending_checkout";
}
