//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                 - Health check
//!
//! # Catalog & products
//! GET  /api/catalog            - Sizes, papers, price matrix, defaults
//! GET  /api/products/{*key}    - Product detail derived from an image key
//!
//! # Cart (JSON, mutations raise HX-Trigger: cart-updated)
//! GET  /cart                   - Cart page, with a notice after a failed checkout
//! GET  /api/cart               - Current cart
//! GET  /api/cart/count         - Cart count badge
//! POST /api/cart/add           - Add a configured print
//! POST /api/cart/update        - Set a line's quantity (<= 0 removes)
//! POST /api/cart/remove        - Remove a line
//! POST /api/cart/clear         - Empty the cart
//!
//! # Checkout (rate limited)
//! POST /api/checkout           - Create a Stripe checkout session
//! GET  /checkout               - Same, answered with a redirect
//! GET  /success                - Confirm payment and clear the cart
//!
//! # Stripe
//! POST /api/webhook            - Signed Stripe events
//! ```

pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod products;
pub mod webhook;

use axum::{
    Router,
    routing::{get, post},
};

use crate::middleware::checkout_rate_limiter;
use crate::state::AppState;

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/count", get(cart::count))
        .route("/add", post(cart::add))
        .route("/update", post(cart::update))
        .route("/remove", post(cart::remove))
        .route("/clear", post(cart::clear))
}

/// Create the checkout routes router.
pub fn checkout_routes() -> Router<AppState> {
    Router::new()
        .route("/api/checkout", post(checkout::create))
        .route("/checkout", get(checkout::redirect))
        .layer(checkout_rate_limiter())
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/catalog", get(catalog::show))
        .route("/api/products/{*key}", get(products::show))
        .route("/cart", get(cart::page))
        .nest("/api/cart", cart_routes())
        .merge(checkout_routes())
        .route("/success", get(checkout::success))
        .route("/api/webhook", post(webhook::receive))
}
