//! Storefront services.

pub mod session_cart;

pub use session_cart::SessionCart;
