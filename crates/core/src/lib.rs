//! Print Shop Core - catalog, pricing, and cart state.
//!
//! This crate is shared by the storefront server and the CLI:
//! - `storefront` - HTTP API, checkout, and payment confirmation
//! - `cli` - catalog listing and a file-backed local cart
//!
//! # Architecture
//!
//! The core crate performs no network I/O. The only side effects are the
//! cart's persistence slot (see [`cart::CartStorage`]) and synchronous
//! observer callbacks.
//!
//! # Modules
//!
//! - [`catalog`] - Fixed print sizes, paper types, and line pricing
//! - [`cart`] - Cart aggregate, store, persistence schema, and observers
//! - [`product`] - Product details derived from image keys
//! - [`types`] - Newtype wrappers for keys, prices, and quantities

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod catalog;
pub mod product;
pub mod types;

pub use types::*;
