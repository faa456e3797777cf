//! Versioned persisted form of the cart.
//!
//! ```json
//! {"schemaVersion":1,"items":[...],"total":255,"itemCount":3}
//! ```
//!
//! Decoding is strict: anything that is not a well-formed version 1 payload
//! whose derived fields agree with its items is rejected, and the store falls
//! back to an empty cart.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{Cart, CartItem};
use crate::types::{CartItemKey, Price};

/// Version written by this build.
pub const SCHEMA_VERSION: u32 = 1;

/// Reasons a persisted cart is rejected.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// Not JSON, or JSON of the wrong shape.
    #[error("cart payload is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Payload has no `schemaVersion` field (pre-versioning format).
    #[error("cart payload has no schemaVersion")]
    MissingVersion,

    /// Payload was written by an incompatible version.
    #[error("unsupported cart schema version {found} (expected {SCHEMA_VERSION})")]
    UnsupportedVersion {
        /// Version found in the payload.
        found: u32,
    },

    /// A line item has a zero quantity.
    #[error("item {key} has a non-positive quantity")]
    NonPositiveQuantity {
        /// Offending line key.
        key: CartItemKey,
    },

    /// A line key does not match its product, size, and paper.
    #[error("item key {key} does not match its configuration")]
    KeyMismatch {
        /// Offending line key.
        key: CartItemKey,
    },

    /// Two lines share a key.
    #[error("duplicate item key {key}")]
    DuplicateKey {
        /// Duplicated line key.
        key: CartItemKey,
    },

    /// Stored `total` or `itemCount` disagree with the items.
    #[error("stored totals do not match items")]
    TotalsMismatch,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PersistedCartRef<'a> {
    schema_version: u32,
    items: &'a [CartItem],
    total: Price,
    item_count: u64,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct VersionHeader {
    schema_version: Option<u32>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct PersistedCart {
    #[allow(dead_code)]
    schema_version: u32,
    items: Vec<CartItem>,
    total: Price,
    item_count: u64,
}

/// Serialize a cart into its persisted form.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn encode(cart: &Cart) -> Result<String, serde_json::Error> {
    serde_json::to_string(&PersistedCartRef {
        schema_version: SCHEMA_VERSION,
        items: cart.items(),
        total: cart.total(),
        item_count: cart.item_count(),
    })
}

/// Parse and validate a persisted cart.
///
/// # Errors
///
/// Returns a [`SchemaError`] describing the first problem found.
pub fn decode(raw: &str) -> Result<Cart, SchemaError> {
    let header: VersionHeader = serde_json::from_str(raw)?;
    match header.schema_version {
        None => return Err(SchemaError::MissingVersion),
        Some(SCHEMA_VERSION) => {}
        Some(found) => return Err(SchemaError::UnsupportedVersion { found }),
    }

    let persisted: PersistedCart = serde_json::from_str(raw)?;

    let mut seen = HashSet::with_capacity(persisted.items.len());
    for item in &persisted.items {
        if item.quantity == 0 {
            return Err(SchemaError::NonPositiveQuantity {
                key: item.id.clone(),
            });
        }
        if item.id != CartItemKey::compose(&item.product_id, &item.size.id, &item.paper.id) {
            return Err(SchemaError::KeyMismatch {
                key: item.id.clone(),
            });
        }
        if !seen.insert(&item.id) {
            return Err(SchemaError::DuplicateKey {
                key: item.id.clone(),
            });
        }
    }

    let cart = Cart::from_items(persisted.items);
    if cart.total() != persisted.total || cart.item_count() != persisted.item_count {
        return Err(SchemaError::TotalsMismatch);
    }

    Ok(cart)
}
