//! Newtype keys for type-safe references.
//!
//! Use the `define_key!` macro to create string key wrappers that prevent
//! accidentally mixing a product key with a cart line key.

/// Macro to define a type-safe string key wrapper.
///
/// Creates a newtype wrapper around `String` with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `PartialEq`, `Eq`, `Hash`, `PartialOrd`, `Ord`
/// - Conversion methods: `new()`, `as_str()`, `into_inner()`
/// - `From<String>`, `From<&str>`, `AsRef<str>`, and `Display`
///
/// # Example
///
/// ```rust
/// # use print_shop_core::define_key;
/// define_key!(OrderRef);
///
/// let order = OrderRef::new("cs_test_123");
/// assert_eq!(order.as_str(), "cs_test_123");
/// ```
#[macro_export]
macro_rules! define_key {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            PartialEq,
            Eq,
            Hash,
            PartialOrd,
            Ord,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new key from any string-like value.
            #[must_use]
            pub fn new(key: impl Into<String>) -> Self {
                Self(key.into())
            }

            /// Borrow the key as a string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume the key and return the inner string.
            #[must_use]
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<String> for $name {
            fn from(key: String) -> Self {
                Self(key)
            }
        }

        impl From<&str> for $name {
            fn from(key: &str) -> Self {
                Self(key.to_owned())
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

// A product is identified by the object-storage key of its image.
define_key!(ProductKey);
// A cart line is identified by `{product}-{size}-{paper}`.
define_key!(CartItemKey);

impl CartItemKey {
    /// Build the composite line key for a product configuration.
    ///
    /// ```
    /// use print_shop_core::{CartItemKey, ProductKey};
    ///
    /// let key = CartItemKey::compose(&ProductKey::new("cliff-01"), "small", "standard");
    /// assert_eq!(key.as_str(), "cliff-01-small-standard");
    /// ```
    #[must_use]
    pub fn compose(product: &ProductKey, size_id: &str, paper_id: &str) -> Self {
        Self(format!("{product}-{size_id}-{paper_id}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compose_is_deterministic() {
        let product = ProductKey::new("prints/coast/Cliff_01.jpg");
        let a = CartItemKey::compose(&product, "medium", "metallic");
        let b = CartItemKey::compose(&product, "medium", "metallic");
        assert_eq!(a, b);
        assert_eq!(a.as_str(), "prints/coast/Cliff_01.jpg-medium-metallic");
    }

    #[test]
    fn test_compose_distinguishes_configurations() {
        let product = ProductKey::new("p1");
        assert_ne!(
            CartItemKey::compose(&product, "small", "standard"),
            CartItemKey::compose(&product, "small", "canvas")
        );
    }
}
