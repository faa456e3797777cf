//! Cart store backed by the visitor's session.
//!
//! The session holds the same versioned JSON document the cart store writes
//! to any other slot. A request opens the cart, mutates it through the
//! ordinary [`CartStore`] operations, and commits the slot back.

use std::ops::{Deref, DerefMut};

use print_shop_core::cart::{CART_STORAGE_KEY, CartStore, MemoryStorage};
use tower_sessions::Session;
use tracing::instrument;

use crate::error::Result;
use crate::models::session_keys;

/// A request-scoped cart store over the session.
pub struct SessionCart {
    session: Session,
    loaded: Option<String>,
    store: CartStore<MemoryStorage>,
}

impl SessionCart {
    /// Load the cart slot from the session.
    ///
    /// # Errors
    ///
    /// Returns error if the session store fails. A malformed slot is not an
    /// error; the store falls back to an empty cart.
    #[instrument(skip_all)]
    pub async fn open(session: Session) -> Result<Self> {
        let raw: Option<String> = session.get(session_keys::CART).await?;
        let storage = raw.clone().map_or_else(MemoryStorage::new, |raw| {
            MemoryStorage::with_item(CART_STORAGE_KEY, raw)
        });

        Ok(Self {
            session,
            loaded: raw,
            store: CartStore::new(storage),
        })
    }

    /// The underlying session.
    #[must_use]
    pub const fn session(&self) -> &Session {
        &self.session
    }

    /// Write the cart slot back to the session.
    ///
    /// Nothing is written when the slot is unchanged.
    ///
    /// # Errors
    ///
    /// Returns error if the session store fails.
    #[instrument(skip_all)]
    pub async fn commit(self) -> Result<()> {
        let Self {
            session,
            loaded,
            store,
        } = self;
        let mut storage = store.into_storage();

        match storage.take_item(CART_STORAGE_KEY) {
            Some(raw) if loaded.as_deref() != Some(raw.as_str()) => {
                session.insert(session_keys::CART, raw).await?;
            }
            _ => {}
        }
        Ok(())
    }
}

impl Deref for SessionCart {
    type Target = CartStore<MemoryStorage>;

    fn deref(&self) -> &Self::Target {
        &self.store
    }
}

impl DerefMut for SessionCart {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.store
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use print_shop_core::cart::NewCartItem;
    use print_shop_core::{ProductKey, Quantity, catalog};
    use tower_sessions::MemoryStore;

    use super::*;

    fn selection() -> NewCartItem {
        NewCartItem {
            product_id: ProductKey::new("prints/Dune_2.jpg"),
            title: "Dune".to_string(),
            image_url: "/placeholder-image.svg".to_string(),
            size: catalog::default_size().clone(),
            paper: catalog::default_paper().clone(),
            quantity: Quantity::ONE,
        }
    }

    #[tokio::test]
    async fn test_commit_round_trips_through_session() {
        let session = Session::new(None, Arc::new(MemoryStore::default()), None);

        let mut cart = SessionCart::open(session.clone()).await.unwrap();
        cart.add(selection());
        cart.add(selection());
        cart.commit().await.unwrap();

        let mut reopened = SessionCart::open(session).await.unwrap();
        let current = reopened.read();
        assert_eq!(current.item_count(), 2);
        assert_eq!(current.total().amount(), 250);
    }

    #[tokio::test]
    async fn test_read_only_request_writes_nothing() {
        let session = Session::new(None, Arc::new(MemoryStore::default()), None);

        let mut cart = SessionCart::open(session.clone()).await.unwrap();
        assert!(cart.read().is_empty());
        cart.commit().await.unwrap();

        let stored: Option<String> = session.get(session_keys::CART).await.unwrap();
        assert!(stored.is_none());
    }

    #[tokio::test]
    async fn test_malformed_slot_reads_as_empty() {
        let session = Session::new(None, Arc::new(MemoryStore::default()), None);
        session
            .insert(session_keys::CART, "{not json".to_string())
            .await
            .unwrap();

        let mut cart = SessionCart::open(session).await.unwrap();
        assert!(cart.read().is_empty());
    }
}
