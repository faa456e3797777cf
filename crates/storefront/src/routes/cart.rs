//! Cart route handlers.
//!
//! The cart lives in the visitor's session. Mutating routes answer with the
//! full cart and an `HX-Trigger: cart-updated` header so badges and
//! summaries elsewhere on the page refresh themselves.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use axum::{
    Form, Json,
    extract::{Query, State},
    http::HeaderValue,
    response::{IntoResponse, Response},
};
use print_shop_core::cart::{Cart, CartStore, MemoryStorage, NewCartItem};
use print_shop_core::product::Product;
use print_shop_core::{CartItemKey, Quantity, catalog};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::instrument;

use super::products::validate_key;
use crate::error::{AppError, Result, add_breadcrumb};
use crate::services::SessionCart;
use crate::state::AppState;

/// Header carrying client-side events for HTMX.
pub const HX_TRIGGER: &str = "hx-trigger";

/// Event name raised after every cart mutation.
pub const CART_UPDATED_EVENT: &str = "cart-updated";

/// Error code the checkout redirect puts on the cart page URL.
pub const CHECKOUT_FAILED: &str = "checkout_failed";

/// Form data for adding to cart.
#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    pub product_key: String,
    pub size: Option<String>,
    pub paper: Option<String>,
    pub quantity: Option<i64>,
}

/// Form data for updating a line's quantity.
#[derive(Debug, Deserialize)]
pub struct UpdateCartForm {
    pub key: String,
    pub quantity: i64,
}

/// Form data for removing a line.
#[derive(Debug, Deserialize)]
pub struct RemoveFromCartForm {
    pub key: String,
}

/// Cart badge data.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartCount {
    pub item_count: u64,
}

/// Query string on the cart page.
#[derive(Debug, Default, Deserialize)]
pub struct CartPageQuery {
    pub error: Option<String>,
}

/// Message shown above the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartNotice {
    pub code: &'static str,
    pub message: &'static str,
    pub retryable: bool,
}

impl CartNotice {
    /// Notice for a known error code; unknown codes are ignored.
    #[must_use]
    pub fn from_code(code: &str) -> Option<Self> {
        (code == CHECKOUT_FAILED).then_some(Self {
            code: CHECKOUT_FAILED,
            message: "We couldn't start checkout. Your cart is unchanged, please try again.",
            retryable: true,
        })
    }
}

/// Cart page data: the cart plus any notice to show with it.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartPage {
    #[serde(flatten)]
    pub cart: Cart,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<CartNotice>,
}

/// Cart page, where checkout redirects and Stripe's cancel link land.
///
/// `GET /cart?error=...`
#[instrument(skip(session))]
pub async fn page(session: Session, Query(query): Query<CartPageQuery>) -> Result<Json<CartPage>> {
    let mut cart = SessionCart::open(session).await?;
    Ok(Json(CartPage {
        cart: cart.read(),
        notice: query.error.as_deref().and_then(CartNotice::from_code),
    }))
}

/// Current cart.
///
/// `GET /api/cart`
#[instrument(skip(session))]
pub async fn show(session: Session) -> Result<Json<Cart>> {
    let mut cart = SessionCart::open(session).await?;
    Ok(Json(cart.read()))
}

/// Total quantity across all lines.
///
/// `GET /api/cart/count`
#[instrument(skip(session))]
pub async fn count(session: Session) -> Result<Json<CartCount>> {
    let mut cart = SessionCart::open(session).await?;
    Ok(Json(CartCount {
        item_count: cart.read().item_count(),
    }))
}

/// Add a configured print.
///
/// Title and image are derived from the product key, never taken from the
/// client. Size and paper default to the product page preselection.
///
/// `POST /api/cart/add`
#[instrument(skip(state, session))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<AddToCartForm>,
) -> Result<Response> {
    let key = validate_key(&form.product_key)?;
    let size_id = form.size.as_deref().unwrap_or(catalog::DEFAULT_SIZE_ID);
    let paper_id = form.paper.as_deref().unwrap_or(catalog::DEFAULT_PAPER_ID);

    let size = catalog::size(size_id)
        .ok_or_else(|| AppError::BadRequest(format!("Unknown print size: {size_id}")))?;
    let paper = catalog::paper(paper_id)
        .ok_or_else(|| AppError::BadRequest(format!("Unknown paper type: {paper_id}")))?;
    let quantity = Quantity::new(form.quantity.unwrap_or(1))?;

    let product = Product::from_key(key, state.image_base());
    let selection = NewCartItem {
        product_id: product.id,
        title: product.title,
        image_url: product.image_url,
        size: size.clone(),
        paper: paper.clone(),
        quantity,
    };

    add_breadcrumb(
        "cart",
        "Added item",
        Some(&[("item", selection.key().as_str())]),
    );

    mutate(session, |store| store.add(selection)).await
}

/// Set a line's quantity; zero or less removes it.
///
/// `POST /api/cart/update`
#[instrument(skip(session))]
pub async fn update(session: Session, Form(form): Form<UpdateCartForm>) -> Result<Response> {
    let key = CartItemKey::new(form.key);
    mutate(session, |store| store.set_quantity(&key, form.quantity)).await
}

/// Remove a line.
///
/// `POST /api/cart/remove`
#[instrument(skip(session))]
pub async fn remove(session: Session, Form(form): Form<RemoveFromCartForm>) -> Result<Response> {
    let key = CartItemKey::new(form.key);
    mutate(session, |store| store.remove(&key)).await
}

/// Empty the cart.
///
/// `POST /api/cart/clear`
#[instrument(skip(session))]
pub async fn clear(session: Session) -> Result<Response> {
    mutate(session, CartStore::clear).await
}

/// Run one store mutation against the session cart and build the response.
///
/// The `HX-Trigger` header is set by an observer, so it reflects exactly the
/// notifications the store emitted.
async fn mutate<F>(session: Session, op: F) -> Result<Response>
where
    F: FnOnce(&mut CartStore<MemoryStorage>) -> Cart,
{
    let mut cart = SessionCart::open(session).await?;

    let changed = Arc::new(AtomicBool::new(false));
    let subscription = {
        let changed = Arc::clone(&changed);
        cart.subscribe(move |_| changed.store(true, Ordering::Relaxed))
    };

    let store: &mut CartStore<MemoryStorage> = &mut cart;
    let updated = op(store);
    subscription.unsubscribe();
    cart.commit().await?;

    let mut response = Json(updated).into_response();
    if changed.load(Ordering::Relaxed) {
        response
            .headers_mut()
            .insert(HX_TRIGGER, HeaderValue::from_static(CART_UPDATED_EVENT));
    }
    Ok(response)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_cart_notice_from_code() {
        let notice = CartNotice::from_code(CHECKOUT_FAILED).unwrap();
        assert!(notice.retryable);
        assert_eq!(notice.code, "checkout_failed");

        assert_eq!(CartNotice::from_code("anything_else"), None);
        assert_eq!(CartNotice::from_code(""), None);
    }
}
