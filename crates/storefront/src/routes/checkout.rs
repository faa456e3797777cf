//! Checkout route handlers.
//!
//! Payment happens on Stripe's hosted page. The storefront creates the
//! session, remembers its id, and clears the cart once Stripe reports the
//! session as paid.

use axum::{
    Json,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::{info, instrument, warn};

use super::cart::CHECKOUT_FAILED;
use crate::error::{AppError, Result, add_breadcrumb};
use crate::models::session_keys;
use crate::services::SessionCart;
use crate::state::AppState;
use crate::stripe::{CheckoutRequest, CheckoutSession, PaymentStatus};

/// Cart page served by [`super::cart::page`].
pub const CART_PATH: &str = "/cart";

/// Created checkout session.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutResponse {
    pub session_id: String,
    pub url: String,
}

/// Query string Stripe appends to the success URL.
#[derive(Debug, Deserialize)]
pub struct SuccessQuery {
    pub session_id: Option<String>,
}

/// Outcome of the success callback.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SuccessResponse {
    pub session_id: String,
    /// Whether this request cleared the cart.
    pub cleared: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_status: Option<PaymentStatus>,
}

/// Create a checkout session for the current cart.
///
/// `POST /api/checkout`
#[instrument(skip(state, session))]
pub async fn create(
    State(state): State<AppState>,
    session: Session,
) -> Result<Json<CheckoutResponse>> {
    let checkout = start_checkout(&state, session).await?;
    let url = checkout
        .url
        .ok_or_else(|| AppError::Internal("checkout session without URL".to_string()))?;

    Ok(Json(CheckoutResponse {
        session_id: checkout.id,
        url,
    }))
}

/// Create a checkout session and redirect to Stripe.
///
/// An empty cart sends the visitor back to the cart. A Stripe failure does
/// too, with `?error=checkout_failed` so the cart page can offer a retry.
///
/// `GET /checkout`
#[instrument(skip(state, session))]
pub async fn redirect(State(state): State<AppState>, session: Session) -> Response {
    match start_checkout(&state, session).await {
        Ok(CheckoutSession { url: Some(url), .. }) => Redirect::to(&url).into_response(),
        Ok(_) | Err(AppError::EmptyCart) => Redirect::to(CART_PATH).into_response(),
        Err(e) => {
            tracing::error!("Failed to create checkout session: {e}");
            Redirect::to(&format!("{CART_PATH}?error={CHECKOUT_FAILED}")).into_response()
        }
    }
}

/// Confirm payment after Stripe redirects back.
///
/// Only the checkout this visitor started can clear their cart, and only
/// once: the pending id is forgotten when the cart is cleared.
///
/// `GET /success?session_id=...`
#[instrument(skip(state, session))]
pub async fn success(
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<SuccessQuery>,
) -> Result<Json<SuccessResponse>> {
    let session_id = query
        .session_id
        .filter(|id| !id.is_empty())
        .ok_or_else(|| AppError::BadRequest("Missing session_id".to_string()))?;

    let pending: Option<String> = session.get(session_keys::PENDING_CHECKOUT).await?;
    if pending.as_deref() != Some(session_id.as_str()) {
        return Ok(Json(SuccessResponse {
            session_id,
            cleared: false,
            payment_status: None,
        }));
    }

    let checkout = state
        .stripe()
        .retrieve_checkout_session(&session_id)
        .await?;

    let cleared = if checkout.payment_status.is_settled() {
        let mut cart = SessionCart::open(session.clone()).await?;
        cart.clear();
        cart.commit().await?;
        session
            .remove::<String>(session_keys::PENDING_CHECKOUT)
            .await?;
        info!(session_id = %session_id, "checkout settled, cart cleared");
        true
    } else {
        warn!(
            session_id = %session_id,
            payment_status = ?checkout.payment_status,
            "success callback for unsettled checkout"
        );
        false
    };

    Ok(Json(SuccessResponse {
        session_id,
        cleared,
        payment_status: Some(checkout.payment_status),
    }))
}

async fn start_checkout(state: &AppState, session: Session) -> Result<CheckoutSession> {
    let mut cart = SessionCart::open(session).await?;
    let current = cart.read();
    if current.is_empty() {
        return Err(AppError::EmptyCart);
    }

    let config = state.config();
    let request = CheckoutRequest::new(
        current.items(),
        &config.base_url,
        &config.checkout.allowed_countries,
    );
    let checkout = state.stripe().create_checkout_session(&request).await?;

    cart.session()
        .insert(session_keys::PENDING_CHECKOUT, &checkout.id)
        .await?;

    let total = current.total().to_string();
    add_breadcrumb(
        "checkout",
        "Created checkout session",
        Some(&[("session_id", checkout.id.as_str()), ("total", total.as_str())]),
    );
    info!(session_id = %checkout.id, lines = current.items().len(), "created checkout session");

    Ok(checkout)
}
