//! Stripe webhook handler.

use axum::{Json, extract::State, http::HeaderMap};
use secrecy::ExposeSecret;
use serde_json::{Value, json};
use tracing::{info, instrument, warn};

use crate::error::Result;
use crate::state::AppState;
use crate::stripe::webhook::{self, SIGNATURE_HEADER};
use crate::stripe::{PaymentStatus, WebhookEvent};

/// Receive a Stripe event.
///
/// Orders are not stored locally; settled checkouts are logged for
/// fulfillment.
///
/// `POST /api/webhook`
#[instrument(skip_all)]
pub async fn receive(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: String,
) -> Result<Json<Value>> {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok());

    let event = webhook::construct_event(
        &body,
        signature,
        state.config().stripe.webhook_secret.expose_secret(),
    )
    .inspect_err(|e| warn!(error = %e, "webhook verification failed"))?;

    match event {
        WebhookEvent::CheckoutCompleted(session) => {
            let email = session
                .customer_details
                .as_ref()
                .and_then(|d| d.email.as_deref());
            info!(
                session_id = %session.id,
                customer_email = ?email,
                amount_total = ?session.amount_total,
                payment_status = ?session.payment_status,
                "checkout session completed"
            );
            if session.payment_status == PaymentStatus::Paid {
                let name = session
                    .customer_details
                    .as_ref()
                    .and_then(|d| d.name.as_deref());
                info!(session_id = %session.id, customer_name = ?name, "Order confirmed");
            }
        }
        WebhookEvent::PaymentSucceeded(intent) => {
            info!(payment_intent = %intent.id, "payment intent succeeded");
        }
        WebhookEvent::PaymentFailed(intent) => {
            warn!(payment_intent = %intent.id, "payment intent failed");
        }
        WebhookEvent::Unhandled(event_type) => {
            info!(%event_type, "unhandled webhook event");
        }
    }

    Ok(Json(json!({ "received": true })))
}
