//! Stripe Checkout integration.
//!
//! # Architecture
//!
//! - Plain REST calls over `reqwest` (form-encoded requests, JSON responses)
//! - Stripe hosts the payment page; the storefront only creates sessions,
//!   retrieves them to confirm payment, and verifies webhook signatures
//! - No order data is stored locally
//!
//! # Example
//!
//! ```rust,ignore
//! use print_shop_storefront::stripe::{CheckoutRequest, StripeClient};
//!
//! let client = StripeClient::new(&config.stripe)?;
//! let request = CheckoutRequest::new(cart.items(), &config.base_url, &config.checkout.allowed_countries);
//! let session = client.create_checkout_session(&request).await?;
//! // redirect the visitor to session.url
//! ```

mod client;
pub mod types;
pub mod webhook;

pub use client::StripeClient;
pub use types::*;
pub use webhook::{WebhookError, WebhookEvent};

use thiserror::Error;

/// Errors that can occur when calling the Stripe API.
#[derive(Debug, Error)]
pub enum StripeError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Stripe rejected the request.
    #[error("Stripe API error ({status}): {message}")]
    Api {
        /// HTTP status returned by Stripe.
        status: u16,
        /// Error message from the response body.
        message: String,
    },

    /// Rate limited by Stripe.
    #[error("Rate limited by Stripe")]
    RateLimited,

    /// A created session came back without a hosted payment URL.
    #[error("checkout session {0} has no redirect URL")]
    MissingRedirect(String),

    /// Secret key cannot be sent as a header value.
    #[error("Stripe secret key has an invalid format")]
    InvalidKey,

    /// Session id contains characters Stripe never issues.
    #[error("invalid checkout session id: {0:?}")]
    InvalidSessionId(String),
}
