//! Integration tests for the print shop.
//!
//! Each test starts its own storefront on an ephemeral port, wired to an
//! in-process fake of the Stripe Checkout endpoints, and drives it over HTTP
//! with a cookie-keeping client.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p print-shop-integration-tests
//! ```

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::missing_panics_doc)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    Form, Json, Router,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use parking_lot::Mutex;
use print_shop_storefront::config::{CheckoutConfig, StorefrontConfig, StripeConfig};
use print_shop_storefront::state::AppState;
use reqwest::Client;
use secrecy::SecretString;
use serde_json::json;

/// Stripe secret key the storefront is configured with.
pub const STRIPE_SECRET_KEY: &str = "sk_test_51HqLyjWDarjtT1zdp7dc";

/// Webhook signing secret the storefront is configured with.
pub const WEBHOOK_SECRET: &str = "whsec_9fJ2kLmN4pQ7rS1tU3vW";

/// Public image host the storefront is configured with.
pub const IMAGE_BASE: &str = "https://img.example.com";

/// A running storefront plus the fake Stripe behind it.
pub struct TestContext {
    pub client: Client,
    pub base_url: String,
    pub stripe: FakeStripe,
}

impl TestContext {
    /// Start a storefront and a fake Stripe on ephemeral ports.
    pub async fn new() -> Self {
        let stripe = FakeStripe::start().await;

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind storefront listener");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{addr}");

        let config = StorefrontConfig {
            host: addr.ip(),
            port: addr.port(),
            base_url: base_url.clone(),
            stripe: StripeConfig {
                api_base: stripe.base_url.clone(),
                secret_key: SecretString::from(STRIPE_SECRET_KEY),
                webhook_secret: SecretString::from(WEBHOOK_SECRET),
            },
            checkout: CheckoutConfig::default(),
            image_public_url: Some(IMAGE_BASE.to_string()),
            sentry_dsn: None,
            sentry_environment: None,
        };

        let state = AppState::new(config).expect("Failed to build application state");
        let app = print_shop_storefront::app(state);
        tokio::spawn(async move {
            axum::serve(
                listener,
                app.into_make_service_with_connect_info::<SocketAddr>(),
            )
            .await
            .unwrap();
        });

        Self {
            client: Self::client(),
            base_url,
            stripe,
        }
    }

    /// A fresh visitor with its own cookie jar.
    pub fn client() -> Client {
        Client::builder()
            .cookie_store(true)
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .expect("Failed to create HTTP client")
    }

    /// Absolute URL for a storefront path.
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Add a print to this context's cart and return the cart JSON.
    pub async fn add_to_cart(
        &self,
        product_key: &str,
        size: &str,
        paper: &str,
        quantity: i64,
    ) -> serde_json::Value {
        let quantity = quantity.to_string();
        let resp = self
            .client
            .post(self.url("/api/cart/add"))
            .form(&[
                ("product_key", product_key),
                ("size", size),
                ("paper", paper),
                ("quantity", quantity.as_str()),
            ])
            .send()
            .await
            .expect("Failed to add to cart");
        assert_eq!(resp.status(), StatusCode::OK);
        resp.json().await.unwrap()
    }

    /// Fetch the current cart JSON.
    pub async fn cart(&self) -> serde_json::Value {
        self.client
            .get(self.url("/api/cart"))
            .send()
            .await
            .expect("Failed to get cart")
            .json()
            .await
            .unwrap()
    }
}

/// In-process fake of `POST/GET /v1/checkout/sessions`.
#[derive(Clone)]
pub struct FakeStripe {
    pub base_url: String,
    inner: Arc<Mutex<FakeStripeState>>,
}

#[derive(Default)]
struct FakeStripeState {
    created: Vec<Vec<(String, String)>>,
    statuses: HashMap<String, String>,
    fail_next_create: bool,
}

impl FakeStripe {
    async fn start() -> Self {
        let inner = Arc::new(Mutex::new(FakeStripeState::default()));

        let app = Router::new()
            .route("/v1/checkout/sessions", post(create_session))
            .route("/v1/checkout/sessions/{id}", get(retrieve_session))
            .with_state(Arc::clone(&inner));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind fake Stripe listener");
        let base_url = format!("http://{}", listener.local_addr().unwrap());
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { base_url, inner }
    }

    /// Form bodies of every session created so far.
    pub fn created_sessions(&self) -> Vec<Vec<(String, String)>> {
        self.inner.lock().created.clone()
    }

    /// Set the `payment_status` reported for a session.
    pub fn set_payment_status(&self, session_id: &str, status: &str) {
        self.inner
            .lock()
            .statuses
            .insert(session_id.to_string(), status.to_string());
    }

    /// Make the next session creation fail with a Stripe API error.
    pub fn fail_next_create(&self) {
        self.inner.lock().fail_next_create = true;
    }
}

/// Value of the first form field named `key`.
pub fn form_value<'a>(params: &'a [(String, String)], key: &str) -> Option<&'a str> {
    params
        .iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.as_str())
}

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == format!("Bearer {STRIPE_SECRET_KEY}"))
}

async fn create_session(
    State(state): State<Arc<Mutex<FakeStripeState>>>,
    headers: HeaderMap,
    Form(params): Form<Vec<(String, String)>>,
) -> Response {
    if !authorized(&headers) {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({"error": {"message": "Invalid API Key provided", "type": "invalid_request_error"}})),
        )
            .into_response();
    }

    let mut state = state.lock();
    if std::mem::take(&mut state.fail_next_create) {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": {"message": "Invalid currency", "type": "invalid_request_error"}})),
        )
            .into_response();
    }

    state.created.push(params);
    let id = format!("cs_test_{}", state.created.len());
    state.statuses.insert(id.clone(), "unpaid".to_string());

    Json(json!({
        "id": id,
        "url": format!("https://checkout.stripe.test/pay/{id}"),
        "payment_status": "unpaid",
        "amount_total": null,
        "customer_details": null,
    }))
    .into_response()
}

async fn retrieve_session(
    State(state): State<Arc<Mutex<FakeStripeState>>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    if !authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }

    let status = state.lock().statuses.get(&id).cloned();
    match status {
        Some(status) => Json(json!({
            "id": id,
            "url": null,
            "payment_status": status,
            "amount_total": 16300,
            "customer_details": {"email": "buyer@example.com", "name": "Ada"},
        }))
        .into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({"error": {"message": format!("No such checkout.session: '{id}'")}})),
        )
            .into_response(),
    }
}
