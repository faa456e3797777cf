//! Stripe REST client.

use std::time::Duration;

use reqwest::StatusCode;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use tracing::{debug, instrument, warn};

use super::types::{ApiErrorBody, CheckoutRequest, CheckoutSession};
use super::StripeError;
use crate::config::StripeConfig;

/// Pinned API version.
const API_VERSION: &str = "2024-06-20";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(20);

/// Client for the Stripe Checkout endpoints.
#[derive(Clone)]
pub struct StripeClient {
    client: reqwest::Client,
    api_base: String,
}

impl std::fmt::Debug for StripeClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StripeClient")
            .field("api_base", &self.api_base)
            .finish_non_exhaustive()
    }
}

impl StripeClient {
    /// Create a new Stripe client.
    ///
    /// # Errors
    ///
    /// Returns error if the secret key is not a valid header value or the
    /// HTTP client fails to build.
    pub fn new(config: &StripeConfig) -> Result<Self, StripeError> {
        let mut headers = HeaderMap::new();

        let mut auth = HeaderValue::from_str(&format!(
            "Bearer {}",
            config.secret_key.expose_secret()
        ))
        .map_err(|_| StripeError::InvalidKey)?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);
        headers.insert("Stripe-Version", HeaderValue::from_static(API_VERSION));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            client,
            api_base: config.api_base.trim_end_matches('/').to_string(),
        })
    }

    /// Create a hosted checkout session for the given cart lines.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails, Stripe rejects it, or the
    /// session comes back without a redirect URL.
    #[instrument(skip(self, request), fields(lines = request.items.len()))]
    pub async fn create_checkout_session(
        &self,
        request: &CheckoutRequest<'_>,
    ) -> Result<CheckoutSession, StripeError> {
        let url = format!("{}/v1/checkout/sessions", self.api_base);
        let response = self
            .client
            .post(&url)
            .form(&request.form_params())
            .send()
            .await?;

        let session: CheckoutSession = Self::parse(response).await?;
        if session.url.is_none() {
            return Err(StripeError::MissingRedirect(session.id));
        }

        debug!(session_id = %session.id, "created checkout session");
        Ok(session)
    }

    /// Fetch a checkout session by id.
    ///
    /// # Errors
    ///
    /// Returns error if the id is malformed, the request fails, or Stripe
    /// rejects it.
    #[instrument(skip(self))]
    pub async fn retrieve_checkout_session(
        &self,
        session_id: &str,
    ) -> Result<CheckoutSession, StripeError> {
        if !is_valid_session_id(session_id) {
            return Err(StripeError::InvalidSessionId(session_id.to_string()));
        }

        let url = format!("{}/v1/checkout/sessions/{session_id}", self.api_base);
        let response = self.client.get(&url).send().await?;
        Self::parse(response).await
    }

    async fn parse(response: reqwest::Response) -> Result<CheckoutSession, StripeError> {
        let status = response.status();

        if status == StatusCode::TOO_MANY_REQUESTS {
            warn!("Stripe rate limit hit");
            return Err(StripeError::RateLimited);
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiErrorBody>(&body)
                .ok()
                .and_then(|b| b.error.message.or(b.error.kind))
                .unwrap_or(body);
            return Err(StripeError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response.json().await?)
    }
}

/// Stripe checkout session ids are `cs_` followed by alphanumerics and
/// underscores.
fn is_valid_session_id(id: &str) -> bool {
    id.starts_with("cs_")
        && id.len() <= 255
        && id.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_id_validation() {
        assert!(is_valid_session_id("cs_test_a1B2c3"));
        assert!(is_valid_session_id("cs_live_XYZ"));
        assert!(!is_valid_session_id("pi_123"));
        assert!(!is_valid_session_id("cs_../../v1/charges"));
        assert!(!is_valid_session_id("cs_test?expand=all"));
        assert!(!is_valid_session_id(""));
    }
}
