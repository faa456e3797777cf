//! Stripe webhook signature verification and event parsing.
//!
//! Stripe signs each delivery with `Stripe-Signature: t=<unix>,v1=<hex>`,
//! where `v1` is HMAC-SHA256 over `"{t}.{raw body}"` keyed by the endpoint's
//! signing secret.

use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::Sha256;
use thiserror::Error;
use tracing::{debug, instrument};

use super::types::{CheckoutSession, PaymentIntent};

/// Name of the header carrying the signature.
pub const SIGNATURE_HEADER: &str = "stripe-signature";

/// Maximum age of a signed delivery, in seconds.
pub const TOLERANCE_SECS: i64 = 300;

/// Errors from verifying or parsing a webhook delivery.
#[derive(Debug, Error)]
pub enum WebhookError {
    #[error("No signature provided")]
    MissingSignature,

    #[error("Malformed signature header: {0}")]
    MalformedHeader(&'static str),

    #[error("Webhook timestamp outside tolerance")]
    Expired,

    #[error("Signature mismatch")]
    SignatureMismatch,

    #[error("Invalid signing secret")]
    InvalidSecret,

    #[error("Invalid event payload: {0}")]
    Payload(#[from] serde_json::Error),
}

/// Raw event envelope.
#[derive(Debug, Deserialize)]
pub struct Event {
    pub id: String,
    #[serde(rename = "type")]
    pub event_type: String,
    pub data: EventData,
}

#[derive(Debug, Deserialize)]
pub struct EventData {
    pub object: serde_json::Value,
}

/// Events the storefront reacts to.
#[derive(Debug)]
pub enum WebhookEvent {
    CheckoutCompleted(CheckoutSession),
    PaymentSucceeded(PaymentIntent),
    PaymentFailed(PaymentIntent),
    /// Anything else, by event type.
    Unhandled(String),
}

impl TryFrom<Event> for WebhookEvent {
    type Error = serde_json::Error;

    fn try_from(event: Event) -> Result<Self, Self::Error> {
        let object = event.data.object;
        Ok(match event.event_type.as_str() {
            "checkout.session.completed" => {
                Self::CheckoutCompleted(serde_json::from_value(object)?)
            }
            "payment_intent.succeeded" => Self::PaymentSucceeded(serde_json::from_value(object)?),
            "payment_intent.payment_failed" => Self::PaymentFailed(serde_json::from_value(object)?),
            _ => Self::Unhandled(event.event_type),
        })
    }
}

/// Verify a delivery against the current time and parse it.
///
/// # Errors
///
/// Returns error if the signature is missing, stale, or wrong, or the body
/// is not a Stripe event.
pub fn construct_event(
    payload: &str,
    header: Option<&str>,
    secret: &str,
) -> Result<WebhookEvent, WebhookError> {
    let now = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map_or(0, |d| i64::try_from(d.as_secs()).unwrap_or(i64::MAX));
    construct_event_at(payload, header, secret, now)
}

/// [`construct_event`] against an explicit clock.
///
/// # Errors
///
/// See [`construct_event`].
pub fn construct_event_at(
    payload: &str,
    header: Option<&str>,
    secret: &str,
    now: i64,
) -> Result<WebhookEvent, WebhookError> {
    let header = header.ok_or(WebhookError::MissingSignature)?;
    verify_signature(payload, header, secret, now)?;

    let event: Event = serde_json::from_str(payload)?;
    debug!(event_id = %event.id, event_type = %event.event_type, "verified webhook event");
    Ok(WebhookEvent::try_from(event)?)
}

/// Check a `Stripe-Signature` header against the raw payload.
///
/// Any one matching `v1` entry is accepted, which covers secret rotation.
///
/// # Errors
///
/// Returns error if the header is malformed, the timestamp is outside
/// [`TOLERANCE_SECS`], or no signature matches.
#[instrument(skip_all)]
pub fn verify_signature(
    payload: &str,
    header: &str,
    secret: &str,
    now: i64,
) -> Result<(), WebhookError> {
    let mut timestamp = None;
    let mut signatures = Vec::new();

    for part in header.split(',') {
        match part.trim().split_once('=') {
            Some(("t", value)) => timestamp = Some(value),
            Some(("v1", value)) => signatures.push(value),
            _ => {}
        }
    }

    let timestamp = timestamp.ok_or(WebhookError::MalformedHeader("missing timestamp"))?;
    if signatures.is_empty() {
        return Err(WebhookError::MalformedHeader("missing v1 signature"));
    }

    let ts: i64 = timestamp
        .parse()
        .map_err(|_| WebhookError::MalformedHeader("invalid timestamp"))?;
    if (now - ts).abs() > TOLERANCE_SECS {
        return Err(WebhookError::Expired);
    }

    let expected = sign(secret, timestamp, payload)?;
    if signatures
        .iter()
        .any(|candidate| constant_time_compare(&expected, candidate))
    {
        Ok(())
    } else {
        Err(WebhookError::SignatureMismatch)
    }
}

/// Hex HMAC-SHA256 over `"{timestamp}.{payload}"`.
///
/// # Errors
///
/// Returns error if the secret cannot key the MAC.
pub fn sign(secret: &str, timestamp: &str, payload: &str) -> Result<String, WebhookError> {
    let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes())
        .map_err(|_| WebhookError::InvalidSecret)?;
    mac.update(timestamp.as_bytes());
    mac.update(b".");
    mac.update(payload.as_bytes());
    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// Constant-time string comparison to prevent timing attacks.
fn constant_time_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result: u8 = 0;
    for (x, y) in a.bytes().zip(b.bytes()) {
        result |= x ^ y;
    }

    result == 0
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const SECRET: &str = "whsec_9fJ2kLmN4pQ7rS1tU3vW";
    const NOW: i64 = 1_760_000_000;

    fn signed_header(payload: &str, ts: i64) -> String {
        let ts = ts.to_string();
        format!("t={ts},v1={}", sign(SECRET, &ts, payload).unwrap())
    }

    const COMPLETED: &str = r#"{"id":"evt_1","type":"checkout.session.completed","data":{"object":{"id":"cs_test_1","url":null,"payment_status":"paid","amount_total":16300,"customer_details":{"email":"buyer@example.com","name":"Ada"}}}}"#;

    #[test]
    fn test_valid_signature_accepted() {
        let header = signed_header(COMPLETED, NOW - 10);
        assert!(verify_signature(COMPLETED, &header, SECRET, NOW).is_ok());
    }

    #[test]
    fn test_rotated_secret_second_signature() {
        let ts = NOW.to_string();
        let header = format!(
            "t={ts},v1={},v1={}",
            "0".repeat(64),
            sign(SECRET, &ts, COMPLETED).unwrap()
        );
        assert!(verify_signature(COMPLETED, &header, SECRET, NOW).is_ok());
    }

    #[test]
    fn test_tampered_body_rejected() {
        let header = signed_header(COMPLETED, NOW);
        let tampered = COMPLETED.replace("16300", "100");
        assert!(matches!(
            verify_signature(&tampered, &header, SECRET, NOW),
            Err(WebhookError::SignatureMismatch)
        ));
    }

    #[test]
    fn test_stale_timestamp_rejected() {
        let header = signed_header(COMPLETED, NOW - TOLERANCE_SECS - 1);
        assert!(matches!(
            verify_signature(COMPLETED, &header, SECRET, NOW),
            Err(WebhookError::Expired)
        ));
    }

    #[test]
    fn test_malformed_headers() {
        assert!(matches!(
            verify_signature(COMPLETED, "v1=abc", SECRET, NOW),
            Err(WebhookError::MalformedHeader(_))
        ));
        assert!(matches!(
            verify_signature(COMPLETED, "t=123", SECRET, NOW),
            Err(WebhookError::MalformedHeader(_))
        ));
        assert!(matches!(
            verify_signature(COMPLETED, "t=soon,v1=abc", SECRET, NOW),
            Err(WebhookError::MalformedHeader(_))
        ));
        assert!(matches!(
            construct_event_at(COMPLETED, None, SECRET, NOW),
            Err(WebhookError::MissingSignature)
        ));
    }

    #[test]
    fn test_event_classification() {
        let header = signed_header(COMPLETED, NOW);
        let event = construct_event_at(COMPLETED, Some(&header), SECRET, NOW).unwrap();
        match event {
            WebhookEvent::CheckoutCompleted(session) => {
                assert_eq!(session.id, "cs_test_1");
                assert!(session.payment_status.is_settled());
                assert_eq!(
                    session.customer_details.unwrap().email.as_deref(),
                    Some("buyer@example.com")
                );
            }
            other => panic!("unexpected event {other:?}"),
        }

        let failed = r#"{"id":"evt_2","type":"payment_intent.payment_failed","data":{"object":{"id":"pi_9"}}}"#;
        let header = signed_header(failed, NOW);
        assert!(matches!(
            construct_event_at(failed, Some(&header), SECRET, NOW).unwrap(),
            WebhookEvent::PaymentFailed(pi) if pi.id == "pi_9"
        ));

        let other = r#"{"id":"evt_3","type":"customer.created","data":{"object":{}}}"#;
        let header = signed_header(other, NOW);
        assert!(matches!(
            construct_event_at(other, Some(&header), SECRET, NOW).unwrap(),
            WebhookEvent::Unhandled(t) if t == "customer.created"
        ));
    }

    #[test]
    fn test_constant_time_compare() {
        assert!(constant_time_compare("abc", "abc"));
        assert!(!constant_time_compare("abc", "abd"));
        assert!(!constant_time_compare("abc", "abcd"));
    }
}
