//! Stripe request and response types.

use print_shop_core::CurrencyCode;
use print_shop_core::cart::CartItem;
use serde::{Deserialize, Serialize};

/// Placeholder Stripe substitutes with the created session id.
pub const SESSION_ID_PLACEHOLDER: &str = "{CHECKOUT_SESSION_ID}";

/// Metadata tag identifying orders placed through this storefront.
pub const ORDER_TYPE: &str = "photography_prints";

/// Parameters for creating a hosted checkout session.
#[derive(Debug, Clone)]
pub struct CheckoutRequest<'a> {
    /// Lines to charge for, passed through verbatim from the cart.
    pub items: &'a [CartItem],
    /// Where Stripe sends the visitor after paying.
    pub success_url: String,
    /// Where Stripe sends the visitor on cancel.
    pub cancel_url: String,
    /// Shipping destinations.
    pub allowed_countries: &'a [String],
}

impl<'a> CheckoutRequest<'a> {
    /// Build a request returning to `/success` and `/cart` under `base_url`.
    #[must_use]
    pub fn new(items: &'a [CartItem], base_url: &str, allowed_countries: &'a [String]) -> Self {
        let base = base_url.trim_end_matches('/');
        Self {
            items,
            success_url: format!("{base}/success?session_id={SESSION_ID_PLACEHOLDER}"),
            cancel_url: format!("{base}/cart"),
            allowed_countries,
        }
    }

    /// Form-encoded body for `POST /v1/checkout/sessions`.
    #[must_use]
    pub fn form_params(&self) -> Vec<(String, String)> {
        let mut params = vec![
            ("mode".to_string(), "payment".to_string()),
            ("payment_method_types[0]".to_string(), "card".to_string()),
            ("success_url".to_string(), self.success_url.clone()),
            ("cancel_url".to_string(), self.cancel_url.clone()),
            ("metadata[orderType]".to_string(), ORDER_TYPE.to_string()),
        ];

        for (i, country) in self.allowed_countries.iter().enumerate() {
            params.push((
                format!("shipping_address_collection[allowed_countries][{i}]"),
                country.clone(),
            ));
        }

        let currency = CurrencyCode::default().api_code();
        for (i, item) in self.items.iter().enumerate() {
            let line = format!("line_items[{i}]");
            let product = format!("{line}[price_data][product_data]");
            params.extend([
                (format!("{line}[price_data][currency]"), currency.to_string()),
                (
                    format!("{line}[price_data][unit_amount]"),
                    item.price.to_minor_units().to_string(),
                ),
                (format!("{product}[name]"), item.title.clone()),
                (format!("{product}[description]"), line_description(item)),
                (format!("{product}[images][0]"), item.image_url.clone()),
                (
                    format!("{product}[metadata][productId]"),
                    item.product_id.to_string(),
                ),
                (format!("{product}[metadata][size]"), item.size.id.to_string()),
                (format!("{product}[metadata][paper]"), item.paper.id.to_string()),
                (format!("{line}[quantity]"), item.quantity.to_string()),
            ]);
        }

        params
    }
}

/// Human-readable configuration shown on the Stripe payment page.
#[must_use]
pub fn line_description(item: &CartItem) -> String {
    format!(
        "{} ({}) on {}",
        item.size.name, item.size.dimensions, item.paper.name
    )
}

/// A Stripe Checkout Session (the fields this storefront reads).
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CheckoutSession {
    pub id: String,
    /// Hosted payment page. Absent once the session is complete or expired.
    pub url: Option<String>,
    #[serde(default)]
    pub payment_status: PaymentStatus,
    /// Total in minor units.
    pub amount_total: Option<i64>,
    pub customer_details: Option<CustomerDetails>,
}

/// Payment state of a checkout session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Paid,
    #[default]
    Unpaid,
    NoPaymentRequired,
    #[serde(other)]
    Unknown,
}

impl PaymentStatus {
    /// Whether the order is settled and the cart can be cleared.
    #[must_use]
    pub const fn is_settled(self) -> bool {
        matches!(self, Self::Paid | Self::NoPaymentRequired)
    }
}

/// Buyer details collected on the payment page.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CustomerDetails {
    pub email: Option<String>,
    pub name: Option<String>,
}

/// A Stripe PaymentIntent (id only).
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentIntent {
    pub id: String,
}

/// Error envelope returned by Stripe on non-2xx responses.
#[derive(Debug, Deserialize)]
pub(crate) struct ApiErrorBody {
    pub error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiErrorDetail {
    pub message: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use print_shop_core::cart::{CartStore, MemoryStorage, NewCartItem};
    use print_shop_core::{ProductKey, Quantity, catalog};

    use super::*;

    fn items() -> Vec<CartItem> {
        let mut store = CartStore::new(MemoryStorage::new());
        store.add(NewCartItem {
            product_id: ProductKey::new("prints/Cliff_01.jpg"),
            title: "Cliff".to_string(),
            image_url: "https://img.example.com/prints/Cliff_01.jpg".to_string(),
            size: catalog::size("medium").unwrap().clone(),
            paper: catalog::paper("metallic").unwrap().clone(),
            quantity: Quantity::new(2).unwrap(),
        });
        store.read().into_items()
    }

    fn param<'a>(params: &'a [(String, String)], key: &str) -> Option<&'a str> {
        params
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    #[test]
    fn test_return_urls() {
        let countries = vec!["US".to_string()];
        let request = CheckoutRequest::new(&[], "https://prints.example.org/", &countries);
        assert_eq!(
            request.success_url,
            "https://prints.example.org/success?session_id={CHECKOUT_SESSION_ID}"
        );
        assert_eq!(request.cancel_url, "https://prints.example.org/cart");
    }

    #[test]
    fn test_form_params_pass_items_verbatim() {
        let items = items();
        let countries = vec!["US".to_string(), "CA".to_string()];
        let params = CheckoutRequest::new(&items, "https://prints.example.org", &countries)
            .form_params();

        assert_eq!(param(&params, "mode"), Some("payment"));
        assert_eq!(param(&params, "metadata[orderType]"), Some("photography_prints"));
        assert_eq!(
            param(&params, "shipping_address_collection[allowed_countries][1]"),
            Some("CA")
        );
        assert_eq!(param(&params, "line_items[0][quantity]"), Some("2"));
        assert_eq!(
            param(&params, "line_items[0][price_data][unit_amount]"),
            Some("16300")
        );
        assert_eq!(param(&params, "line_items[0][price_data][currency]"), Some("usd"));
        assert_eq!(
            param(&params, "line_items[0][price_data][product_data][name]"),
            Some("Cliff")
        );
        assert_eq!(
            param(&params, "line_items[0][price_data][product_data][description]"),
            Some("Medium (16\" × 20\") on Metallic Print")
        );
        assert_eq!(
            param(&params, "line_items[0][price_data][product_data][metadata][productId]"),
            Some("prints/Cliff_01.jpg")
        );
        assert_eq!(
            param(&params, "line_items[0][price_data][product_data][metadata][paper]"),
            Some("metallic")
        );
        assert!(param(&params, "line_items[1][quantity]").is_none());
    }

    #[test]
    fn test_payment_status_parsing() {
        let session: CheckoutSession = serde_json::from_str(
            r#"{"id":"cs_test_1","url":null,"payment_status":"paid","amount_total":32600,"customer_details":{"email":"a@b.co","name":null}}"#,
        )
        .unwrap();
        assert!(session.payment_status.is_settled());

        let session: CheckoutSession =
            serde_json::from_str(r#"{"id":"cs_test_2","payment_status":"something_new"}"#).unwrap();
        assert_eq!(session.payment_status, PaymentStatus::Unknown);
        assert!(!session.payment_status.is_settled());
        assert!(!PaymentStatus::Unpaid.is_settled());
        assert!(PaymentStatus::NoPaymentRequired.is_settled());
    }
}
