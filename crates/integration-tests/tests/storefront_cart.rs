//! Integration tests for the storefront catalog, product, and cart API.

#![allow(clippy::unwrap_used)]

use print_shop_integration_tests::{IMAGE_BASE, TestContext};
use reqwest::StatusCode;
use serde_json::Value;

#[tokio::test]
async fn test_health_and_headers() {
    let ctx = TestContext::new().await;

    let resp = ctx.client.get(ctx.url("/health")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp.headers().contains_key("x-request-id"));
    assert_eq!(resp.headers()["x-frame-options"], "DENY");
    assert_eq!(resp.headers()["cache-control"], "no-store");
    assert_eq!(resp.text().await.unwrap(), "ok");
}

#[tokio::test]
async fn test_upstream_request_id_echoed() {
    let ctx = TestContext::new().await;

    let resp = ctx
        .client
        .get(ctx.url("/health"))
        .header("x-request-id", "edge-7f3a")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.headers()["x-request-id"], "edge-7f3a");
}

#[tokio::test]
async fn test_catalog() {
    let ctx = TestContext::new().await;

    let catalog: Value = ctx
        .client
        .get(ctx.url("/api/catalog"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(catalog["sizes"].as_array().unwrap().len(), 3);
    assert_eq!(catalog["papers"][1]["priceMultiplier"], "1.3");
    assert_eq!(catalog["defaultSize"], "medium");
    assert_eq!(catalog["defaultPaper"], "standard");

    let prices: Vec<u64> = catalog["prices"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["price"].as_u64().unwrap())
        .collect();
    assert_eq!(prices, vec![85, 111, 128, 125, 163, 188, 195, 254, 293]);
}

#[tokio::test]
async fn test_product_detail_from_key() {
    let ctx = TestContext::new().await;

    let resp = ctx
        .client
        .get(ctx.url("/api/products/prints/coast/Sea_Cliff_03.jpg"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let product: Value = resp.json().await.unwrap();
    assert_eq!(product["id"], "prints/coast/Sea_Cliff_03.jpg");
    assert_eq!(product["title"], "Sea Cliff");
    assert_eq!(
        product["imageUrl"],
        format!("{IMAGE_BASE}/prints/coast/Sea_Cliff_03.jpg")
    );
    assert_eq!(product["price"], 125);
}

#[tokio::test]
async fn test_empty_cart() {
    let ctx = TestContext::new().await;

    let cart = ctx.cart().await;
    assert_eq!(cart["items"].as_array().unwrap().len(), 0);
    assert_eq!(cart["total"], 0);
    assert_eq!(cart["itemCount"], 0);
}

#[tokio::test]
async fn test_add_merges_and_keeps_price() {
    let ctx = TestContext::new().await;

    let cart = ctx.add_to_cart("Cliff_01.jpg", "small", "metallic", 1).await;
    assert_eq!(cart["items"][0]["id"], "Cliff_01.jpg-small-metallic");
    assert_eq!(cart["items"][0]["price"], 111);
    assert_eq!(cart["items"][0]["title"], "Cliff");

    let cart = ctx.add_to_cart("Cliff_01.jpg", "small", "metallic", 2).await;
    assert_eq!(cart["items"].as_array().unwrap().len(), 1);
    assert_eq!(cart["items"][0]["quantity"], 3);
    assert_eq!(cart["total"], 333);
    assert_eq!(cart["itemCount"], 3);

    let cart = ctx.add_to_cart("Cliff_01.jpg", "large", "canvas", 1).await;
    assert_eq!(cart["items"].as_array().unwrap().len(), 2);
    assert_eq!(cart["total"], 333 + 293);

    // Persisted in the session
    assert_eq!(ctx.cart().await, cart);
}

#[tokio::test]
async fn test_add_defaults_to_medium_standard() {
    let ctx = TestContext::new().await;

    let resp = ctx
        .client
        .post(ctx.url("/api/cart/add"))
        .form(&[("product_key", "Dune.jpg")])
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let cart: Value = resp.json().await.unwrap();
    assert_eq!(cart["items"][0]["id"], "Dune.jpg-medium-standard");
    assert_eq!(cart["items"][0]["quantity"], 1);
    assert_eq!(cart["total"], 125);
}

#[tokio::test]
async fn test_add_rejects_invalid_input() {
    let ctx = TestContext::new().await;

    for form in [
        vec![("product_key", "a.jpg"), ("size", "poster")],
        vec![("product_key", "a.jpg"), ("paper", "vinyl")],
        vec![("product_key", "a.jpg"), ("quantity", "0")],
        vec![("product_key", "a.jpg"), ("quantity", "-2")],
        vec![("product_key", "../etc/passwd")],
    ] {
        let resp = ctx
            .client
            .post(ctx.url("/api/cart/add"))
            .form(&form)
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "form {form:?}");
        let body: Value = resp.json().await.unwrap();
        assert!(body["error"].is_string());
    }

    assert_eq!(ctx.cart().await["itemCount"], 0);
}

#[tokio::test]
async fn test_mutations_raise_hx_trigger() {
    let ctx = TestContext::new().await;

    let resp = ctx
        .client
        .post(ctx.url("/api/cart/add"))
        .form(&[("product_key", "a.jpg")])
        .send()
        .await
        .unwrap();
    assert_eq!(resp.headers()["hx-trigger"], "cart-updated");

    // Unknown keys still count as a mutation
    let resp = ctx
        .client
        .post(ctx.url("/api/cart/remove"))
        .form(&[("key", "missing-small-standard")])
        .send()
        .await
        .unwrap();
    assert_eq!(resp.headers()["hx-trigger"], "cart-updated");

    let resp = ctx.client.get(ctx.url("/api/cart")).send().await.unwrap();
    assert!(!resp.headers().contains_key("hx-trigger"));
}

#[tokio::test]
async fn test_update_remove_clear() {
    let ctx = TestContext::new().await;
    ctx.add_to_cart("a.jpg", "small", "standard", 1).await;
    ctx.add_to_cart("b.jpg", "medium", "canvas", 1).await;

    let cart: Value = ctx
        .client
        .post(ctx.url("/api/cart/update"))
        .form(&[("key", "a.jpg-small-standard"), ("quantity", "4")])
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(cart["items"][0]["quantity"], 4);
    assert_eq!(cart["total"], 4 * 85 + 188);

    let cart: Value = ctx
        .client
        .post(ctx.url("/api/cart/update"))
        .form(&[("key", "a.jpg-small-standard"), ("quantity", "0")])
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(cart["items"].as_array().unwrap().len(), 1);
    assert_eq!(cart["items"][0]["id"], "b.jpg-medium-canvas");

    let cart: Value = ctx
        .client
        .post(ctx.url("/api/cart/remove"))
        .form(&[("key", "b.jpg-medium-canvas")])
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(cart["itemCount"], 0);

    ctx.add_to_cart("c.jpg", "large", "metallic", 2).await;
    let count: Value = ctx
        .client
        .get(ctx.url("/api/cart/count"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(count["itemCount"], 2);

    let cart: Value = ctx
        .client
        .post(ctx.url("/api/cart/clear"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(cart["total"], 0);
    assert_eq!(ctx.cart().await["itemCount"], 0);
}

#[tokio::test]
async fn test_visitors_have_separate_carts() {
    let ctx = TestContext::new().await;
    ctx.add_to_cart("a.jpg", "small", "standard", 2).await;

    let other = TestContext::client();
    let cart: Value = other
        .get(ctx.url("/api/cart"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(cart["itemCount"], 0);
    assert_eq!(ctx.cart().await["itemCount"], 2);
}
