//! Contract tests against a scripted backend.
//!
//! Covers the identity header contract, fault mapping from real HTTP
//! responses, and the guest-to-authenticated cart flow end to end.

use std::sync::Arc;

use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use larkspur_client::identity::MemoryProfileStore;
use larkspur_client::{ClientConfig, Fault, Shop};
use larkspur_core::{Credentials, ProductId};

fn cart_with_p1() -> serde_json::Value {
    json!({
        "lines": [{
            "id": "line_1",
            "product": {
                "id": "p1",
                "slug": "p1",
                "title": "P1",
                "price": { "amount": "20.00", "currency_code": "USD" },
                "discounted_price": null,
                "image_url": null
            },
            "quantity": 1
        }],
        "coupon": null
    })
}

fn profile_json() -> serde_json::Value {
    json!({
        "id": "u_1",
        "email": "buyer@example.test",
        "name": "Buyer",
        "role": "customer",
        "disabled": false,
        "created_at": "2026-01-01T00:00:00Z"
    })
}

async fn shop_against(server: &MockServer) -> Shop {
    let config = ClientConfig::new(&server.uri()).expect("mock server uri is valid");
    Shop::new(&config, Arc::new(MemoryProfileStore::new())).expect("client construction")
}

#[tokio::test]
async fn guest_call_sends_session_header_and_no_bearer() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/cart"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "lines": [],
            "coupon": null
        })))
        .mount(&server)
        .await;

    let shop = shop_against(&server).await;
    let cart = shop.cart().await.expect("guest cart read");
    assert_eq!(cart.line_count(), 0);

    let requests = server.received_requests().await.expect("request recording");
    assert_eq!(requests.len(), 1);
    let session = requests[0]
        .headers
        .get("x-session-id")
        .expect("session header always present");
    assert!(!session.to_str().expect("ascii header").is_empty());
    assert!(!requests[0].headers.contains_key("authorization"));
}

#[tokio::test]
async fn authenticated_call_sends_both_headers() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "token": "tok_secret",
            "profile": profile_json()
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/account"))
        .respond_with(ResponseTemplate::new(200).set_body_json(profile_json()))
        .mount(&server)
        .await;

    let shop = shop_against(&server).await;
    shop.login(&Credentials {
        email: "buyer@example.test".to_string(),
        password: "hunter2hunter2".to_string(),
    })
    .await
    .expect("login");

    let profile = shop.profile().await.expect("profile read");
    assert_eq!(profile.email, "buyer@example.test");

    let requests = server.received_requests().await.expect("request recording");
    let account_request = requests
        .iter()
        .find(|r| r.url.path() == "/account")
        .expect("account request made");
    assert!(account_request.headers.contains_key("x-session-id"));
    assert_eq!(
        account_request
            .headers
            .get("authorization")
            .expect("bearer header present")
            .to_str()
            .expect("ascii header"),
        "Bearer tok_secret"
    );
}

#[tokio::test]
async fn guest_cart_survives_login_under_same_session_id() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/cart/lines"))
        .respond_with(ResponseTemplate::new(200).set_body_json(cart_with_p1()))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/cart"))
        .respond_with(ResponseTemplate::new(200).set_body_json(cart_with_p1()))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "token": "tok_secret",
            "profile": profile_json()
        })))
        .mount(&server)
        .await;

    let shop = shop_against(&server).await;

    // Guest adds P1 (price 20, no discount) to an empty cart.
    let cart = shop
        .add_to_cart(&ProductId::new("p1"), 1)
        .await
        .expect("add to cart");
    assert_eq!(cart.line_count(), 1);
    assert_eq!(cart.total().amount.to_string(), "20.00");

    let before = shop.cart().await.expect("guest cart read");
    assert_eq!(before.line_count(), 1);

    // Login: token appears, session id must not change.
    let guest_session = shop.identity().expect("identity").session_id;
    shop.login(&Credentials {
        email: "buyer@example.test".to_string(),
        password: "hunter2hunter2".to_string(),
    })
    .await
    .expect("login");
    assert_eq!(shop.identity().expect("identity").session_id, guest_session);

    // Login invalidated the cart slot, so this read refetches.
    let after = shop.cart().await.expect("authenticated cart read");
    assert_eq!(after.line_count(), 1);
    assert_eq!(after.total().amount.to_string(), "20.00");

    let requests = server.received_requests().await.expect("request recording");
    let cart_reads: Vec<_> = requests
        .iter()
        .filter(|r| r.url.path() == "/cart" && r.method == "GET")
        .collect();
    assert_eq!(cart_reads.len(), 2, "post-login read must refetch");

    // Every cart call, before and after login, carried the same session id.
    for request in requests
        .iter()
        .filter(|r| r.url.path().starts_with("/cart"))
    {
        assert_eq!(
            request
                .headers
                .get("x-session-id")
                .expect("session header")
                .to_str()
                .expect("ascii header"),
            guest_session
        );
    }
    let post_login_read = cart_reads.last().expect("two reads");
    assert!(post_login_read.headers.contains_key("authorization"));
}

#[tokio::test]
async fn structured_error_message_surfaces_verbatim() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/cart/lines"))
        .respond_with(
            ResponseTemplate::new(422).set_body_json(json!({
                "message": "product p1 is out of stock"
            })),
        )
        .mount(&server)
        .await;

    let shop = shop_against(&server).await;
    let fault = shop
        .add_to_cart(&ProductId::new("p1"), 1)
        .await
        .expect_err("backend rejected the add");
    assert_eq!(
        fault,
        Fault::Validation("product p1 is out of stock".to_string())
    );
}

#[tokio::test]
async fn html_error_page_degrades_to_generic_message() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/cart"))
        .respond_with(
            ResponseTemplate::new(500)
                .set_body_string("<html><body>Internal Server Error</body></html>"),
        )
        .mount(&server)
        .await;

    let shop = shop_against(&server).await;
    let fault = shop.cart().await.expect_err("backend failed");
    assert_eq!(fault, Fault::Network("backend error (HTTP 500)".to_string()));
}

#[tokio::test]
async fn expired_token_maps_to_auth_fault_and_keeps_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "token": "tok_expiring",
            "profile": profile_json()
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/orders"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let shop = shop_against(&server).await;
    shop.login(&Credentials {
        email: "buyer@example.test".to_string(),
        password: "hunter2hunter2".to_string(),
    })
    .await
    .expect("login");

    let fault = shop.orders().await.expect_err("token rejected");
    assert!(fault.is_auth());

    // The fault does not auto-clear the token; that choice belongs to the
    // caller reacting to it.
    assert!(shop.identity().expect("identity").is_authenticated());
}

#[tokio::test]
async fn guest_checkout_is_rejected_locally() {
    let server = MockServer::start().await;
    let shop = shop_against(&server).await;

    let fault = shop
        .checkout(&larkspur_core::ShippingAddress {
            name: "Buyer".to_string(),
            street: "1 Main St".to_string(),
            city: "Springfield".to_string(),
            postal_code: "00000".to_string(),
            country: "US".to_string(),
        })
        .await
        .expect_err("guests cannot check out");
    assert!(fault.is_auth());

    // Nothing was sent: the rejection happens before request assembly.
    assert!(server.received_requests().await.expect("recording").is_empty());
}

#[tokio::test]
async fn stale_cache_serves_while_backend_is_down() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/categories"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "id": "c_1",
            "slug": "brewers",
            "name": "Brewers",
            "description": null
        }])))
        .expect(1)
        .mount(&server)
        .await;

    // A zero-width window makes every read after the first a refetch.
    let mut config = ClientConfig::new(&server.uri()).expect("mock server uri is valid");
    config.freshness.catalog = larkspur_client::Freshness::Window(std::time::Duration::ZERO);
    let shop =
        Shop::new(&config, Arc::new(MemoryProfileStore::new())).expect("client construction");

    let first = shop.categories().await.expect("initial read");
    assert_eq!(first.len(), 1);

    // Take the backend away; the refetch fails and the prior value is served.
    server.reset().await;
    Mock::given(method("GET"))
        .and(path("/categories"))
        .respond_with(ResponseTemplate::new(503).set_body_string("unavailable"))
        .mount(&server)
        .await;

    let served = shop.categories().await.expect("stale value served");
    assert_eq!(served.len(), 1);
}
