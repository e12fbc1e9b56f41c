//! Integration tests for the API server.

use std::sync::OnceLock;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use catalog_store::InMemoryCatalogStore;
use metrics_exporter_prometheus::PrometheusHandle;
use serde_json::{Value, json};
use tower::ServiceExt;

static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

fn get_metrics_handle() -> PrometheusHandle {
    METRICS_HANDLE
        .get_or_init(|| {
            let builder = metrics_exporter_prometheus::PrometheusBuilder::new();
            builder
                .install_recorder()
                .expect("failed to install Prometheus recorder")
        })
        .clone()
}

fn setup() -> axum::Router {
    let state = api::create_default_state(InMemoryCatalogStore::new());
    api::create_app(state, get_metrics_handle())
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_string(&body).unwrap()))
        .unwrap()
}

fn gift_request(sender: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/api/gifts")
        .header("content-type", "application/json");
    if let Some(sender) = sender {
        builder = builder.header("Member-Id", sender);
    }
    builder
        .body(Body::from(serde_json::to_string(&body).unwrap()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn call(app: &axum::Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).unwrap_or(Value::Null)
    };
    (status, json)
}

/// Seeded catalog: two members and one option with the given stock.
struct Seed {
    sender: i64,
    receiver: i64,
    product: i64,
    option: i64,
}

async fn seed(app: &axum::Router, stock: i64) -> Seed {
    let (_, category) = call(app, post_json("/api/categories", json!({ "name": "Food" }))).await;
    let (_, product) = call(
        app,
        post_json(
            "/api/products",
            json!({
                "name": "Coffee",
                "price": 4500,
                "imageUrl": "http://image.png",
                "categoryId": category["id"],
            }),
        ),
    )
    .await;
    let product = product["id"].as_i64().unwrap();
    let (_, option) = call(
        app,
        post_json(
            &format!("/api/products/{product}/options"),
            json!({ "name": "Tall", "quantity": stock }),
        ),
    )
    .await;
    let (_, sender) = call(
        app,
        post_json(
            "/api/members",
            json!({ "name": "Sender", "email": "sender@test.com" }),
        ),
    )
    .await;
    let (_, receiver) = call(
        app,
        post_json(
            "/api/members",
            json!({ "name": "Receiver", "email": "receiver@test.com" }),
        ),
    )
    .await;

    Seed {
        sender: sender["id"].as_i64().unwrap(),
        receiver: receiver["id"].as_i64().unwrap(),
        product,
        option: option["id"].as_i64().unwrap(),
    }
}

async fn stock(app: &axum::Router, option: i64) -> i64 {
    let (status, json) = call(app, get(&format!("/api/options/{option}"))).await;
    assert_eq!(status, StatusCode::OK);
    json["quantity"].as_i64().unwrap()
}

#[tokio::test]
async fn test_health_check() {
    let app = setup();

    let (status, json) = call(&app, get("/health")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
}

#[tokio::test]
async fn test_metrics_endpoint_renders_text() {
    let app = setup();

    let response = app.oneshot(get("/metrics")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_create_and_list_categories() {
    let app = setup();

    let (status, created) = call(&app, post_json("/api/categories", json!({ "name": "Food" }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(created["name"], "Food");
    assert!(created["id"].as_i64().is_some());

    let (status, list) = call(&app, get("/api/categories")).await;
    assert_eq!(status, StatusCode::OK);
    let list = list.as_array().unwrap();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0]["name"], "Food");
}

#[tokio::test]
async fn test_blank_category_name_is_rejected_and_not_stored() {
    let app = setup();

    for body in [json!({ "name": "   " }), json!({})] {
        let (status, json) = call(&app, post_json("/api/categories", body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(json["error"].as_str().is_some());
    }

    let (_, list) = call(&app, get("/api/categories")).await;
    assert!(list.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_overlong_category_name_is_bad_request() {
    let app = setup();

    let (status, json) = call(
        &app,
        post_json("/api/categories", json!({ "name": "x".repeat(300) })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].as_str().unwrap().contains("too long"));
    let (_, list) = call(&app, get("/api/categories")).await;
    assert!(list.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_create_product_and_list() {
    let app = setup();
    let (_, category) = call(&app, post_json("/api/categories", json!({ "name": "Food" }))).await;

    let (status, product) = call(
        &app,
        post_json(
            "/api/products",
            json!({
                "name": "Coffee",
                "price": 4500,
                "imageUrl": "http://image.png",
                "categoryId": category["id"],
            }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(product["name"], "Coffee");
    assert_eq!(product["price"], 4500);
    assert_eq!(product["imageUrl"], "http://image.png");
    assert_eq!(product["categoryId"], category["id"]);

    let (_, list) = call(&app, get("/api/products")).await;
    assert_eq!(list.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_product_with_non_positive_price_is_rejected() {
    let app = setup();
    let (_, category) = call(&app, post_json("/api/categories", json!({ "name": "Food" }))).await;

    for price in [0, -100] {
        let (status, _) = call(
            &app,
            post_json(
                "/api/products",
                json!({ "name": "Coffee", "price": price, "categoryId": category["id"] }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    let (_, list) = call(&app, get("/api/products")).await;
    assert!(list.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_product_with_unknown_category_is_not_found() {
    let app = setup();

    let (status, _) = call(
        &app,
        post_json(
            "/api/products",
            json!({ "name": "Coffee", "price": 4500, "categoryId": 999 }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_product_without_category_is_bad_request() {
    let app = setup();

    let (status, _) = call(
        &app,
        post_json("/api/products", json!({ "name": "Coffee", "price": 4500 })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_options_endpoints() {
    let app = setup();
    let seed = seed(&app, 10).await;

    let (status, list) = call(&app, get(&format!("/api/products/{}/options", seed.product))).await;
    assert_eq!(status, StatusCode::OK);
    let list = list.as_array().unwrap();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0]["quantity"], 10);

    let (status, details) = call(&app, get(&format!("/api/options/{}", seed.option))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(details["name"], "Tall");
    assert_eq!(details["product"]["name"], "Coffee");

    let (status, _) = call(&app, get("/api/options/999")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = call(&app, get("/api/options/not-a-number")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_option_with_negative_stock_is_rejected() {
    let app = setup();
    let seed = seed(&app, 10).await;

    let (status, _) = call(
        &app,
        post_json(
            &format!("/api/products/{}/options", seed.product),
            json!({ "name": "Grande", "quantity": -1 }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_members_endpoints() {
    let app = setup();

    let (status, member) = call(
        &app,
        post_json("/api/members", json!({ "name": "Alice", "email": "alice@test.com" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let id = member["id"].as_i64().unwrap();

    let (status, fetched) = call(&app, get(&format!("/api/members/{id}"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["email"], "alice@test.com");

    let (status, _) = call(&app, get("/api/members/999")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = call(
        &app,
        post_json("/api/members", json!({ "name": "Bob", "email": "no-at-sign" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_send_gift_decrements_stock() {
    let app = setup();
    let seed = seed(&app, 10).await;

    let (status, receipt) = call(
        &app,
        gift_request(
            Some(&seed.sender.to_string()),
            json!({
                "optionId": seed.option,
                "quantity": 3,
                "receiverId": seed.receiver,
                "message": "Enjoy",
            }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(receipt["quantity"], 3);
    assert_eq!(receipt["remainingStock"], 7);
    assert_eq!(receipt["senderId"], seed.sender);
    assert!(receipt["giftId"].as_str().is_some());
    assert_eq!(stock(&app, seed.option).await, 7);
}

#[tokio::test]
async fn test_send_gift_exceeding_stock_is_conflict() {
    let app = setup();
    let seed = seed(&app, 5).await;

    let (status, json) = call(
        &app,
        gift_request(
            Some(&seed.sender.to_string()),
            json!({ "optionId": seed.option, "quantity": 10, "receiverId": seed.receiver }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert!(json["error"].as_str().is_some());
    assert_eq!(stock(&app, seed.option).await, 5);
}

#[tokio::test]
async fn test_send_gift_with_non_positive_quantity_is_bad_request() {
    let app = setup();
    let seed = seed(&app, 10).await;

    for quantity in [0, -5] {
        let (status, _) = call(
            &app,
            gift_request(
                Some(&seed.sender.to_string()),
                json!({ "optionId": seed.option, "quantity": quantity, "receiverId": seed.receiver }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    assert_eq!(stock(&app, seed.option).await, 10);
}

#[tokio::test]
async fn test_send_gift_without_member_header_is_bad_request() {
    let app = setup();
    let seed = seed(&app, 10).await;
    let body = json!({ "optionId": seed.option, "quantity": 1, "receiverId": seed.receiver });

    let (status, _) = call(&app, gift_request(None, body.clone())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = call(&app, gift_request(Some("abc"), body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    assert_eq!(stock(&app, seed.option).await, 10);
}

#[tokio::test]
async fn test_send_gift_without_body_is_bad_request() {
    let app = setup();
    let seed = seed(&app, 10).await;

    let request = Request::builder()
        .method("POST")
        .uri("/api/gifts")
        .header("Member-Id", seed.sender.to_string())
        .body(Body::empty())
        .unwrap();
    let (status, _) = call(&app, request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(stock(&app, seed.option).await, 10);
}

#[tokio::test]
async fn test_send_gift_with_unknown_references_is_not_found() {
    let app = setup();
    let seed = seed(&app, 10).await;

    let cases = [
        (seed.sender, json!({ "optionId": 999, "quantity": 1, "receiverId": seed.receiver })),
        (999, json!({ "optionId": seed.option, "quantity": 1, "receiverId": seed.receiver })),
        (seed.sender, json!({ "optionId": seed.option, "quantity": 1, "receiverId": 999 })),
    ];

    for (sender, body) in cases {
        let (status, _) = call(&app, gift_request(Some(&sender.to_string()), body)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    assert_eq!(stock(&app, seed.option).await, 10);
}
