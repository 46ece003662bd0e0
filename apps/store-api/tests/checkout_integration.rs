//! Integration tests for the store API.
//!
//! These drive the real router over an in-memory database and verify:
//! - Advisory coupon validation
//! - Authoritative checkout totals (client figures ignored)
//! - Catalog inconsistency and coupon rejection behavior
//! - Field-by-field validation errors
//! - Best-effort cart mirroring

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::{Duration, Utc};
use serde_json::{json, Value};
use tower::util::ServiceExt; // for `oneshot`

use kitab_core::{Book, Coupon, DiscountType};
use kitab_db::repository::coupon::generate_coupon_id;
use kitab_db::{Database, DbConfig};
use store_api::routes::create_app_router;
use store_api::state::AppState;

/// Seeded book id used across tests.
const BOOK_ID: &str = "11111111-1111-1111-1111-111111111111";

/// Builds the app over a fresh in-memory database with one $20.00 book and
/// three coupons (SAVE10, FREESHIP, and the already-spent ONCE).
async fn create_test_app() -> (axum::Router, Database) {
    let db = Database::new(DbConfig::in_memory()).await.unwrap();
    let now = Utc::now();

    let book = Book {
        id: BOOK_ID.to_string(),
        title: "The Stranger".to_string(),
        author: Some("Albert Camus".to_string()),
        price_cents: 2000,
        cover_image: None,
        is_active: true,
        created_at: now,
        updated_at: now,
    };
    db.books().insert(&book).await.unwrap();

    let coupons = [
        seed_coupon("SAVE10", DiscountType::Percentage, 10, Some(1500), None, 0),
        seed_coupon("FREESHIP", DiscountType::FreeShipping, 0, None, None, 0),
        seed_coupon("ONCE", DiscountType::Percentage, 10, None, Some(1), 1),
    ];
    for coupon in &coupons {
        db.coupons().insert(coupon).await.unwrap();
    }

    let app = create_app_router(Arc::new(AppState::new(db.clone())));
    (app, db)
}

fn seed_coupon(
    code: &str,
    discount_type: DiscountType,
    value: i64,
    min_purchase_cents: Option<i64>,
    usage_limit: Option<i64>,
    used_count: i64,
) -> Coupon {
    let now = Utc::now();
    Coupon {
        id: generate_coupon_id(),
        code: code.to_string(),
        discount_type,
        discount_value: value,
        min_purchase_cents,
        max_discount_cents: None,
        usage_limit,
        used_count,
        valid_from: now - Duration::days(1),
        valid_until: now + Duration::days(30),
        is_active: true,
        created_at: now,
        updated_at: now,
    }
}

/// Helper to send a JSON request and get the response.
async fn send_request(
    app: &axum::Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");

    let request = match body {
        Some(body) => builder
            .body(Body::from(serde_json::to_string(&body).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();

    let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: Value = serde_json::from_slice(&body_bytes).unwrap_or(json!({}));

    (status, body)
}

fn checkout_body(coupon_code: Option<&str>, items: Value) -> Value {
    json!({
        "name": "Amine B.",
        "email": "reader@example.com",
        "phone": "0555123456",
        "address": "12 Rue Didouche Mourad",
        "city": "Algiers",
        "deliveryType": "home",
        "couponCode": coupon_code,
        "items": items
    })
}

// =============================================================================
// Health
// =============================================================================

#[tokio::test]
async fn test_health() {
    let (app, _db) = create_test_app().await;
    let (status, body) = send_request(&app, "GET", "/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["database"], true);
}

// =============================================================================
// Coupon Validation (advisory)
// =============================================================================

#[tokio::test]
async fn test_validate_coupon_applies() {
    let (app, _db) = create_test_app().await;
    let (status, body) = send_request(
        &app,
        "POST",
        "/coupons/validate",
        Some(json!({"code": "SAVE10", "subtotalCents": 2000})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["valid"], true);
    assert_eq!(body["discountType"], "percentage");
    assert_eq!(body["discountCents"], 200);
    assert_eq!(body["freeShipping"], false);
}

#[tokio::test]
async fn test_validate_coupon_below_minimum_is_invalid_not_error() {
    let (app, _db) = create_test_app().await;
    let (status, body) = send_request(
        &app,
        "POST",
        "/coupons/validate",
        Some(json!({"code": "SAVE10", "subtotalCents": 1000})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["valid"], false);
    assert!(body["message"]
        .as_str()
        .unwrap()
        .contains("minimum purchase"));
}

#[tokio::test]
async fn test_validate_unknown_code() {
    let (app, _db) = create_test_app().await;
    let (status, body) = send_request(
        &app,
        "POST",
        "/coupons/validate",
        Some(json!({"code": "NOPE", "subtotalCents": 2000})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["valid"], false);
    assert_eq!(body["message"], "Invalid coupon code");
}

#[tokio::test]
async fn test_validate_is_case_insensitive() {
    let (app, _db) = create_test_app().await;
    let (_, body) = send_request(
        &app,
        "POST",
        "/coupons/validate",
        Some(json!({"code": " save10 ", "subtotalCents": 2000})),
    )
    .await;

    assert_eq!(body["valid"], true);
}

// =============================================================================
// Checkout (authoritative)
// =============================================================================

#[tokio::test]
async fn test_checkout_with_coupon_recomputes_totals() {
    let (app, _db) = create_test_app().await;

    let (status, body) = send_request(
        &app,
        "POST",
        "/checkout",
        Some(checkout_body(
            Some("SAVE10"),
            json!([{"bookId": BOOK_ID, "quantity": 1}]),
        )),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    let tracking = body["order"]["trackingNumber"].as_str().unwrap().to_string();
    assert!(body["order"]["orderNumber"].as_str().unwrap().starts_with("KB-"));

    // The persisted snapshot carries the server-side recomputation:
    // $20.00 − 10% + $7.00 home delivery
    let (status, tracked) =
        send_request(&app, "GET", &format!("/orders/track/{}", tracking), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(tracked["subtotalCents"], 2000);
    assert_eq!(tracked["discountCents"], 200);
    assert_eq!(tracked["deliveryFeeCents"], 700);
    assert_eq!(tracked["totalCents"], 2500);
    assert_eq!(tracked["status"], "pending");
    assert_eq!(tracked["items"][0]["title"], "The Stranger");
}

#[tokio::test]
async fn test_checkout_ignores_client_submitted_figures() {
    let (app, _db) = create_test_app().await;

    // A tampering client declares its own prices and totals. The request
    // types carry no such fields, so they fall on the floor.
    let mut body = checkout_body(
        None,
        json!([{"bookId": BOOK_ID, "quantity": 1, "unitPriceCents": 1}]),
    );
    body["totalCents"] = json!(1);

    let (status, response) = send_request(&app, "POST", "/checkout", Some(body)).await;
    assert_eq!(status, StatusCode::OK);

    let tracking = response["order"]["trackingNumber"].as_str().unwrap();
    let (_, tracked) =
        send_request(&app, "GET", &format!("/orders/track/{}", tracking), None).await;
    assert_eq!(tracked["subtotalCents"], 2000);
    assert_eq!(tracked["totalCents"], 2700);
    assert_eq!(tracked["items"][0]["unitPriceCents"], 2000);
}

#[tokio::test]
async fn test_checkout_free_shipping_zeroes_fee() {
    let (app, _db) = create_test_app().await;

    let (status, body) = send_request(
        &app,
        "POST",
        "/checkout",
        Some(checkout_body(
            Some("FREESHIP"),
            json!([{"bookId": BOOK_ID, "quantity": 1}]),
        )),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let tracking = body["order"]["trackingNumber"].as_str().unwrap();
    let (_, tracked) =
        send_request(&app, "GET", &format!("/orders/track/{}", tracking), None).await;
    assert_eq!(tracked["discountCents"], 0);
    assert_eq!(tracked["deliveryFeeCents"], 0);
    assert_eq!(tracked["totalCents"], 2000);
}

#[tokio::test]
async fn test_checkout_exhausted_coupon_creates_no_order() {
    let (app, db) = create_test_app().await;

    let (status, body) = send_request(
        &app,
        "POST",
        "/checkout",
        Some(checkout_body(
            Some("ONCE"),
            json!([{"bookId": BOOK_ID, "quantity": 1}]),
        )),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["code"], "COUPON_REJECTED");
    assert_eq!(db.orders().count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_checkout_unknown_coupon_rejects_order() {
    let (app, db) = create_test_app().await;

    let (status, body) = send_request(
        &app,
        "POST",
        "/checkout",
        Some(checkout_body(
            Some("NOPE"),
            json!([{"bookId": BOOK_ID, "quantity": 1}]),
        )),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["message"], "Invalid coupon code");
    assert_eq!(db.orders().count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_checkout_reports_all_missing_books() {
    let (app, db) = create_test_app().await;

    let (status, body) = send_request(
        &app,
        "POST",
        "/checkout",
        Some(checkout_body(
            None,
            json!([
                {"bookId": BOOK_ID, "quantity": 1},
                {"bookId": "ghost-1", "quantity": 1},
                {"bookId": "ghost-2", "quantity": 1}
            ]),
        )),
    )
    .await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "CATALOG_INCONSISTENCY");
    let missing: Vec<&str> = body["missingBookIds"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_str().unwrap())
        .collect();
    assert_eq!(missing, vec!["ghost-1", "ghost-2"]);
    assert_eq!(db.orders().count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_checkout_empty_cart_rejected() {
    let (app, _db) = create_test_app().await;

    let (status, body) =
        send_request(&app, "POST", "/checkout", Some(checkout_body(None, json!([])))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Cart is empty");
}

#[tokio::test]
async fn test_checkout_validation_errors_are_per_field() {
    let (app, db) = create_test_app().await;

    let mut body = checkout_body(None, json!([{"bookId": BOOK_ID, "quantity": 1}]));
    body["email"] = json!("not-an-email");
    body["phone"] = json!("");

    let (status, response) = send_request(&app, "POST", "/checkout", Some(body)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response["code"], "VALIDATION_ERROR");
    let fields: Vec<&str> = response["fieldErrors"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["field"].as_str().unwrap())
        .collect();
    assert!(fields.contains(&"email"));
    assert!(fields.contains(&"phone"));
    assert_eq!(db.orders().count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_checkout_negative_quantity_rejected() {
    let (app, _db) = create_test_app().await;

    let (status, response) = send_request(
        &app,
        "POST",
        "/checkout",
        Some(checkout_body(
            None,
            json!([{"bookId": BOOK_ID, "quantity": -1}]),
        )),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response["code"], "VALIDATION_ERROR");
}

// =============================================================================
// Cart Sync (best effort)
// =============================================================================

#[tokio::test]
async fn test_cart_sync_assigns_id_and_mirrors() {
    let (app, db) = create_test_app().await;

    let (status, body) = send_request(
        &app,
        "POST",
        "/cart/sync",
        Some(json!({
            "items": [{"bookId": BOOK_ID, "quantity": 1}],
            "couponCode": "SAVE10"
        })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["synced"], true);

    let cart_id = body["cartId"].as_str().unwrap();
    let mirror = db.cart_mirrors().get(cart_id).await.unwrap().unwrap();
    assert!(mirror.payload.contains(BOOK_ID));
    assert!(mirror.payload.contains("SAVE10"));
}

#[tokio::test]
async fn test_cart_sync_keeps_existing_id() {
    let (app, _db) = create_test_app().await;

    let (_, body) = send_request(
        &app,
        "POST",
        "/cart/sync",
        Some(json!({
            "cartId": "cart-42",
            "items": [],
            "couponCode": null
        })),
    )
    .await;

    assert_eq!(body["cartId"], "cart-42");
}
