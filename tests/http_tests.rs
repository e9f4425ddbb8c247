mod common;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use common::{card_details, course, instrument, world};
use http_body_util::BodyExt;
use ragamart::application::checkout::CheckoutService;
use ragamart::application::notifications::NotificationService;
use ragamart::application::offers::OfferService;
use ragamart::application::payments::PaymentService;
use ragamart::domain::ports::{CourseStore, InstrumentStore};
use ragamart::interfaces::http::{AppState, router};
use serde_json::{Value, json};
use std::sync::Arc;
use tower::ServiceExt;
use uuid::Uuid;

struct TestApp {
    router: Router,
    user: Uuid,
    instrument_id: Uuid,
    course_id: Uuid,
}

async fn app() -> TestApp {
    let w = world();
    let user = Uuid::new_v4();
    w.customers.add_user(user, None).await;
    let guitar = instrument("Guitar", 500, 50);
    let instrument_id = guitar.id;
    w.instruments.put(guitar).await.unwrap();
    let raga = course("Raga Foundations", 1000);
    let course_id = raga.id;
    w.courses.put(raga).await.unwrap();

    let state = AppState {
        checkout: Arc::new(CheckoutService::new(
            w.orders.clone(),
            w.instruments.clone(),
            w.customers.clone(),
        )),
        payments: Arc::new(PaymentService::new(
            w.payments.clone(),
            w.courses.clone(),
            w.offers.clone(),
        )),
        offers: Arc::new(OfferService::new(w.offers.clone())),
        notifications: Arc::new(NotificationService::new(
            w.notifications.clone(),
            w.customers.clone(),
            Arc::new(ragamart::infrastructure::push::LogPushGateway),
        )),
    };
    TestApp {
        router: router(state),
        user,
        instrument_id,
        course_id,
    }
}

fn post(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn read_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_create_order_round_trip() {
    let app = app().await;
    let request = post(
        "/api/order",
        json!({
            "customer": app.user,
            "customerModel": "User",
            "items": [{ "instrument": app.instrument_id, "quantity": 1, "price": "500" }],
            "total": "550",
            "address": "12 Raga Lane, Chennai",
        }),
    );
    let response = app.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = read_json(response).await;
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["data"]["total"], json!("550"));
    assert_eq!(body["data"]["customerType"], json!("User"));
    let id = body["data"]["id"].as_str().unwrap().to_string();

    let response = app
        .router
        .clone()
        .oneshot(get(&format!("/api/order/{id}")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body["data"]["status"], json!("processing"));
}

#[tokio::test]
async fn test_order_total_mismatch_is_bad_request() {
    let app = app().await;
    let request = post(
        "/api/order",
        json!({
            "customer": app.user,
            "customerModel": "User",
            "items": [{ "instrument": app.instrument_id, "quantity": 1, "price": "500" }],
            "total": "500",
            "address": "12 Raga Lane, Chennai",
        }),
    );
    let response = app.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = read_json(response).await;
    assert_eq!(body["success"], json!(false));
    assert!(
        body["message"]
            .as_str()
            .unwrap()
            .contains("Order total mismatch")
    );
}

#[tokio::test]
async fn test_invalid_order_reports_itemized_errors() {
    let app = app().await;
    let request = post("/api/order", json!({ "items": [] }));
    let response = app.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = read_json(response).await;
    assert_eq!(body["success"], json!(false));
    assert_eq!(body["message"], json!("Validation failed"));
    assert!(!body["errors"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_unknown_order_is_not_found() {
    let app = app().await;
    let response = app
        .router
        .clone()
        .oneshot(get(&format!("/api/order/{}", Uuid::new_v4())))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = read_json(response).await;
    assert_eq!(body["message"], json!("Order not found"));
}

fn payment_body(course_id: Uuid, user_id: Uuid) -> Value {
    let details = serde_json::to_value(card_details()).unwrap();
    json!({
        "courseId": course_id,
        "userId": user_id,
        "paymentMethod": "credit_card",
        "paymentDetails": details,
    })
}

#[tokio::test]
async fn test_process_payment_and_duplicate_guard() {
    let app = app().await;
    let user = Uuid::new_v4();

    let response = app
        .router
        .clone()
        .oneshot(post(
            "/api/payment/process-payment",
            payment_body(app.course_id, user),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = read_json(response).await;
    assert_eq!(body["data"]["totalAmount"], json!("1280"));
    assert_eq!(
        body["data"]["paymentDetails"]["cardNumber"],
        json!("**** **** **** 1234")
    );
    assert!(body["data"]["paymentDetails"]["cvv"].is_null());

    // Second purchase of the same course by the same user
    let response = app
        .router
        .clone()
        .oneshot(post(
            "/api/payment/process-payment",
            payment_body(app.course_id, user),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = read_json(response).await;
    assert_eq!(
        body["message"],
        json!("Course already purchased by this user.")
    );
}

#[tokio::test]
async fn test_payment_listing_masks_details() {
    let app = app().await;
    let response = app
        .router
        .clone()
        .oneshot(post(
            "/api/payment/process-payment",
            payment_body(app.course_id, Uuid::new_v4()),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app.router.clone().oneshot(get("/api/payment")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    let payments = body["data"].as_array().unwrap();
    assert_eq!(payments.len(), 1);
    assert_eq!(
        payments[0]["paymentDetails"]["cardNumber"],
        json!("**** **** **** 1234")
    );
}

#[tokio::test]
async fn test_breakdown_with_unknown_coupon() {
    let app = app().await;
    let request = post(
        &format!("/api/payment/calculate-breakdown/{}", app.course_id),
        json!({ "couponCode": "NOPE" }),
    );
    let response = app.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = read_json(response).await;
    assert_eq!(body["message"], json!("Invalid or inactive coupon code."));
}

#[tokio::test]
async fn test_offer_lifecycle_over_http() {
    let app = app().await;
    let request = post(
        "/api/offer",
        json!({
            "couponCode": "SAVE10",
            "rule": { "percentage": "10" },
            "validFrom": "2026-01-01T00:00:00Z",
            "validUntil": "2030-01-01T00:00:00Z",
            "usageLimit": 5,
        }),
    );
    let response = app.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = read_json(response).await;
    let id = body["data"]["id"].as_str().unwrap().to_string();

    // Duplicate code rejected
    let request = post(
        "/api/offer",
        json!({
            "couponCode": "SAVE10",
            "rule": { "percentage": "15" },
            "validFrom": "2026-01-01T00:00:00Z",
            "validUntil": "2030-01-01T00:00:00Z",
        }),
    );
    let response = app.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Deactivation keeps the record
    let request = Request::builder()
        .method("DELETE")
        .uri(format!("/api/offer/{id}"))
        .body(Body::empty())
        .unwrap();
    let response = app.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body["data"]["isActive"], json!(false));

    let response = app
        .router
        .clone()
        .oneshot(get(&format!("/api/offer/{id}")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}
