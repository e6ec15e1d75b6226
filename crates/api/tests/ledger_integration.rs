//! Integration tests for the ledger record + statistics flow.
//!
//! Requires a PostgreSQL test database; see `common::create_test_pool`.

mod common;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use serde_json::{json, Value};
use tower::util::ServiceExt;
use uuid::Uuid;

async fn send(
    app: axum::Router,
    method: Method,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let request = match body {
        Some(value) => Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(value.to_string()))
            .unwrap(),
        None => Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap(),
    };

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

fn gift_body(donor: &str, amount: i64, category: &str) -> Value {
    json!({
        "donorName": donor,
        "amount": amount,
        "category": category,
        "channel": "cash",
        "giftDate": "2026-05-16"
    })
}

#[tokio::test]
#[ignore = "requires a PostgreSQL test database"]
async fn create_record_updates_statistics() {
    let pool = common::create_test_pool().await;
    common::run_migrations(&pool).await;
    let ledger_id = Uuid::new_v4();

    let (status, body) = send(
        common::test_app(pool.clone()),
        Method::POST,
        &format!("/api/v1/ledgers/{ledger_id}/records"),
        Some(gift_body("Kim Minsoo", 20_000, "friend")),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["statistics"]["total_amount"], 20_000);
    assert_eq!(body["statistics"]["total_count"], 1);
    assert_eq!(body["statistics"]["pending_ack_count"], 1);
    assert_eq!(body["statistics"]["by_bucket"]["under_30k"], 1);

    let (status, stats) = send(
        common::test_app(pool.clone()),
        Method::GET,
        &format!("/api/v1/ledgers/{ledger_id}/statistics"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stats["total_amount"], 20_000);
    assert_eq!(stats["top_gift"]["amount"], 20_000);
}

#[tokio::test]
#[ignore = "requires a PostgreSQL test database"]
async fn recompute_agrees_with_incremental_path() {
    let pool = common::create_test_pool().await;
    common::run_migrations(&pool).await;
    let ledger_id = Uuid::new_v4();

    for (donor, amount, category) in [
        ("Kim Minsoo", 20_000, "friend"),
        ("Lee Seoyeon", 600_000, "family"),
        ("Park Jiho", 500_000, "relative"),
    ] {
        let (status, _) = send(
            common::test_app(pool.clone()),
            Method::POST,
            &format!("/api/v1/ledgers/{ledger_id}/records"),
            Some(gift_body(donor, amount, category)),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (_, incremental) = send(
        common::test_app(pool.clone()),
        Method::GET,
        &format!("/api/v1/ledgers/{ledger_id}/statistics"),
        None,
    )
    .await;

    let (status, recomputed) = send(
        common::test_app(pool.clone()),
        Method::POST,
        &format!("/api/v1/ledgers/{ledger_id}/statistics/recompute"),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(incremental, recomputed);
    assert_eq!(recomputed["total_amount"], 1_120_000);
    assert_eq!(recomputed["by_bucket"]["200k_to_500k"], 1);
    assert_eq!(recomputed["by_bucket"]["over_500k"], 1);
}

#[tokio::test]
#[ignore = "requires a PostgreSQL test database"]
async fn unknown_filter_values_are_ignored_not_rejected() {
    let pool = common::create_test_pool().await;
    common::run_migrations(&pool).await;
    let ledger_id = Uuid::new_v4();

    let (status, _) = send(
        common::test_app(pool.clone()),
        Method::POST,
        &format!("/api/v1/ledgers/{ledger_id}/records"),
        Some(gift_body("Kim Minsoo", 20_000, "friend")),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, page) = send(
        common::test_app(pool.clone()),
        Method::GET,
        &format!("/api/v1/ledgers/{ledger_id}/records?category=no-such&channel=pigeon"),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["total"], 1);
    assert_eq!(page["items"][0]["donorName"], "Kim Minsoo");
}

#[tokio::test]
#[ignore = "requires a PostgreSQL test database"]
async fn statistics_read_is_zero_valued_for_unknown_ledger() {
    let pool = common::create_test_pool().await;
    common::run_migrations(&pool).await;

    let (status, stats) = send(
        common::test_app(pool.clone()),
        Method::GET,
        &format!("/api/v1/ledgers/{}/statistics/summary", Uuid::new_v4()),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(stats["total_amount"], 0);
    assert_eq!(stats["total_count"], 0);
    assert!(stats["top_gift"].is_null());
}

#[tokio::test]
#[ignore = "requires a PostgreSQL test database"]
async fn validation_failures_are_rejected_before_the_engine() {
    let pool = common::create_test_pool().await;
    common::run_migrations(&pool).await;
    let ledger_id = Uuid::new_v4();

    let (status, body) = send(
        common::test_app(pool.clone()),
        Method::POST,
        &format!("/api/v1/ledgers/{ledger_id}/records"),
        Some(gift_body("Kim Minsoo", -100, "friend")),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation_error");

    let (_, stats) = send(
        common::test_app(pool.clone()),
        Method::GET,
        &format!("/api/v1/ledgers/{ledger_id}/statistics"),
        None,
    )
    .await;
    assert_eq!(stats["total_count"], 0);
}
