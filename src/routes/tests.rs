use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use super::{router, AppState};
use crate::errors::StoreError;
use crate::models::{ExpenseItem, Summary};
use crate::store::{
    memory::{MemoryItemStore, MemoryMemberStore},
    ItemStore, Stores,
};

fn app() -> Router {
    router(AppState::new(Stores::in_memory(), Duration::from_secs(5)))
}

async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string())),
        None => builder.body(Body::empty()),
    }
    .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn summary(app: &Router) -> Value {
    let (status, body) = send(app, Method::GET, "/api/summary", None).await;
    assert_eq!(status, StatusCode::OK);
    body
}

fn bricks() -> Value {
    json!({
        "item_name": "Bricks",
        "price": 500,
        "quantity": 10,
        "recipient": "ABC Supplier",
        "payment_type": "cash",
        "paid_by": "Raj",
    })
}

#[tokio::test]
async fn root_answers_with_service_name() {
    let app = app();
    let (status, body) = send(&app, Method::GET, "/api/", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "BudgetFly API");
}

#[tokio::test]
async fn unknown_route_is_404() {
    let app = app();
    let (status, _) = send(&app, Method::GET, "/api/nope", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn member_lifecycle() {
    let app = app();

    let mut ids = Vec::new();
    for name in ["John Smith", "Mary Johnson", "David Wilson"] {
        let (status, body) = send(
            &app,
            Method::POST,
            "/api/family-members",
            Some(json!({ "name": name })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["name"], name);
        assert!(body["created_at"].is_string());
        ids.push(body["id"].as_str().unwrap().to_string());
    }

    let (status, body) = send(&app, Method::GET, "/api/family-members", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 3);

    let uri = format!("/api/family-members/{}", ids[0]);
    let (status, body) = send(&app, Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");

    let (status, _) = send(&app, Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, body) = send(&app, Method::GET, "/api/family-members", None).await;
    let names: Vec<_> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["name"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(names, ["Mary Johnson", "David Wilson"]);
}

#[tokio::test]
async fn blank_member_name_is_rejected() {
    let app = app();

    for body in [json!({ "name": "" }), json!({ "name": "   " }), json!({})] {
        let (status, response) = send(&app, Method::POST, "/api/family-members", Some(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(response["field"], "name");
    }

    let (_, body) = send(&app, Method::GET, "/api/family-members", None).await;
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn malformed_member_id_is_not_found() {
    let app = app();
    let (status, _) = send(&app, Method::DELETE, "/api/family-members/not-a-uuid", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn added_item_appears_once_in_the_ledger() {
    let app = app();

    let (status, created) = send(&app, Method::POST, "/api/items", Some(bricks())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(created["item_name"], "Bricks");
    assert_eq!(created["price"], json!(500.0));
    assert_eq!(created["quantity"], 10);
    assert_eq!(created["payment_type"], "cash");
    assert_eq!(created["paid_by"], "Raj");

    let (_, ledger) = send(&app, Method::GET, "/api/items", None).await;
    let matching: Vec<_> = ledger
        .as_array()
        .unwrap()
        .iter()
        .filter(|item| item["id"] == created["id"])
        .collect();
    assert_eq!(matching.len(), 1);
    assert_eq!(matching[0], &created);

    let uri = format!("/api/items/{}", created["id"].as_str().unwrap());
    let (status, fetched) = send(&app, Method::GET, &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, created);
}

#[tokio::test]
async fn omitted_quantity_defaults_to_one() {
    let app = app();
    let mut body = bricks();
    body.as_object_mut().unwrap().remove("quantity");

    let (status, created) = send(&app, Method::POST, "/api/items", Some(body)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(created["quantity"], 1);
}

#[tokio::test]
async fn bricks_purchase_moves_cash_total_only() {
    let app = app();
    let before = summary(&app).await;

    send(&app, Method::POST, "/api/items", Some(bricks())).await;

    let after = summary(&app).await;
    assert_eq!(after["total_amount"], json!(5000.0));
    assert_eq!(after["cash_total"], json!(5000.0));
    assert_eq!(after["online_total"], before["online_total"]);
    assert_eq!(after["total_items"], 1);
}

#[tokio::test]
async fn summary_splits_cash_and_online() {
    let app = app();
    let cash = json!({
        "item_name": "Sand", "price": 1000, "recipient": "Quarry",
        "payment_type": "cash", "paid_by": "Raj",
    });
    let online = json!({
        "item_name": "Tiles", "price": 2000, "recipient": "Tile Depot",
        "payment_type": "online", "paid_by": "Mary",
    });
    send(&app, Method::POST, "/api/items", Some(cash)).await;
    send(&app, Method::POST, "/api/items", Some(online)).await;

    assert_eq!(
        summary(&app).await,
        json!({
            "total_amount": 3000.0,
            "total_items": 2,
            "cash_total": 1000.0,
            "online_total": 2000.0,
        })
    );
}

#[tokio::test]
async fn non_positive_price_leaves_ledger_unchanged() {
    let app = app();
    send(&app, Method::POST, "/api/items", Some(bricks())).await;
    let before = summary(&app).await;

    for price in [json!(0), json!(-50)] {
        let mut body = bricks();
        body["price"] = price;
        let (status, response) = send(&app, Method::POST, "/api/items", Some(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(response["field"], "price");
    }

    assert_eq!(summary(&app).await, before);
}

#[tokio::test]
async fn invalid_payment_type_is_rejected() {
    let app = app();
    let mut body = bricks();
    body["payment_type"] = json!("card");

    let (status, response) = send(&app, Method::POST, "/api/items", Some(body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response["field"], "payment_type");
}

#[tokio::test]
async fn wrong_typed_item_field_is_named() {
    let app = app();

    let mut body = bricks();
    body["item_name"] = json!(7);
    body["price"] = json!(-1);
    let (status, response) = send(&app, Method::POST, "/api/items", Some(body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response["field"], "item_name");

    for (field, value) in [("recipient", json!(42)), ("payment_type", json!(1))] {
        let mut body = bricks();
        body[field] = value;
        let (status, response) = send(&app, Method::POST, "/api/items", Some(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(response["field"], field);
    }

    assert_eq!(summary(&app).await["total_items"], 0);
}

#[tokio::test]
async fn wrong_typed_member_name_is_named() {
    let app = app();
    let body = Some(json!({ "name": 5 }));

    let (status, response) = send(&app, Method::POST, "/api/family-members", body).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response["field"], "name");
}

#[tokio::test]
async fn numeric_string_price_is_accepted() {
    let app = app();
    let mut body = bricks();
    body["price"] = json!("450.50");
    body["quantity"] = json!("2");

    let (status, item) = send(&app, Method::POST, "/api/items", Some(body)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(item["price"], json!(450.5));
    assert_eq!(summary(&app).await["cash_total"], json!(901.0));
}

#[tokio::test]
async fn malformed_json_is_a_validation_error() {
    let app = app();
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/items")
        .header("content-type", "application/json")
        .body(Body::from("{\"item_name\": "))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn deleting_unknown_item_changes_nothing() {
    let app = app();
    send(&app, Method::POST, "/api/items", Some(bricks())).await;
    let (_, ledger_before) = send(&app, Method::GET, "/api/items", None).await;
    let summary_before = summary(&app).await;

    let uri = format!("/api/items/{}", Uuid::new_v4());
    let (status, _) = send(&app, Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, ledger_after) = send(&app, Method::GET, "/api/items", None).await;
    assert_eq!(ledger_after, ledger_before);
    assert_eq!(summary(&app).await, summary_before);
}

#[tokio::test]
async fn totals_stay_balanced_across_adds_and_deletes() {
    let app = app();
    let mut ids = Vec::new();

    for n in 1..=6 {
        let kind = if n % 2 == 0 { "online" } else { "cash" };
        let body = json!({
            "item_name": format!("Item {n}"),
            "price": n as f64 * 10.25,
            "quantity": n,
            "recipient": "Hardware Store",
            "payment_type": kind,
            "paid_by": "David",
        });
        let (_, created) = send(&app, Method::POST, "/api/items", Some(body)).await;
        ids.push(created["id"].as_str().unwrap().to_string());
        assert_balanced(&summary(&app).await);
    }

    for id in ids.iter().step_by(2) {
        send(&app, Method::DELETE, &format!("/api/items/{id}"), None).await;
        assert_balanced(&summary(&app).await);
    }

    assert_eq!(summary(&app).await["total_items"], 3);
}

fn assert_balanced(summary: &Value) {
    let cents = |key: &str| (summary[key].as_f64().unwrap() * 100.0).round() as i64;
    assert_eq!(cents("cash_total") + cents("online_total"), cents("total_amount"));
}

#[tokio::test]
async fn deleting_a_member_keeps_items_paid_by_them() {
    let app = app();
    let (_, member) = send(
        &app,
        Method::POST,
        "/api/family-members",
        Some(json!({ "name": "Raj" })),
    )
    .await;
    send(&app, Method::POST, "/api/items", Some(bricks())).await;

    let uri = format!("/api/family-members/{}", member["id"].as_str().unwrap());
    send(&app, Method::DELETE, &uri, None).await;

    let (_, ledger) = send(&app, Method::GET, "/api/items", None).await;
    assert_eq!(ledger[0]["paid_by"], "Raj");
    assert_eq!(summary(&app).await["total_items"], 1);
}

/// Ledger whose storage never answers in time.
struct StalledItemStore;

#[async_trait]
impl ItemStore for StalledItemStore {
    async fn list(&self) -> Result<Vec<ExpenseItem>, StoreError> {
        tokio::time::sleep(Duration::from_secs(60)).await;
        Ok(Vec::new())
    }

    async fn get(&self, _id: Uuid) -> Result<Option<ExpenseItem>, StoreError> {
        Ok(None)
    }

    async fn insert(&self, _item: ExpenseItem) -> Result<ExpenseItem, StoreError> {
        Err(StoreError::Unavailable("connection refused".into()))
    }

    async fn delete(&self, _id: Uuid) -> Result<bool, StoreError> {
        Ok(false)
    }

    async fn summary(&self) -> Result<Summary, StoreError> {
        Err(StoreError::Corrupt("numeric field overflow".into()))
    }
}

fn stalled_app() -> Router {
    let stores = Stores {
        members: Arc::new(MemoryMemberStore::default()),
        items: Arc::new(StalledItemStore),
    };
    router(AppState::new(stores, Duration::from_millis(20)))
}

#[tokio::test]
async fn slow_storage_times_out_as_transient() {
    let app = stalled_app();
    let (status, _) = send(&app, Method::GET, "/api/items", None).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn unavailable_storage_is_transient() {
    let app = stalled_app();
    let (status, _) = send(&app, Method::POST, "/api/items", Some(bricks())).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn storage_faults_are_redacted() {
    let app = stalled_app();
    let (status, body) = send(&app, Method::GET, "/api/summary", None).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["message"], "Internal server error.");
}

/// Ledger whose writes finish after the request time bound has passed.
#[derive(Default)]
struct SlowWriteItemStore {
    inner: MemoryItemStore,
}

#[async_trait]
impl ItemStore for SlowWriteItemStore {
    async fn list(&self) -> Result<Vec<ExpenseItem>, StoreError> {
        self.inner.list().await
    }

    async fn get(&self, id: Uuid) -> Result<Option<ExpenseItem>, StoreError> {
        self.inner.get(id).await
    }

    async fn insert(&self, item: ExpenseItem) -> Result<ExpenseItem, StoreError> {
        tokio::time::sleep(Duration::from_millis(80)).await;
        self.inner.insert(item).await
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        tokio::time::sleep(Duration::from_millis(80)).await;
        self.inner.delete(id).await
    }

    async fn summary(&self) -> Result<Summary, StoreError> {
        self.inner.summary().await
    }
}

#[tokio::test]
async fn completed_write_is_never_reported_as_failed() {
    let stores = Stores {
        members: Arc::new(MemoryMemberStore::default()),
        items: Arc::new(SlowWriteItemStore::default()),
    };
    let app = router(AppState::new(stores, Duration::from_millis(20)));

    let (status, item) = send(&app, Method::POST, "/api/items", Some(bricks())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(summary(&app).await["total_items"], 1);

    let uri = format!("/api/items/{}", item["id"].as_str().unwrap());
    let (status, _) = send(&app, Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(summary(&app).await["total_items"], 0);
}
