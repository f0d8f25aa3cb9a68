use std::{future::Future, time::Duration};

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::Json,
    routing::{delete, get},
    Router,
};
use serde_json::{json, Value};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use uuid::Uuid;

use crate::errors::{AppError, StoreError};
use crate::store::Stores;

pub mod items;
pub mod members;
pub mod summary;

#[cfg(test)]
mod tests;

#[derive(Clone)]
pub struct AppState {
    pub stores: Stores,
    pub operation_timeout: Duration,
}

impl AppState {
    pub fn new(stores: Stores, operation_timeout: Duration) -> Self {
        AppState {
            stores,
            operation_timeout,
        }
    }

    /// Runs one storage read under the configured time bound. Writes are not
    /// wrapped here: an outer timeout could fire after the store committed.
    /// The stores bound their own pre-commit work instead.
    pub async fn bounded<T, F>(&self, op: F) -> Result<T, AppError>
    where
        F: Future<Output = Result<T, StoreError>>,
    {
        Ok(tokio::time::timeout(self.operation_timeout, op).await??)
    }
}

pub fn router(state: AppState) -> Router {
    // The mobile client talks to the API from any origin
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api", get(root))
        .route("/api/", get(root))
        .route(
            "/api/family-members",
            get(members::list_members).post(members::create_member),
        )
        .route(
            "/api/family-members/:id",
            delete(members::delete_member),
        )
        .route("/api/items", get(items::list_items).post(items::create_item))
        .route(
            "/api/items/:id",
            get(items::get_item).delete(items::delete_item),
        )
        .route("/api/summary", get(summary::get_summary))
        .fallback(handle_404)
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

async fn root() -> Json<Value> {
    Json(json!({ "message": "BudgetFly API" }))
}

async fn handle_404() -> (StatusCode, Json<Value>) {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "status": "error",
            "message": "Route not found."
        })),
    )
}

/// Ids are opaque to clients; text that is not a UUID can never name a record.
fn parse_id(entity: &'static str, raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|_| AppError::not_found(entity, raw))
}

fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| AppError::validation("body", rejection.body_text()))
}
