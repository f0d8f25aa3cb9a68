use axum::{
    extract::{rejection::JsonRejection, Path, State},
    response::Json,
};
use serde_json::{json, Value};

use super::{json_body, parse_id, AppState};
use crate::errors::{AppError, Result};
use crate::models::{CreateItemRequest, ExpenseItem};

// Get the whole ledger, newest first
pub async fn list_items(State(state): State<AppState>) -> Result<Json<Vec<ExpenseItem>>> {
    let items = state.bounded(state.stores.items.list()).await?;
    Ok(Json(items))
}

// Get one ledger entry by id
pub async fn get_item(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ExpenseItem>> {
    let item_id = parse_id("item", &id)?;

    state
        .bounded(state.stores.items.get(item_id))
        .await?
        .map(Json)
        .ok_or_else(|| AppError::not_found("item", id))
}

// Record a purchase
pub async fn create_item(
    State(state): State<AppState>,
    payload: std::result::Result<Json<CreateItemRequest>, JsonRejection>,
) -> Result<Json<ExpenseItem>> {
    // Validate before touching the ledger
    let item = ExpenseItem::new(json_body(payload)?)?;

    let item = state.stores.items.insert(item).await?;
    tracing::info!(
        item_id = %item.id,
        payment_type = %item.payment_type,
        price_minor = item.price.minor(),
        quantity = item.quantity,
        "item added"
    );

    Ok(Json(item))
}

// Delete a ledger entry
pub async fn delete_item(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>> {
    let item_id = parse_id("item", &id)?;

    if !state.stores.items.delete(item_id).await? {
        return Err(AppError::not_found("item", id));
    }
    tracing::info!(%item_id, "item deleted");

    Ok(Json(json!({
        "status": "success",
        "message": "Item deleted successfully"
    })))
}
