use axum::{extract::State, response::Json};

use super::AppState;
use crate::errors::Result;
use crate::models::Summary;

// Running totals, recomputed from the ledger on every call
pub async fn get_summary(State(state): State<AppState>) -> Result<Json<Summary>> {
    let summary = state.bounded(state.stores.items.summary()).await?;
    Ok(Json(summary))
}
