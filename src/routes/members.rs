use axum::{
    extract::{rejection::JsonRejection, Path, State},
    response::Json,
};
use serde_json::{json, Value};

use super::{json_body, parse_id, AppState};
use crate::errors::{AppError, Result};
use crate::models::{CreateMemberRequest, Member};

// Get all family members
pub async fn list_members(State(state): State<AppState>) -> Result<Json<Vec<Member>>> {
    let members = state.bounded(state.stores.members.list()).await?;
    Ok(Json(members))
}

// Register a family member
pub async fn create_member(
    State(state): State<AppState>,
    payload: std::result::Result<Json<CreateMemberRequest>, JsonRejection>,
) -> Result<Json<Member>> {
    let member = Member::new(json_body(payload)?)?;

    let member = state.stores.members.insert(member).await?;
    tracing::info!(member_id = %member.id, name = %member.name, "family member added");

    Ok(Json(member))
}

// Remove a family member; ledger entries that name them are untouched
pub async fn delete_member(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>> {
    let member_id = parse_id("family member", &id)?;

    if !state.stores.members.delete(member_id).await? {
        return Err(AppError::not_found("family member", id));
    }
    tracing::info!(%member_id, "family member deleted");

    Ok(Json(json!({
        "status": "success",
        "message": "Family member deleted successfully"
    })))
}
