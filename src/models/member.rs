use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::required_text;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct Member {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct CreateMemberRequest {
    #[serde(default)]
    pub name: Option<Value>,
}

impl Member {
    /// Builds a new member from a client request, trimming the name.
    pub fn new(request: CreateMemberRequest) -> Result<Self, AppError> {
        let name = required_text("name", request.name.as_ref())?;

        Ok(Member {
            id: Uuid::new_v4(),
            name,
            created_at: Utc::now(),
        })
    }
}
