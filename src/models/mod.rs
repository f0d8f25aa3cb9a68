use serde_json::Value;

use crate::errors::AppError;

pub mod item;
pub mod member;
pub mod money;
pub mod summary;

pub use item::{CreateItemRequest, ExpenseItem, PaymentType};
pub use member::{CreateMemberRequest, Member};
pub use money::Money;
pub use summary::Summary;

/// Trimmed, non-empty text. A non-string value fails under the same field.
pub(crate) fn required_text(
    field: &'static str,
    value: Option<&Value>,
) -> Result<String, AppError> {
    match value {
        Some(Value::String(text)) if !text.trim().is_empty() => Ok(text.trim().to_string()),
        None | Some(Value::Null) | Some(Value::String(_)) => Err(AppError::validation(
            field,
            format!("{field} must not be empty"),
        )),
        Some(_) => Err(AppError::validation(
            field,
            format!("{field} must be a string"),
        )),
    }
}
