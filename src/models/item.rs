use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::money::Money;
use crate::models::required_text;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentType {
    Cash,
    Online,
}

impl PaymentType {
    pub const fn as_str(self) -> &'static str {
        match self {
            PaymentType::Cash => "cash",
            PaymentType::Online => "online",
        }
    }
}

impl fmt::Display for PaymentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cash" => Ok(PaymentType::Cash),
            "online" => Ok(PaymentType::Online),
            other => Err(format!("unknown payment type {other:?}")),
        }
    }
}

/// One ledger entry. `paid_by` and `recipient` are name snapshots taken at
/// entry time, not references to the member registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExpenseItem {
    pub id: Uuid,
    pub item_name: String,
    pub price: Money,
    pub quantity: i32,
    pub recipient: String,
    pub payment_type: PaymentType,
    pub paid_by: String,
    pub created_at: DateTime<Utc>,
}

impl ExpenseItem {
    /// `price * quantity`, or `None` on overflow.
    pub fn line_total(&self) -> Option<Money> {
        self.price.checked_mul(i64::from(self.quantity))
    }
}

/// Raw item submission. Fields stay loosely typed so that validation can name
/// the first offending field instead of failing the whole body.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CreateItemRequest {
    pub item_name: Option<Value>,
    pub price: Option<Value>,
    pub quantity: Option<Value>,
    pub recipient: Option<Value>,
    pub payment_type: Option<Value>,
    pub paid_by: Option<Value>,
}

impl ExpenseItem {
    pub fn new(request: CreateItemRequest) -> Result<Self, AppError> {
        let item_name = required_text("item_name", request.item_name.as_ref())?;
        let price = parse_price(request.price.as_ref())?;
        let quantity = coerce_quantity(request.quantity.as_ref());
        if price.checked_mul(i64::from(quantity)).is_none() {
            return Err(AppError::validation(
                "quantity",
                "price multiplied by quantity is too large",
            ));
        }
        let recipient = required_text("recipient", request.recipient.as_ref())?;
        let paid_by = required_text("paid_by", request.paid_by.as_ref())?;
        let payment_type = parse_payment_type(request.payment_type.as_ref())?;

        Ok(ExpenseItem {
            id: Uuid::new_v4(),
            item_name,
            price,
            quantity,
            recipient,
            payment_type,
            paid_by,
            created_at: Utc::now(),
        })
    }
}

fn parse_payment_type(value: Option<&Value>) -> Result<PaymentType, AppError> {
    match value {
        None | Some(Value::Null) => {
            Err(AppError::validation("payment_type", "payment_type is required"))
        }
        Some(Value::String(text)) => text.trim().parse::<PaymentType>().map_err(|_| {
            AppError::validation("payment_type", "payment_type must be \"cash\" or \"online\"")
        }),
        Some(_) => Err(AppError::validation(
            "payment_type",
            "payment_type must be \"cash\" or \"online\"",
        )),
    }
}

/// Accepts a JSON number or a string holding one, e.g. `"450.50"`.
fn parse_price(value: Option<&Value>) -> Result<Money, AppError> {
    let price = match value {
        None | Some(Value::Null) => {
            return Err(AppError::validation("price", "price is required"));
        }
        Some(Value::Number(number)) => Money::parse_number(&number.to_string())
            .ok_or_else(|| AppError::validation("price", "price is out of range"))?,
        Some(Value::String(text)) => Money::parse_number(text.trim())
            .ok_or_else(|| AppError::validation("price", "price must be a number"))?,
        Some(_) => return Err(AppError::validation("price", "price must be a number")),
    };

    if !price.is_positive() {
        return Err(AppError::validation("price", "price must be greater than 0"));
    }
    Ok(price)
}

/// Anything that is not a positive whole number in `i32` range becomes 1.
pub fn coerce_quantity(value: Option<&Value>) -> i32 {
    let candidate = match value {
        Some(Value::Number(number)) => number.as_i64().or_else(|| {
            number
                .as_f64()
                .filter(|f| f.fract() == 0.0 && f.abs() <= i32::MAX as f64)
                .map(|f| f as i64)
        }),
        Some(Value::String(text)) => text.trim().parse::<i64>().ok(),
        _ => None,
    };

    candidate
        .filter(|q| *q >= 1)
        .and_then(|q| i32::try_from(q).ok())
        .unwrap_or(1)
}
