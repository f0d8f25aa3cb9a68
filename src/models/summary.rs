use serde::Serialize;

use crate::errors::AppError;
use crate::models::item::{ExpenseItem, PaymentType};
use crate::models::money::Money;

/// Running totals over the whole ledger. Never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Summary {
    pub total_amount: Money,
    pub total_items: u64,
    pub cash_total: Money,
    pub online_total: Money,
}

impl Summary {
    pub fn from_items<'a, I>(items: I) -> Result<Self, AppError>
    where
        I: IntoIterator<Item = &'a ExpenseItem>,
    {
        let overflow = || AppError::Unexpected("ledger total overflowed".to_string());

        let mut cash = Money::ZERO;
        let mut online = Money::ZERO;
        let mut count: u64 = 0;

        for item in items {
            let line = item.line_total().ok_or_else(overflow)?;
            match item.payment_type {
                PaymentType::Cash => cash = cash.checked_add(line).ok_or_else(overflow)?,
                PaymentType::Online => online = online.checked_add(line).ok_or_else(overflow)?,
            }
            count += 1;
        }

        Self::from_parts(count, cash, online)
    }

    /// Builds a summary from per-payment-type totals. `total_amount` is always
    /// derived, never taken from the caller.
    pub fn from_parts(
        total_items: u64,
        cash_total: Money,
        online_total: Money,
    ) -> Result<Self, AppError> {
        let total_amount = cash_total
            .checked_add(online_total)
            .ok_or_else(|| AppError::Unexpected("ledger total overflowed".to_string()))?;

        Ok(Summary {
            total_amount,
            total_items,
            cash_total,
            online_total,
        })
    }
}
