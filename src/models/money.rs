//! Fixed-point money.
//!
//! Amounts are kept as a count of minor units (cents) so that ledger sums are
//! exact integer arithmetic. Conversion to a decimal number only happens at the
//! JSON boundary.

use std::str::FromStr;

use rust_decimal::{prelude::ToPrimitive, Decimal, RoundingStrategy};
use serde::{Serialize, Serializer};

/// Digits after the decimal point carried by one minor unit.
pub const MINOR_UNIT_SCALE: u32 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Money(i64);

impl Money {
    pub const ZERO: Money = Money(0);

    pub const fn from_minor(minor: i64) -> Self {
        Money(minor)
    }

    pub const fn minor(self) -> i64 {
        self.0
    }

    pub fn to_decimal(self) -> Decimal {
        Decimal::new(self.0, MINOR_UNIT_SCALE)
    }

    /// Rounds `value` to the minor unit, half away from zero.
    ///
    /// Returns `None` when the rounded amount does not fit in an `i64` count
    /// of minor units.
    pub fn from_decimal(value: Decimal) -> Option<Self> {
        let rounded =
            value.round_dp_with_strategy(MINOR_UNIT_SCALE, RoundingStrategy::MidpointAwayFromZero);
        let minor = rounded.checked_mul(Decimal::from(100))?;
        minor.to_i64().map(Money)
    }

    /// Parses the textual form of a JSON number, e.g. `"450.0"` or `"1.5e3"`.
    pub fn parse_number(raw: &str) -> Option<Self> {
        let value = Decimal::from_str(raw)
            .or_else(|_| Decimal::from_scientific(raw))
            .ok()?;
        Money::from_decimal(value)
    }

    pub fn checked_add(self, other: Money) -> Option<Money> {
        self.0.checked_add(other.0).map(Money)
    }

    pub fn checked_mul(self, factor: i64) -> Option<Money> {
        self.0.checked_mul(factor).map(Money)
    }

    pub const fn is_positive(self) -> bool {
        self.0 > 0
    }
}

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        rust_decimal::serde::float::serialize(&self.to_decimal(), serializer)
    }
}
