//! Value Objects for the cart

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Opaque key of a single cart line, assigned once when the line is created.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CartItemId(String);

impl CartItemId {
    pub fn new(value: impl Into<String>) -> Self { Self(value.into()) }
    pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for CartItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.0) }
}

impl From<&str> for CartItemId {
    fn from(value: &str) -> Self { Self::new(value) }
}

/// Price as it arrives from the catalog.
///
/// Upstream data may carry a number, a numeric-looking string, or something
/// unusable altogether. Anything that does not deserialize as a decimal is kept
/// verbatim and only interpreted by [`UnitPrice::coerce`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum UnitPrice {
    Amount(Decimal),
    Raw(serde_json::Value),
}

impl UnitPrice {
    /// Numeric value of the price. Unparseable input is zero.
    pub fn coerce(&self) -> Decimal {
        match self {
            Self::Amount(amount) => *amount,
            Self::Raw(serde_json::Value::String(text)) => parse_amount(text),
            Self::Raw(serde_json::Value::Number(number)) => parse_amount(&number.to_string()),
            Self::Raw(_) => Decimal::ZERO,
        }
    }
}

fn parse_amount(text: &str) -> Decimal {
    let text = text.trim();
    Decimal::from_str(text)
        .or_else(|_| Decimal::from_scientific(text))
        .unwrap_or(Decimal::ZERO)
}

impl Default for UnitPrice {
    fn default() -> Self { Self::Amount(Decimal::ZERO) }
}

impl From<Decimal> for UnitPrice {
    fn from(amount: Decimal) -> Self { Self::Amount(amount) }
}

impl From<i32> for UnitPrice {
    fn from(amount: i32) -> Self { Self::Amount(Decimal::from(amount)) }
}

impl From<i64> for UnitPrice {
    fn from(amount: i64) -> Self { Self::Amount(Decimal::from(amount)) }
}

/// Same shape deserialization produces: a clean decimal string becomes an amount.
impl From<&str> for UnitPrice {
    fn from(text: &str) -> Self {
        Decimal::from_str(text).map_or_else(|_| Self::Raw(serde_json::Value::String(text.to_string())), Self::Amount)
    }
}
