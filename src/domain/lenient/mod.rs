//! Forgiving field deserializers for persisted carts.
//!
//! A saved cart is loaded as much as possible: `null` reads as the field's
//! default, unusable lines are skipped, and quantities accept any number so
//! non-positive ones can be dropped afterwards instead of failing the load.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use tracing::warn;

/// `null` reads as `T::default()`.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// Keep every element that deserializes; skip the rest.
pub(crate) fn skip_invalid<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let raw = Option::<Vec<serde_json::Value>>::deserialize(deserializer)?.unwrap_or_default();
    Ok(raw
        .into_iter()
        .filter_map(|value| match serde_json::from_value(value) {
            Ok(entry) => Some(entry),
            Err(err) => {
                warn!(error = %err, "skipping unreadable saved cart line");
                None
            }
        })
        .collect())
}

/// Any JSON number, clamped into `0..=u32::MAX`; anything else is zero.
pub(crate) fn clamped_quantity<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let quantity = match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)).unwrap_or(0),
        _ => 0,
    };
    Ok(u32::try_from(quantity.max(0)).unwrap_or(u32::MAX))
}
