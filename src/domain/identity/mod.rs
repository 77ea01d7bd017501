//! Cart line identities
//!
//! Ids read `{product}-{variant}-{micros}-{sequence}`. The sequence number is
//! process-wide, so two lines never share an id even when created within the
//! same microsecond.

use chrono::Utc;
use std::sync::atomic::{AtomicU64, Ordering};
use crate::domain::value_objects::CartItemId;

/// Stands in for the variant part of an id when the line has no variant.
pub const NO_VARIANT: &str = "default";

static SEQUENCE: AtomicU64 = AtomicU64::new(0);

pub fn generate(product_id: &str, variant_id: Option<&str>) -> CartItemId {
    let micros = Utc::now().timestamp_micros();
    let sequence = SEQUENCE.fetch_add(1, Ordering::Relaxed);
    CartItemId::new(format!("{product_id}-{}-{micros}-{sequence}", variant_id.unwrap_or(NO_VARIANT)))
}
