//! Unit price resolution for products and cart lines.
//!
//! Precedence:
//! 1. the variant whose id matches the requested variant id;
//! 2. otherwise the first variant, when the product has any;
//! 3. otherwise the product's own price.
//!
//! The first-variant fallback applies even when a variant id was given but does
//! not match. Displayed prices depend on it.

use rust_decimal::Decimal;
use crate::domain::aggregates::{CartItem, Product, Variant};
use crate::domain::value_objects::UnitPrice;

/// Anything carrying a flat price and an ordered list of variants.
pub trait Priced {
    fn base_price(&self) -> &UnitPrice;
    fn variants(&self) -> &[Variant];
}

impl Priced for Product {
    fn base_price(&self) -> &UnitPrice { &self.price }
    fn variants(&self) -> &[Variant] { &self.variants }
}

impl Priced for CartItem {
    fn base_price(&self) -> &UnitPrice { &self.price }
    fn variants(&self) -> &[Variant] { &self.variants }
}

/// Variant whose price applies, if the priced thing has variants at all.
pub fn pricing_variant<'a, P: Priced + ?Sized>(priced: &'a P, variant_id: Option<&str>) -> Option<&'a Variant> {
    let variants = priced.variants();
    variant_id
        .and_then(|id| variants.iter().find(|v| v.id == id))
        .or_else(|| variants.first())
}

pub fn resolve_unit_price<P: Priced + ?Sized>(priced: &P, variant_id: Option<&str>) -> Decimal {
    match pricing_variant(priced, variant_id) {
        Some(variant) => variant.price.coerce(),
        None => priced.base_price().coerce(),
    }
}

pub fn line_total(item: &CartItem) -> Decimal {
    item.unit_price()
        .checked_mul(Decimal::from(item.quantity))
        .unwrap_or(Decimal::MAX)
}

pub fn items_total(items: &[CartItem]) -> Decimal {
    items
        .iter()
        .fold(Decimal::ZERO, |acc, i| acc.checked_add(line_total(i)).unwrap_or(Decimal::MAX))
}
