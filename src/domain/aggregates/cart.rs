//! Cart Aggregate

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use crate::domain::aggregates::product::{Product, Variant};
use crate::domain::lenient;
use crate::domain::pricing;
use crate::domain::value_objects::{CartItemId, UnitPrice};

/// Whole cart as held by the store and written to storage.
///
/// `total` and `item_count` are derived from `items` and recalculated after
/// every change to the item list. Fields are only written by the reducer.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CartState {
    #[serde(deserialize_with = "lenient::skip_invalid")]
    pub(crate) items: Vec<CartItem>,
    #[serde(deserialize_with = "lenient::null_as_default")]
    pub(crate) total: Decimal,
    #[serde(deserialize_with = "lenient::null_as_default")]
    pub(crate) item_count: u64,
    #[serde(deserialize_with = "lenient::null_as_default")]
    pub(crate) is_open: bool,
    #[serde(deserialize_with = "lenient::null_as_default")]
    pub(crate) customer_details: CustomerDetails,
    #[serde(deserialize_with = "lenient::null_as_default")]
    pub(crate) global_comment: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) location_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) discount: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) table_and_space: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) reservation: Option<serde_json::Value>,
}

/// One line of the cart: a product snapshot, the chosen variant and a quantity.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub cart_item_id: CartItemId,
    #[serde(rename = "id")]
    pub product_id: String,
    #[serde(default, deserialize_with = "lenient::null_as_default")]
    pub name: String,
    #[serde(default)]
    pub price: UnitPrice,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "lenient::null_as_default")]
    pub variants: Vec<Variant>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variant_id: Option<String>,
    #[serde(default)]
    pub selected_variant: Option<Variant>,
    /// Saved lines may carry any number here; non-positive ones are dropped on load.
    #[serde(default, deserialize_with = "lenient::clamped_quantity")]
    pub quantity: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty", deserialize_with = "lenient::null_as_default")]
    pub modifiers: Vec<SubSelection>,
    #[serde(default, skip_serializing_if = "Vec::is_empty", deserialize_with = "lenient::null_as_default")]
    pub addons: Vec<SubSelection>,
}

/// Modifier or add-on attached to a line. Carried through untouched.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SubSelection {
    pub id: String,
    #[serde(default)]
    pub quantity: u32,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CustomerDetails {
    #[serde(deserialize_with = "lenient::null_as_default")]
    pub name: String,
    #[serde(deserialize_with = "lenient::null_as_default")]
    pub phone: String,
    #[serde(deserialize_with = "lenient::null_as_default")]
    pub gender: String,
    #[serde(deserialize_with = "lenient::null_as_default")]
    pub email: String,
}

impl CartItem {
    pub(crate) fn from_product(id: CartItemId, product: Product, quantity: u32, variant_id: Option<String>) -> Self {
        let selected_variant = variant_id.as_deref().and_then(|v| product.variant(v)).cloned();
        Self {
            cart_item_id: id,
            product_id: product.id,
            name: product.name,
            price: product.price,
            image: product.image,
            description: product.description,
            variants: product.variants,
            variant_id,
            selected_variant,
            quantity,
            comment: None,
            modifiers: vec![],
            addons: vec![],
        }
    }

    pub fn unit_price(&self) -> Decimal { pricing::resolve_unit_price(self, self.variant_id.as_deref()) }
    pub fn line_total(&self) -> Decimal { pricing::line_total(self) }
}

impl CartState {
    /// Parse a persisted cart. Fields missing from `raw` take their initial values.
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str::<Self>(raw).map(Self::normalized)
    }

    pub fn items(&self) -> &[CartItem] { &self.items }
    pub fn total(&self) -> Decimal { self.total }
    pub fn item_count(&self) -> u64 { self.item_count }
    pub fn line_count(&self) -> usize { self.items.len() }
    pub fn is_empty(&self) -> bool { self.items.is_empty() }
    pub fn is_open(&self) -> bool { self.is_open }
    pub fn customer_details(&self) -> &CustomerDetails { &self.customer_details }
    pub fn global_comment(&self) -> &str { &self.global_comment }
    pub fn location_id(&self) -> Option<&str> { self.location_id.as_deref() }
    pub fn discount(&self) -> Option<&serde_json::Value> { self.discount.as_ref() }
    pub fn table_and_space(&self) -> Option<&serde_json::Value> { self.table_and_space.as_ref() }
    pub fn reservation(&self) -> Option<&serde_json::Value> { self.reservation.as_ref() }

    pub fn find_item(&self, id: &CartItemId) -> Option<&CartItem> {
        self.items.iter().find(|i| &i.cart_item_id == id)
    }

    /// Sum of unit price times quantity over all lines, computed on demand.
    pub fn total_price(&self) -> Decimal { pricing::items_total(&self.items) }

    /// Drop lines that can no longer be valid and rebuild the derived totals.
    pub(crate) fn normalized(mut self) -> Self {
        self.items.retain(|i| i.quantity > 0);
        self.recalculate();
        self
    }

    pub(crate) fn recalculate(&mut self) {
        self.item_count = self.items.iter().map(|i| u64::from(i.quantity)).sum();
        self.total = pricing::items_total(&self.items);
    }
}
