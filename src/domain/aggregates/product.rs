//! Catalog snapshot consumed by the cart

use serde::{Deserialize, Serialize};
use crate::domain::lenient;
use crate::domain::value_objects::UnitPrice;

/// Product as delivered by the catalog. The cart only reads it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
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
}

/// Purchasable configuration of a product (size, portion, ...) with its own price.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Variant {
    pub id: String,
    #[serde(default, deserialize_with = "lenient::null_as_default")]
    pub name: String,
    #[serde(default)]
    pub price: UnitPrice,
}

impl Product {
    pub fn new(id: impl Into<String>, name: impl Into<String>, price: impl Into<UnitPrice>) -> Self {
        Self { id: id.into(), name: name.into(), price: price.into(), image: None, description: None, variants: vec![] }
    }

    pub fn with_variant(mut self, variant: Variant) -> Self { self.variants.push(variant); self }
    pub fn with_image(mut self, image: impl Into<String>) -> Self { self.image = Some(image.into()); self }
    pub fn with_description(mut self, description: impl Into<String>) -> Self { self.description = Some(description.into()); self }

    pub fn variant(&self, variant_id: &str) -> Option<&Variant> {
        self.variants.iter().find(|v| v.id == variant_id)
    }
}

impl Variant {
    pub fn new(id: impl Into<String>, name: impl Into<String>, price: impl Into<UnitPrice>) -> Self {
        Self { id: id.into(), name: name.into(), price: price.into() }
    }
}
