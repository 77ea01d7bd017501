//! Cart actions
//!
//! Every change to a cart is expressed as one of these actions and applied by
//! [`crate::domain::reducer::reduce`]. Actions arrive over the wire tagged by
//! `"type"`; tags the engine does not know deserialize as [`CartAction::Unknown`].

use serde::{Deserialize, Serialize};
use crate::domain::aggregates::{CartState, Product};
use crate::domain::value_objects::CartItemId;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE", rename_all_fields = "camelCase")]
pub enum CartAction {
    /// Set the location only if none is set yet.
    InitializeLocation { location_id: String },
    AddItem {
        product: Product,
        quantity: u32,
        #[serde(default)]
        variant_id: Option<String>,
    },
    RemoveItem { cart_item_id: CartItemId },
    /// A quantity of zero or less removes the line.
    UpdateQuantity { cart_item_id: CartItemId, quantity: i64 },
    UpdateItemComment { cart_item_id: CartItemId, comment: String },
    UpdateCustomerDetails(CustomerDetailsPatch),
    UpdateGlobalComment { comment: String },
    UpdateOrderDetails(OrderDetailsPatch),
    /// Set the location unconditionally.
    SetLocationId { location_id: String },
    ClearCart,
    ToggleCart,
    LoadCart(Box<CartState>),
    #[serde(other)]
    Unknown,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CustomerDetailsPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct OrderDetailsPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table_and_space: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reservation: Option<serde_json::Value>,
}

impl CartAction {
    pub fn add_item(product: Product, quantity: u32) -> Self {
        Self::AddItem { product, quantity, variant_id: None }
    }

    pub fn add_variant(product: Product, quantity: u32, variant_id: impl Into<String>) -> Self {
        Self::AddItem { product, quantity, variant_id: Some(variant_id.into()) }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::InitializeLocation { .. } => "INITIALIZE_LOCATION",
            Self::AddItem { .. } => "ADD_ITEM",
            Self::RemoveItem { .. } => "REMOVE_ITEM",
            Self::UpdateQuantity { .. } => "UPDATE_QUANTITY",
            Self::UpdateItemComment { .. } => "UPDATE_ITEM_COMMENT",
            Self::UpdateCustomerDetails(_) => "UPDATE_CUSTOMER_DETAILS",
            Self::UpdateGlobalComment { .. } => "UPDATE_GLOBAL_COMMENT",
            Self::UpdateOrderDetails(_) => "UPDATE_ORDER_DETAILS",
            Self::SetLocationId { .. } => "SET_LOCATION_ID",
            Self::ClearCart => "CLEAR_CART",
            Self::ToggleCart => "TOGGLE_CART",
            Self::LoadCart(_) => "LOAD_CART",
            Self::Unknown => "UNKNOWN",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_add_item_from_json() {
        let action: CartAction = serde_json::from_value(json!({
            "type": "ADD_ITEM",
            "product": {"id": "p1", "name": "Suya", "price": 1500},
            "quantity": 2,
            "variantId": "large"
        })).unwrap();
        match action {
            CartAction::AddItem { product, quantity, variant_id } => {
                assert_eq!(product.id, "p1");
                assert_eq!(quantity, 2);
                assert_eq!(variant_id.as_deref(), Some("large"));
            }
            other => panic!("unexpected action {other:?}"),
        }
    }

    #[test]
    fn test_patch_actions_from_json() {
        let action: CartAction = serde_json::from_value(json!({"type": "UPDATE_CUSTOMER_DETAILS", "phone": "0801"})).unwrap();
        assert_eq!(action, CartAction::UpdateCustomerDetails(CustomerDetailsPatch { phone: Some("0801".into()), ..Default::default() }));
        let action: CartAction = serde_json::from_value(json!({"type": "UPDATE_ORDER_DETAILS", "tableAndSpace": {"table": 4}})).unwrap();
        assert_eq!(action, CartAction::UpdateOrderDetails(OrderDetailsPatch { table_and_space: Some(json!({"table": 4})), ..Default::default() }));
    }

    #[test]
    fn test_unknown_type_is_tolerated() {
        let action: CartAction = serde_json::from_value(json!({"type": "APPLY_LOYALTY_POINTS"})).unwrap();
        assert_eq!(action, CartAction::Unknown);
        assert_eq!(action.name(), "UNKNOWN");
    }

    #[test]
    fn test_unit_actions_round_trip() {
        assert_eq!(serde_json::to_value(CartAction::ToggleCart).unwrap(), json!({"type": "TOGGLE_CART"}));
        let action: CartAction = serde_json::from_value(json!({"type": "CLEAR_CART"})).unwrap();
        assert_eq!(action, CartAction::ClearCart);
    }
}
