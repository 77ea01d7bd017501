//! Cart reducer
//!
//! [`reduce`] is the only place a cart changes. It never mutates the state it
//! is given: every transition builds a new [`CartState`] and returns it in a
//! fresh `Arc`. Transitions that leave the cart as it was hand back the same
//! `Arc`, which lets observers skip work with a pointer comparison.

use std::sync::Arc;
use crate::domain::actions::{CartAction, CustomerDetailsPatch, OrderDetailsPatch};
use crate::domain::aggregates::{CartItem, CartState, Product};
use crate::domain::identity;
use crate::domain::value_objects::CartItemId;

pub fn reduce(state: &Arc<CartState>, action: CartAction) -> Arc<CartState> {
    match action {
        CartAction::InitializeLocation { location_id } => {
            if state.location_id.is_some() {
                return Arc::clone(state);
            }
            next(state, |s| s.location_id = Some(location_id))
        }
        CartAction::AddItem { quantity: 0, .. } => Arc::clone(state),
        CartAction::AddItem { product, quantity, variant_id } => next(state, |s| {
            add_item(s, product, quantity, variant_id);
            s.recalculate();
        }),
        CartAction::RemoveItem { cart_item_id } => next(state, |s| {
            remove_item(s, &cart_item_id);
            s.recalculate();
        }),
        CartAction::UpdateQuantity { cart_item_id, quantity } => next(state, |s| {
            if quantity <= 0 {
                remove_item(s, &cart_item_id);
            } else {
                set_quantity(s, &cart_item_id, u32::try_from(quantity).unwrap_or(u32::MAX));
            }
            s.recalculate();
        }),
        CartAction::UpdateItemComment { cart_item_id, comment } => next(state, |s| {
            if let Some(item) = s.items.iter_mut().find(|i| i.cart_item_id == cart_item_id) {
                item.comment = Some(comment);
            }
        }),
        CartAction::UpdateCustomerDetails(patch) => next(state, |s| merge_customer_details(s, patch)),
        CartAction::UpdateGlobalComment { comment } => next(state, |s| s.global_comment = comment),
        CartAction::UpdateOrderDetails(patch) => next(state, |s| merge_order_details(s, patch)),
        CartAction::SetLocationId { location_id } => next(state, |s| s.location_id = Some(location_id)),
        CartAction::ClearCart => Arc::new(CartState {
            is_open: state.is_open,
            location_id: state.location_id.clone(),
            ..CartState::default()
        }),
        CartAction::ToggleCart => next(state, |s| s.is_open = !s.is_open),
        CartAction::LoadCart(loaded) => Arc::new((*loaded).normalized()),
        CartAction::Unknown => Arc::clone(state),
    }
}

fn next(state: &CartState, change: impl FnOnce(&mut CartState)) -> Arc<CartState> {
    let mut next = state.clone();
    change(&mut next);
    Arc::new(next)
}

/// Merge into an existing line for the same product and variant, or append a new one.
fn add_item(state: &mut CartState, product: Product, quantity: u32, variant_id: Option<String>) {
    let variant_id = variant_id.or_else(|| product.variants.first().map(|v| v.id.clone()));
    match state
        .items
        .iter_mut()
        .find(|i| i.product_id == product.id && i.variant_id == variant_id)
    {
        Some(existing) => existing.quantity = existing.quantity.saturating_add(quantity),
        None => {
            let id = identity::generate(&product.id, variant_id.as_deref());
            state.items.push(CartItem::from_product(id, product, quantity, variant_id));
        }
    }
}

fn remove_item(state: &mut CartState, id: &CartItemId) {
    state.items.retain(|i| &i.cart_item_id != id);
}

fn set_quantity(state: &mut CartState, id: &CartItemId, quantity: u32) {
    if let Some(item) = state.items.iter_mut().find(|i| &i.cart_item_id == id) {
        item.quantity = quantity;
    }
}

fn merge_customer_details(state: &mut CartState, patch: CustomerDetailsPatch) {
    let details = &mut state.customer_details;
    if let Some(name) = patch.name { details.name = name; }
    if let Some(phone) = patch.phone { details.phone = phone; }
    if let Some(gender) = patch.gender { details.gender = gender; }
    if let Some(email) = patch.email { details.email = email; }
}

fn merge_order_details(state: &mut CartState, patch: OrderDetailsPatch) {
    if patch.discount.is_some() { state.discount = patch.discount; }
    if patch.table_and_space.is_some() { state.table_and_space = patch.table_and_space; }
    if patch.reservation.is_some() { state.reservation = patch.reservation; }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::aggregates::Variant;
    use rust_decimal::Decimal;
    use serde_json::json;

    fn apply(state: &Arc<CartState>, actions: impl IntoIterator<Item = CartAction>) -> Arc<CartState> {
        actions.into_iter().fold(Arc::clone(state), |s, a| reduce(&s, a))
    }

    fn empty() -> Arc<CartState> { Arc::new(CartState::default()) }

    fn product_a() -> Product { Product::new("A", "Product A", 5000) }

    fn pizza() -> Product {
        Product::new("pizza", "Pizza", 1)
            .with_variant(Variant::new("V1", "Regular", 10))
            .with_variant(Variant::new("V2", "Large", 15))
    }

    fn assert_invariants(state: &CartState) {
        let count: u64 = state.items().iter().map(|i| u64::from(i.quantity)).sum();
        let total: Decimal = state.items().iter().map(|i| i.unit_price() * Decimal::from(i.quantity)).sum();
        assert_eq!(state.item_count(), count);
        assert_eq!(state.total(), total);
        assert!(state.items().iter().all(|i| i.quantity > 0));
    }

    #[test]
    fn test_scenario_add_merge_then_zero() {
        let state = apply(&empty(), [CartAction::add_item(product_a(), 2), CartAction::add_item(product_a(), 1)]);
        assert_eq!(state.line_count(), 1);
        assert_eq!(state.items()[0].quantity, 3);
        assert_eq!(state.total(), Decimal::new(15000, 0));
        assert_eq!(state.item_count(), 3);

        let id = state.items()[0].cart_item_id.clone();
        let state = reduce(&state, CartAction::UpdateQuantity { cart_item_id: id, quantity: 0 });
        assert!(state.is_empty());
        assert_eq!(state.total(), Decimal::ZERO);
        assert_eq!(state.item_count(), 0);
    }

    #[test]
    fn test_add_defaults_to_first_variant() {
        let state = reduce(&empty(), CartAction::add_item(pizza(), 1));
        let line = &state.items()[0];
        assert_eq!(line.variant_id.as_deref(), Some("V1"));
        assert_eq!(line.selected_variant.as_ref().map(|v| v.id.as_str()), Some("V1"));
        assert_eq!(state.total(), Decimal::new(10, 0));
    }

    #[test]
    fn test_default_variant_dedups_with_explicit_first_variant() {
        let state = apply(&empty(), [CartAction::add_item(pizza(), 1), CartAction::add_variant(pizza(), 2, "V1")]);
        assert_eq!(state.line_count(), 1);
        assert_eq!(state.items()[0].quantity, 3);
    }

    #[test]
    fn test_different_variants_make_separate_lines() {
        let state = apply(&empty(), [CartAction::add_variant(pizza(), 1, "V1"), CartAction::add_variant(pizza(), 2, "V2")]);
        assert_eq!(state.line_count(), 2);
        assert_ne!(state.items()[0].cart_item_id, state.items()[1].cart_item_id);
        assert_eq!(state.items()[1].variant_id.as_deref(), Some("V2"));
        assert_eq!(state.total(), Decimal::new(40, 0));
        assert_invariants(&state);
    }

    #[test]
    fn test_unknown_variant_id_is_kept_and_priced_by_first_variant() {
        let state = reduce(&empty(), CartAction::add_variant(pizza(), 2, "XL"));
        let line = &state.items()[0];
        assert_eq!(line.variant_id.as_deref(), Some("XL"));
        assert!(line.selected_variant.is_none());
        assert_eq!(state.total(), Decimal::new(20, 0));
    }

    #[test]
    fn test_insertion_order_is_kept() {
        let state = apply(&empty(), [
            CartAction::add_item(Product::new("b", "B", 1), 1),
            CartAction::add_item(Product::new("a", "A", 1), 1),
            CartAction::add_item(Product::new("b", "B", 1), 1),
        ]);
        let ids: Vec<_> = state.items().iter().map(|i| i.product_id.as_str()).collect();
        assert_eq!(ids, ["b", "a"]);
    }

    #[test]
    fn test_add_zero_is_noop() {
        let start = empty();
        let state = reduce(&start, CartAction::add_item(product_a(), 0));
        assert!(Arc::ptr_eq(&start, &state));
    }

    #[test]
    fn test_remove_item() {
        let state = apply(&empty(), [CartAction::add_item(product_a(), 1), CartAction::add_item(pizza(), 2)]);
        let id = state.items()[0].cart_item_id.clone();
        let state = reduce(&state, CartAction::RemoveItem { cart_item_id: id });
        assert_eq!(state.line_count(), 1);
        assert_eq!(state.items()[0].product_id, "pizza");
        assert_eq!(state.total(), Decimal::new(20, 0));
        assert_invariants(&state);
    }

    #[test]
    fn test_negative_quantity_removes() {
        let state = apply(&empty(), [CartAction::add_item(product_a(), 1), CartAction::add_item(pizza(), 1)]);
        let id = state.items()[1].cart_item_id.clone();
        let state = reduce(&state, CartAction::UpdateQuantity { cart_item_id: id, quantity: -4 });
        assert_eq!(state.line_count(), 1);
        assert_eq!(state.item_count(), 1);
        assert_eq!(state.total(), Decimal::new(5000, 0));
    }

    #[test]
    fn test_update_quantity_replaces() {
        let state = reduce(&empty(), CartAction::add_item(product_a(), 1));
        let id = state.items()[0].cart_item_id.clone();
        let state = reduce(&state, CartAction::UpdateQuantity { cart_item_id: id, quantity: 4 });
        assert_eq!(state.items()[0].quantity, 4);
        assert_eq!(state.total(), Decimal::new(20000, 0));
        assert_invariants(&state);
    }

    #[test]
    fn test_huge_quantity_saturates() {
        let state = reduce(&empty(), CartAction::add_item(Product::new("gum", "Gum", 0), 1));
        let id = state.items()[0].cart_item_id.clone();
        let state = reduce(&state, CartAction::UpdateQuantity { cart_item_id: id, quantity: i64::MAX });
        assert_eq!(state.items()[0].quantity, u32::MAX);
        assert_invariants(&state);
    }

    #[test]
    fn test_item_comment_leaves_totals() {
        let state = reduce(&empty(), CartAction::add_item(product_a(), 2));
        let id = state.items()[0].cart_item_id.clone();
        let state = reduce(&state, CartAction::UpdateItemComment { cart_item_id: id, comment: "extra spicy".into() });
        assert_eq!(state.items()[0].comment.as_deref(), Some("extra spicy"));
        assert_eq!(state.total(), Decimal::new(10000, 0));
    }

    #[test]
    fn test_customer_details_merge() {
        let state = apply(&empty(), [
            CartAction::UpdateCustomerDetails(CustomerDetailsPatch { name: Some("Ada".into()), phone: Some("0801".into()), ..Default::default() }),
            CartAction::UpdateCustomerDetails(CustomerDetailsPatch { email: Some("ada@example.com".into()), ..Default::default() }),
        ]);
        let details = state.customer_details();
        assert_eq!(details.name, "Ada");
        assert_eq!(details.phone, "0801");
        assert_eq!(details.email, "ada@example.com");
        assert_eq!(details.gender, "");
    }

    #[test]
    fn test_order_details_merge() {
        let state = apply(&empty(), [
            CartAction::UpdateOrderDetails(OrderDetailsPatch { discount: Some(json!({"code": "TEN"})), ..Default::default() }),
            CartAction::UpdateOrderDetails(OrderDetailsPatch { reservation: Some(json!({"at": "19:00"})), ..Default::default() }),
            CartAction::UpdateGlobalComment { comment: "ring the bell".into() },
        ]);
        assert_eq!(state.discount(), Some(&json!({"code": "TEN"})));
        assert_eq!(state.reservation(), Some(&json!({"at": "19:00"})));
        assert_eq!(state.table_and_space(), None);
        assert_eq!(state.global_comment(), "ring the bell");
        assert_eq!(state.total(), Decimal::ZERO);
    }

    #[test]
    fn test_initialize_location_first_write_wins() {
        let state = reduce(&empty(), CartAction::InitializeLocation { location_id: "lekki".into() });
        let again = reduce(&state, CartAction::InitializeLocation { location_id: "ikeja".into() });
        assert!(Arc::ptr_eq(&state, &again));
        assert_eq!(again.location_id(), Some("lekki"));
    }

    #[test]
    fn test_set_location_overwrites_and_is_idempotent() {
        let state = reduce(&empty(), CartAction::InitializeLocation { location_id: "lekki".into() });
        let once = reduce(&state, CartAction::SetLocationId { location_id: "ikeja".into() });
        let twice = reduce(&once, CartAction::SetLocationId { location_id: "ikeja".into() });
        assert_eq!(once.location_id(), Some("ikeja"));
        assert_eq!(*once, *twice);
    }

    #[test]
    fn test_clear_keeps_location_and_visibility() {
        let state = apply(&empty(), [
            CartAction::SetLocationId { location_id: "lekki".into() },
            CartAction::ToggleCart,
            CartAction::add_item(product_a(), 2),
            CartAction::UpdateGlobalComment { comment: "hi".into() },
            CartAction::UpdateCustomerDetails(CustomerDetailsPatch { name: Some("Ada".into()), ..Default::default() }),
            CartAction::ClearCart,
        ]);
        assert!(state.is_empty());
        assert_eq!(state.total(), Decimal::ZERO);
        assert_eq!(state.item_count(), 0);
        assert_eq!(state.location_id(), Some("lekki"));
        assert!(state.is_open());
        assert_eq!(state.global_comment(), "");
        assert_eq!(state.customer_details().name, "");
    }

    #[test]
    fn test_toggle_only_flips_visibility() {
        let state = reduce(&empty(), CartAction::add_item(product_a(), 1));
        let toggled = reduce(&state, CartAction::ToggleCart);
        assert!(toggled.is_open());
        assert_eq!(toggled.items(), state.items());
        assert!(!reduce(&toggled, CartAction::ToggleCart).is_open());
    }

    #[test]
    fn test_load_replaces_state() {
        let original = apply(&empty(), [
            CartAction::add_item(pizza(), 2),
            CartAction::SetLocationId { location_id: "lekki".into() },
        ]);
        let raw = serde_json::to_string(original.as_ref()).unwrap();
        let loaded = CartState::from_json(&raw).unwrap();
        let state = reduce(&reduce(&empty(), CartAction::ToggleCart), CartAction::LoadCart(Box::new(loaded)));
        assert_eq!(*state, *original);
    }

    #[test]
    fn test_unknown_action_is_noop() {
        let state = reduce(&empty(), CartAction::add_item(product_a(), 1));
        assert!(Arc::ptr_eq(&state, &reduce(&state, CartAction::Unknown)));
    }

    #[test]
    fn test_invariants_hold_over_mixed_sequence() {
        let mut state = empty();
        for round in 0..5_i64 {
            state = reduce(&state, CartAction::add_item(product_a(), 1));
            state = reduce(&state, CartAction::add_variant(pizza(), 2, if round % 2 == 0 { "V1" } else { "V2" }));
            assert_invariants(&state);
            let id = state.items()[0].cart_item_id.clone();
            state = reduce(&state, CartAction::UpdateQuantity { cart_item_id: id, quantity: round - 1 });
            assert_invariants(&state);
        }
    }
}
