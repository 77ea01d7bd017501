//! Cart store
//!
//! Owns the current cart and funnels every change through the reducer. After
//! each dispatch the registered observers see the resulting state, in the
//! order they subscribed.

use rust_decimal::Decimal;
use std::fmt;
use std::sync::Arc;
use tracing::debug;
use crate::domain::actions::{CartAction, CustomerDetailsPatch, OrderDetailsPatch};
use crate::domain::aggregates::{CartState, Product};
use crate::domain::reducer::reduce;
use crate::domain::value_objects::CartItemId;

/// Receives the state after every dispatch, whether or not it changed.
pub trait CartObserver: Send {
    fn state_changed(&mut self, state: &Arc<CartState>);
}

#[derive(Default)]
pub struct CartStore {
    state: Arc<CartState>,
    observers: Vec<Box<dyn CartObserver>>,
}

impl fmt::Debug for CartStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CartStore").field("state", &self.state).field("observers", &self.observers.len()).finish()
    }
}

impl CartStore {
    pub fn new() -> Self { Self::default() }

    pub fn state(&self) -> &Arc<CartState> { &self.state }

    pub fn subscribe(&mut self, observer: Box<dyn CartObserver>) { self.observers.push(observer); }

    pub fn dispatch(&mut self, action: CartAction) -> &Arc<CartState> {
        let name = action.name();
        let next = reduce(&self.state, action);
        debug!(action = name, changed = !Arc::ptr_eq(&next, &self.state), items = next.line_count(), "cart dispatch");
        self.state = next;
        for observer in &mut self.observers {
            observer.state_changed(&self.state);
        }
        &self.state
    }

    pub fn add_item(&mut self, product: Product, quantity: u32, variant_id: Option<String>) -> &Arc<CartState> {
        self.dispatch(CartAction::AddItem { product, quantity, variant_id })
    }

    pub fn remove_item(&mut self, cart_item_id: CartItemId) -> &Arc<CartState> {
        self.dispatch(CartAction::RemoveItem { cart_item_id })
    }

    pub fn update_quantity(&mut self, cart_item_id: CartItemId, quantity: i64) -> &Arc<CartState> {
        self.dispatch(CartAction::UpdateQuantity { cart_item_id, quantity })
    }

    pub fn update_item_comment(&mut self, cart_item_id: CartItemId, comment: impl Into<String>) -> &Arc<CartState> {
        self.dispatch(CartAction::UpdateItemComment { cart_item_id, comment: comment.into() })
    }

    pub fn update_customer_details(&mut self, patch: CustomerDetailsPatch) -> &Arc<CartState> {
        self.dispatch(CartAction::UpdateCustomerDetails(patch))
    }

    pub fn update_global_comment(&mut self, comment: impl Into<String>) -> &Arc<CartState> {
        self.dispatch(CartAction::UpdateGlobalComment { comment: comment.into() })
    }

    pub fn update_order_details(&mut self, patch: OrderDetailsPatch) -> &Arc<CartState> {
        self.dispatch(CartAction::UpdateOrderDetails(patch))
    }

    pub fn initialize_location(&mut self, location_id: impl Into<String>) -> &Arc<CartState> {
        self.dispatch(CartAction::InitializeLocation { location_id: location_id.into() })
    }

    pub fn set_location_id(&mut self, location_id: impl Into<String>) -> &Arc<CartState> {
        self.dispatch(CartAction::SetLocationId { location_id: location_id.into() })
    }

    pub fn clear(&mut self) -> &Arc<CartState> { self.dispatch(CartAction::ClearCart) }

    pub fn toggle_open(&mut self) -> &Arc<CartState> { self.dispatch(CartAction::ToggleCart) }

    pub fn total_price(&self) -> Decimal { self.state.total_price() }
}
