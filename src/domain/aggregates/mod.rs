//! Aggregates module
pub mod product;
pub mod cart;

pub use product::{Product, Variant};
pub use cart::{CartItem, CartState, CustomerDetails, SubSelection};
