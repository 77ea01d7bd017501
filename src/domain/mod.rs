//! Cart domain: catalog snapshots, the cart aggregate and its transitions.

pub mod actions;
pub mod aggregates;
pub mod identity;
mod lenient;
pub mod pricing;
pub mod reducer;
pub mod value_objects;
