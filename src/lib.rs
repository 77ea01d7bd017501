//! OpenSASE Cart
//!
//! Storefront shopping-cart state engine for the OpenSASE ordering menu.
//!
//! ## Features
//! - Single-writer cart store driven by a pure reducer
//! - Variant-aware unit price resolution
//! - Unique cart line identities
//! - Persistence of cart state with change detection
//! - HTTP cart session service

pub mod api;
pub mod config;
pub mod domain;
pub mod persistence;
pub mod store;

use thiserror::Error;

pub use config::{Config, ConfigError};
pub use domain::actions::{CartAction, CustomerDetailsPatch, OrderDetailsPatch};
pub use domain::aggregates::{CartItem, CartState, CustomerDetails, Product, SubSelection, Variant};
pub use domain::reducer::reduce;
pub use domain::value_objects::{CartItemId, UnitPrice};
pub use persistence::{CartStorage, FileStorage, Hydration, MemoryStorage, PersistenceSync, StorageError};
pub use store::{CartObserver, CartStore};

// =============================================================================
// Error Types
// =============================================================================

#[derive(Error, Debug)]
pub enum CartError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

pub type Result<T> = std::result::Result<T, CartError>;
