//! Cart persistence
//!
//! [`PersistenceSync`] bridges a [`CartStore`] to a key-value [`CartStorage`]:
//! it hydrates the store once when attached and afterwards writes the full
//! state whenever a dispatch produced a new one.

mod file;
mod memory;

pub use file::FileStorage;
pub use memory::MemoryStorage;

use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};
use crate::domain::actions::CartAction;
use crate::domain::aggregates::CartState;
use crate::store::{CartObserver, CartStore};

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Invalid storage key: {0:?}")]
    InvalidKey(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Durable string store keyed by name.
pub trait CartStorage: Send {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn write(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

impl<T: CartStorage + Sync + ?Sized> CartStorage for Arc<T> {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> { (**self).read(key) }
    fn write(&self, key: &str, value: &str) -> Result<(), StorageError> { (**self).write(key, value) }
    fn remove(&self, key: &str) -> Result<(), StorageError> { (**self).remove(key) }
}

/// What a mount found under its key.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Hydration {
    Restored,
    Missing,
    /// The entry was unreadable and has been deleted.
    Discarded,
    /// Storage could not be read; the store kept its initial state.
    Failed,
}

impl Hydration {
    /// Whether anything was stored under the key before the mount.
    pub fn found(self) -> bool { !matches!(self, Self::Missing) }
}

#[derive(Debug)]
pub struct PersistenceSync<S> {
    storage: S,
    key: String,
    hydrated: bool,
    last_written: Option<Arc<CartState>>,
}

impl<S: CartStorage + 'static> PersistenceSync<S> {
    pub fn new(storage: S, key: impl Into<String>) -> Self {
        Self { storage, key: key.into(), hydrated: false, last_written: None }
    }

    /// Hydrate `store` from storage and subscribe a synchronizer to it.
    pub fn attach(storage: S, key: impl Into<String>, store: &mut CartStore) -> Hydration {
        let mut sync = Self::new(storage, key);
        let hydration = sync.hydrate(store);
        store.subscribe(Box::new(sync));
        hydration
    }

    /// Mount-time load. Never writes; a corrupted entry is deleted and the
    /// store keeps its initial state.
    pub fn hydrate(&mut self, store: &mut CartStore) -> Hydration {
        let hydration = match self.storage.read(&self.key) {
            Ok(Some(raw)) => match CartState::from_json(&raw) {
                Ok(loaded) => {
                    info!(key = %self.key, items = loaded.line_count(), "restored saved cart");
                    store.dispatch(CartAction::LoadCart(Box::new(loaded)));
                    Hydration::Restored
                }
                Err(err) => {
                    warn!(key = %self.key, error = %err, "discarding unreadable saved cart");
                    if let Err(err) = self.storage.remove(&self.key) {
                        warn!(key = %self.key, error = %err, "failed to delete unreadable saved cart");
                    }
                    Hydration::Discarded
                }
            },
            Ok(None) => {
                debug!(key = %self.key, "no saved cart");
                Hydration::Missing
            }
            Err(err) => {
                warn!(key = %self.key, error = %err, "failed to read saved cart");
                Hydration::Failed
            }
        };
        self.last_written = Some(Arc::clone(store.state()));
        self.hydrated = true;
        hydration
    }

    fn persist(&self, state: &CartState) {
        let json = match serde_json::to_string(state) {
            Ok(json) => json,
            Err(err) => {
                warn!(key = %self.key, error = %err, "failed to serialize cart");
                return;
            }
        };
        match self.storage.write(&self.key, &json) {
            Ok(()) => debug!(key = %self.key, bytes = json.len(), "cart saved"),
            Err(err) => warn!(key = %self.key, error = %err, "failed to save cart"),
        }
    }
}

impl<S: CartStorage + 'static> CartObserver for PersistenceSync<S> {
    fn state_changed(&mut self, state: &Arc<CartState>) {
        if !self.hydrated {
            return;
        }
        if self.last_written.as_ref().is_some_and(|last| Arc::ptr_eq(last, state)) {
            return;
        }
        self.persist(state);
        self.last_written = Some(Arc::clone(state));
    }
}
