//! In-process storage. Clones share the same entries.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use super::{CartStorage, StorageError};

#[derive(Clone, Debug, Default)]
pub struct MemoryStorage {
    entries: Arc<Mutex<HashMap<String, String>>>,
    writes: Arc<AtomicUsize>,
}

impl MemoryStorage {
    pub fn new() -> Self { Self::default() }

    /// Number of successful writes since creation.
    pub fn write_count(&self) -> usize { self.writes.load(Ordering::SeqCst) }

    fn entries(&self) -> MutexGuard<'_, HashMap<String, String>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl CartStorage for MemoryStorage {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries().get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries().insert(key.to_string(), value.to_string());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.entries().remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_entries() {
        let storage = MemoryStorage::new();
        let other = storage.clone();
        storage.write("cart", "{}").unwrap();
        assert_eq!(other.read("cart").unwrap().as_deref(), Some("{}"));
        other.remove("cart").unwrap();
        assert_eq!(storage.read("cart").unwrap(), None);
        assert_eq!(storage.write_count(), 1);
    }
}
