pub mod disk;
pub mod memory;

use crate::core::cache::{KeyValueCollection, Store};
use disk::DiskCollection;
use fjall::{Keyspace, PartitionCreateOptions, PersistMode};
use memory::MemoryCollection;
use std::{
    collections::HashMap,
    path::Path,
    sync::{Arc, RwLock},
};
use tracing::{debug, warn};

/// A thread-safe key-value store that can hold multiple collections.
pub struct KeyValueStore {
    collections: RwLock<HashMap<String, Arc<dyn KeyValueCollection>>>,
    keyspace: Option<Keyspace>,
}

impl KeyValueStore {
    /// Opens a store whose persistent collections live under `data_path/cache`.
    ///
    /// When the keyspace cannot be opened, persistent collections degrade to
    /// in-memory ones.
    pub fn open(data_path: &Path) -> Self {
        let cache_dir = data_path.join("cache");
        let keyspace = match fjall::Config::new(&cache_dir).open() {
            Ok(keyspace) => {
                debug!("Opened cache keyspace at {}", cache_dir.display());
                Some(keyspace)
            }
            Err(e) => {
                warn!(
                    "Could not open cache at {}: {}. Using in-memory cache",
                    cache_dir.display(),
                    e
                );
                None
            }
        };

        Self {
            collections: RwLock::new(HashMap::new()),
            keyspace,
        }
    }

    /// Creates a store without any disk backing.
    pub fn in_memory() -> Self {
        Self {
            collections: RwLock::new(HashMap::new()),
            keyspace: None,
        }
    }

    /// Syncs pending writes of persistent collections to disk.
    pub fn flush(&self) {
        if let Some(keyspace) = &self.keyspace {
            if let Err(e) = keyspace.persist(PersistMode::SyncAll) {
                warn!("Failed to persist cache: {}", e);
            }
        }
    }

    fn create_collection(&self, name: &str, persist: bool) -> Arc<dyn KeyValueCollection> {
        if persist {
            if let Some(keyspace) = &self.keyspace {
                match keyspace.open_partition(name, PartitionCreateOptions::default()) {
                    Ok(partition) => return Arc::new(DiskCollection::new(partition)),
                    Err(e) => warn!("Failed to open partition {}: {}", name, e),
                }
            }
        }
        Arc::new(MemoryCollection::new())
    }
}

impl Default for KeyValueStore {
    fn default() -> Self {
        Self::in_memory()
    }
}

impl Store for KeyValueStore {
    fn get_collection(&self, name: &str, persist: bool) -> Arc<dyn KeyValueCollection> {
        if let Some(collection) = self
            .collections
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(name)
        {
            return Arc::clone(collection);
        }

        let mut collections = self.collections.write().unwrap_or_else(|e| e.into_inner());
        let collection = collections
            .entry(name.to_string())
            .or_insert_with(|| self.create_collection(name, persist));
        Arc::clone(collection)
    }
}
