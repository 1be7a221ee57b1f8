use crate::core::cache::KeyValueCollection;
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::Mutex;
use tracing::debug;

/// In-memory collection backed by a `HashMap`.
#[derive(Default)]
pub struct MemoryCollection {
    inner: Mutex<HashMap<Vec<u8>, Vec<u8>>>,
}

impl MemoryCollection {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueCollection for MemoryCollection {
    async fn get(&self, key: &[u8]) -> Option<Vec<u8>> {
        let map = self.inner.lock().await;
        map.get(key).cloned()
    }

    async fn put(&self, key: &[u8], value: &[u8]) {
        let mut map = self.inner.lock().await;
        map.insert(key.to_vec(), value.to_vec());
        debug!("Memory PUT for key: {}", String::from_utf8_lossy(key));
    }
}
