use crate::core::cache::KeyValueCollection;
use async_trait::async_trait;
use fjall::PartitionHandle;
use tracing::debug;

/// Persistent collection stored in a `fjall` partition.
pub struct DiskCollection {
    partition: PartitionHandle,
}

impl DiskCollection {
    pub fn new(partition: PartitionHandle) -> Self {
        Self { partition }
    }
}

#[async_trait]
impl KeyValueCollection for DiskCollection {
    async fn get(&self, key: &[u8]) -> Option<Vec<u8>> {
        match self.partition.get(key) {
            Ok(value) => value.map(|v| v.to_vec()),
            Err(e) => {
                debug!("DiskCollection get error: {}", e);
                None
            }
        }
    }

    async fn put(&self, key: &[u8], value: &[u8]) {
        match self.partition.insert(key, value) {
            Ok(()) => debug!("Disk PUT for key: {}", String::from_utf8_lossy(key)),
            Err(e) => debug!("DiskCollection put error: {}", e),
        }
    }

}

#[cfg(test)]
mod tests {
    use super::*;
    use fjall::PartitionCreateOptions;
    use tempfile::tempdir;

    fn open_collection(path: &std::path::Path) -> (fjall::Keyspace, DiskCollection) {
        let keyspace = fjall::Config::new(path).open().unwrap();
        let partition = keyspace
            .open_partition("test", PartitionCreateOptions::default())
            .unwrap();
        (keyspace, DiskCollection::new(partition))
    }

    #[tokio::test]
    async fn test_disk_collection_get_put() {
        let dir = tempdir().unwrap();
        let (_keyspace, collection) = open_collection(dir.path());

        assert!(collection.get(b"key1").await.is_none());

        collection.put(b"key1", b"123").await;
        assert_eq!(collection.get(b"key1").await, Some(b"123".to_vec()));
        assert!(collection.get(b"key2").await.is_none());
    }
}
