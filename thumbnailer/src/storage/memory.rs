use std::collections::HashMap;
use std::io::Cursor;
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::Mutex;

use super::{ObjectBody, ObjectStore, StorageError, UploadMetadata};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub data: Vec<u8>,
    pub content_type: Option<String>,
}

/// In-process store. Buckets must be created before they accept uploads.
#[derive(Debug, Default)]
pub struct MemoryStore {
    buckets: Mutex<HashMap<String, HashMap<String, StoredObject>>>,
    fetches: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create_bucket(&self, bucket: &str) {
        self.buckets.lock().entry(bucket.to_string()).or_default();
    }

    /// Store an object directly, creating its bucket if needed.
    pub fn insert(&self, bucket: &str, key: &str, data: impl Into<Vec<u8>>) {
        self.buckets
            .lock()
            .entry(bucket.to_string())
            .or_default()
            .insert(
                key.to_string(),
                StoredObject {
                    data: data.into(),
                    content_type: None,
                },
            );
    }

    pub fn object(&self, bucket: &str, key: &str) -> Option<StoredObject> {
        self.buckets.lock().get(bucket)?.get(key).cloned()
    }

    pub fn keys(&self, bucket: &str) -> Vec<String> {
        let buckets = self.buckets.lock();
        let mut keys: Vec<String> = buckets
            .get(bucket)
            .map(|objects| objects.keys().cloned().collect())
            .unwrap_or_default();
        keys.sort();
        keys
    }

    /// Number of `get_object` calls made so far.
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

impl ObjectStore for MemoryStore {
    fn get_object(&self, bucket: &str, key: &str) -> Result<ObjectBody, StorageError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);

        let object = self.object(bucket, key).ok_or_else(|| StorageError::NotFound {
            bucket: bucket.to_string(),
            key: key.to_string(),
        })?;

        Ok(Box::new(Cursor::new(object.data)))
    }

    fn put_object(
        &self,
        bucket: &str,
        key: &str,
        body: &[u8],
        metadata: &UploadMetadata,
    ) -> Result<(), StorageError> {
        metadata.check_body(body)?;

        let mut buckets = self.buckets.lock();
        let objects = buckets
            .get_mut(bucket)
            .ok_or_else(|| StorageError::no_such_bucket(bucket))?;

        objects.insert(
            key.to_string(),
            StoredObject {
                data: body.to_vec(),
                content_type: Some(metadata.content_type.clone()),
            },
        );
        Ok(())
    }
}
