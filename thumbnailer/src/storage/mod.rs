//! Object store seam: where source images come from and thumbnails go to.

mod local;
mod memory;

pub use local::LocalStore;
pub use memory::{MemoryStore, StoredObject};

use std::io::Read;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("object not found: {bucket}/{key}")]
    NotFound { bucket: String, key: String },

    #[error("access denied: {bucket}/{key}")]
    AccessDenied { bucket: String, key: String },

    /// The store received the request and refused it.
    #[error("{code}: {message}")]
    Service { code: String, message: String },

    #[error("storage i/o: {0}")]
    Io(#[from] std::io::Error),
}

impl StorageError {
    pub fn no_such_bucket(bucket: &str) -> Self {
        StorageError::Service {
            code: "NoSuchBucket".to_string(),
            message: format!("The specified bucket does not exist: {bucket}"),
        }
    }

    pub fn is_service(&self) -> bool {
        matches!(self, StorageError::Service { .. })
    }
}

/// Content headers stored with an uploaded object.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct UploadMetadata {
    pub content_length: u64,
    pub content_type: String,
}

impl UploadMetadata {
    pub fn new(content_length: u64, content_type: impl Into<String>) -> Self {
        Self {
            content_length,
            content_type: content_type.into(),
        }
    }

    /// Mirrors the store refusing a body that disagrees with its declared length.
    pub(crate) fn check_body(&self, body: &[u8]) -> Result<(), StorageError> {
        if body.len() as u64 != self.content_length {
            return Err(StorageError::Service {
                code: "IncompleteBody".to_string(),
                message: format!(
                    "declared {} bytes, received {}",
                    self.content_length,
                    body.len()
                ),
            });
        }
        Ok(())
    }
}

/// Readable object content.
pub type ObjectBody = Box<dyn Read + Send>;

/// Blocking object store. Calls return once the store has answered.
pub trait ObjectStore {
    fn get_object(&self, bucket: &str, key: &str) -> Result<ObjectBody, StorageError>;

    fn put_object(
        &self,
        bucket: &str,
        key: &str,
        body: &[u8],
        metadata: &UploadMetadata,
    ) -> Result<(), StorageError>;
}

impl<T: ObjectStore + ?Sized> ObjectStore for &T {
    fn get_object(&self, bucket: &str, key: &str) -> Result<ObjectBody, StorageError> {
        (**self).get_object(bucket, key)
    }

    fn put_object(
        &self,
        bucket: &str,
        key: &str,
        body: &[u8],
        metadata: &UploadMetadata,
    ) -> Result<(), StorageError> {
        (**self).put_object(bucket, key, body, metadata)
    }
}
