use std::fs::{self, File};
use std::io;
use std::path::{Component, Path, PathBuf};

use super::{ObjectBody, ObjectStore, StorageError, UploadMetadata};

const METADATA_DIR: &str = ".metadata";

/// Buckets as directories under a root: `<root>/<bucket>/<key>`.
///
/// Content headers go to `<root>/.metadata/<bucket>/<key>.json`.
#[derive(Debug, Clone)]
pub struct LocalStore {
    root: PathBuf,
}

impl LocalStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Headers recorded for an uploaded object, if any.
    pub fn metadata(&self, bucket: &str, key: &str) -> Result<Option<UploadMetadata>, StorageError> {
        let path = self.metadata_path(bucket, key)?;
        match fs::read(&path) {
            Ok(bytes) => serde_json::from_slice(&bytes)
                .map(Some)
                .map_err(|e| StorageError::Io(io::Error::new(io::ErrorKind::InvalidData, e))),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn bucket_path(&self, bucket: &str, key: &str) -> Result<PathBuf, StorageError> {
        if bucket.is_empty() || bucket.starts_with('.') || !is_plain_relative(Path::new(bucket)) {
            return Err(access_denied(bucket, key));
        }
        Ok(self.root.join(bucket))
    }

    fn object_path(&self, bucket: &str, key: &str) -> Result<PathBuf, StorageError> {
        let bucket_dir = self.bucket_path(bucket, key)?;
        if key.is_empty() || !is_plain_relative(Path::new(key)) {
            return Err(access_denied(bucket, key));
        }
        Ok(bucket_dir.join(key))
    }

    fn metadata_path(&self, bucket: &str, key: &str) -> Result<PathBuf, StorageError> {
        // validates both names
        self.object_path(bucket, key)?;
        Ok(self
            .root
            .join(METADATA_DIR)
            .join(bucket)
            .join(format!("{key}.json")))
    }
}

/// No `..`, no root, no drive prefix: the path stays below whatever it is joined to.
fn is_plain_relative(path: &Path) -> bool {
    path.components()
        .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
}

fn access_denied(bucket: &str, key: &str) -> StorageError {
    StorageError::AccessDenied {
        bucket: bucket.to_string(),
        key: key.to_string(),
    }
}

fn map_io(err: io::Error, bucket: &str, key: &str) -> StorageError {
    match err.kind() {
        io::ErrorKind::NotFound => StorageError::NotFound {
            bucket: bucket.to_string(),
            key: key.to_string(),
        },
        io::ErrorKind::PermissionDenied => access_denied(bucket, key),
        _ => StorageError::Io(err),
    }
}

impl ObjectStore for LocalStore {
    fn get_object(&self, bucket: &str, key: &str) -> Result<ObjectBody, StorageError> {
        let path = self.object_path(bucket, key)?;
        if path.is_dir() {
            return Err(StorageError::NotFound {
                bucket: bucket.to_string(),
                key: key.to_string(),
            });
        }

        let file = File::open(&path).map_err(|e| map_io(e, bucket, key))?;
        Ok(Box::new(file))
    }

    fn put_object(
        &self,
        bucket: &str,
        key: &str,
        body: &[u8],
        metadata: &UploadMetadata,
    ) -> Result<(), StorageError> {
        metadata.check_body(body)?;

        if !self.bucket_path(bucket, key)?.is_dir() {
            return Err(StorageError::no_such_bucket(bucket));
        }

        let path = self.object_path(bucket, key)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| map_io(e, bucket, key))?;
        }
        fs::write(&path, body).map_err(|e| map_io(e, bucket, key))?;

        let metadata_path = self.metadata_path(bucket, key)?;
        if let Some(parent) = metadata_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_vec_pretty(metadata)
            .map_err(|e| StorageError::Io(io::Error::new(io::ErrorKind::InvalidData, e)))?;
        fs::write(&metadata_path, json)?;

        log::trace!("Stored {} bytes at {}", body.len(), path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Read;

    use super::*;

    fn store_with_buckets(buckets: &[&str]) -> (tempfile::TempDir, LocalStore) {
        let dir = tempfile::tempdir().unwrap();
        for bucket in buckets {
            fs::create_dir_all(dir.path().join(bucket)).unwrap();
        }
        let store = LocalStore::new(dir.path());
        (dir, store)
    }

    #[test]
    fn reads_nested_keys() {
        let (dir, store) = store_with_buckets(&["photos"]);
        fs::create_dir_all(dir.path().join("photos/pics")).unwrap();
        fs::write(dir.path().join("photos/pics/cat.png"), b"meow").unwrap();

        let mut data = Vec::new();
        store
            .get_object("photos", "pics/cat.png")
            .unwrap()
            .read_to_end(&mut data)
            .unwrap();
        assert_eq!(data, b"meow");
    }

    #[test]
    fn missing_objects_and_buckets_are_not_found() {
        let (_dir, store) = store_with_buckets(&["photos"]);
        assert!(matches!(
            store.get_object("photos", "missing.png"),
            Err(StorageError::NotFound { .. })
        ));
        assert!(matches!(
            store.get_object("nope", "missing.png"),
            Err(StorageError::NotFound { .. })
        ));
        assert!(matches!(
            store.get_object("photos", "."),
            Err(StorageError::NotFound { .. })
        ));
    }

    #[test]
    fn escaping_the_root_is_denied() {
        let (_dir, store) = store_with_buckets(&["photos"]);
        assert!(matches!(
            store.get_object("photos", "../../etc/passwd"),
            Err(StorageError::AccessDenied { .. })
        ));
        assert!(matches!(
            store.get_object("..", "x.png"),
            Err(StorageError::AccessDenied { .. })
        ));
        assert!(matches!(
            store.get_object(METADATA_DIR, "x.png"),
            Err(StorageError::AccessDenied { .. })
        ));
    }

    #[test]
    fn put_writes_object_and_metadata() {
        let (dir, store) = store_with_buckets(&["photos-resized"]);
        let meta = UploadMetadata::new(5, "image/jpeg");

        store
            .put_object("photos-resized", "resized-a b/c.jpg", b"jpeg!", &meta)
            .unwrap();

        assert_eq!(
            fs::read(dir.path().join("photos-resized/resized-a b/c.jpg")).unwrap(),
            b"jpeg!"
        );
        assert_eq!(
            store.metadata("photos-resized", "resized-a b/c.jpg").unwrap(),
            Some(meta)
        );
        assert_eq!(store.metadata("photos-resized", "other.jpg").unwrap(), None);
    }

    #[test]
    fn put_into_missing_bucket_is_rejected() {
        let (dir, store) = store_with_buckets(&["photos"]);
        let meta = UploadMetadata::new(1, "image/png");

        let err = store
            .put_object("photos-resized", "resized-x.png", b"x", &meta)
            .unwrap_err();
        assert!(err.is_service(), "{err}");
        assert!(!dir.path().join("photos-resized").exists());
    }
}
