use thiserror::Error;

use crate::image::ImageFormat;
use crate::pipeline::Stage;
use crate::storage::StorageError;

/// Errors that end an invocation in the `Failed` state.
///
/// Skips are not errors; see [`crate::validate::SkipReason`].
#[derive(Debug, Error)]
pub enum ThumbnailError {
    #[error("malformed event: {0}")]
    Event(String),

    #[error("failed to fetch {bucket}/{key}: {source}")]
    Fetch {
        bucket: String,
        key: String,
        #[source]
        source: StorageError,
    },

    #[error("failed to read {bucket}/{key}: {source}")]
    Read {
        bucket: String,
        key: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to decode image: {0}")]
    Decode(String),

    #[error("failed to scale image: {0}")]
    Scale(String),

    #[error("failed to encode {format} image: {message}")]
    Encode {
        format: ImageFormat,
        message: String,
    },

    #[error("failed to upload {bucket}/{key}: {source}")]
    Upload {
        bucket: String,
        key: String,
        #[source]
        source: StorageError,
    },

    /// The store accepted the request and refused it. A transformed image
    /// that cannot be written is not recoverable at the process level.
    #[error("upload of {bucket}/{key} rejected: {message}")]
    UploadRejected {
        bucket: String,
        key: String,
        message: String,
    },
}

impl ThumbnailError {
    /// Whether the runtime boundary should log this and exit non-zero instead
    /// of handing the error back to whoever invoked it.
    pub fn terminates_process(&self) -> bool {
        matches!(self, ThumbnailError::UploadRejected { .. })
    }

    /// The stage that was in progress when the error occurred.
    pub fn stage(&self) -> Stage {
        match self {
            ThumbnailError::Event(_) => Stage::Received,
            ThumbnailError::Fetch { .. } | ThumbnailError::Read { .. } => Stage::Validated,
            ThumbnailError::Decode(_) => Stage::Fetched,
            ThumbnailError::Scale(_) => Stage::Decoded,
            ThumbnailError::Encode { .. } => Stage::Scaled,
            ThumbnailError::Upload { .. } | ThumbnailError::UploadRejected { .. } => {
                Stage::Encoded
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_upload_rejection_terminates() {
        let rejected = ThumbnailError::UploadRejected {
            bucket: "photos-resized".into(),
            key: "resized-cat.png".into(),
            message: "NoSuchBucket".into(),
        };
        assert!(rejected.terminates_process());
        assert_eq!(rejected.stage(), Stage::Encoded);

        let transport = ThumbnailError::Upload {
            bucket: "photos-resized".into(),
            key: "resized-cat.png".into(),
            source: StorageError::Io(std::io::Error::other("connection reset")),
        };
        assert!(!transport.terminates_process());

        let decode = ThumbnailError::Decode("invalid header".into());
        assert!(!decode.terminates_process());
        assert_eq!(decode.stage(), Stage::Fetched);
    }

    #[test]
    fn display_names_the_object() {
        let err = ThumbnailError::Fetch {
            bucket: "photos".into(),
            key: "cat.png".into(),
            source: StorageError::NotFound {
                bucket: "photos".into(),
                key: "cat.png".into(),
            },
        };
        assert_eq!(
            err.to_string(),
            "failed to fetch photos/cat.png: object not found: photos/cat.png"
        );
    }

    #[test]
    fn error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ThumbnailError>();
    }
}
