pub mod config;
pub mod error;
pub mod event;
pub mod image;
pub mod pipeline;
pub mod storage;
pub mod validate;

// Re-export commonly used types
pub use config::{BoundingBox, DestinationNaming, RecordSelection, ThumbnailConfig};
pub use error::ThumbnailError;
pub use event::S3Event;
pub use image::{ImageFormat, ScalingPlan};
pub use pipeline::{Invocation, Outcome, Pipeline, Stage};
pub use storage::{LocalStore, MemoryStore, ObjectStore, StorageError, UploadMetadata};
pub use validate::{DestinationReference, SkipReason, SourceReference};
