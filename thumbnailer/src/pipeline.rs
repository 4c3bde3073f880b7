//! One invocation: validate → fetch → decode → scale → encode → upload.

use std::fmt;
use std::io::Read;

use crate::config::{RecordSelection, ThumbnailConfig};
use crate::error::ThumbnailError;
use crate::event::{S3Event, S3EventRecord};
use crate::image::{self, ImageFormat, ScalingPlan};
use crate::storage::{ObjectStore, StorageError, UploadMetadata};
use crate::validate::{self, DestinationReference, SkipReason, SourceReference, ThumbnailRequest};

/// Result string for an invocation that uploaded a thumbnail.
pub const RESULT_OK: &str = "Ok";
/// Result string for an invocation that skipped its input.
pub const RESULT_SKIPPED: &str = "";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Received,
    Validated,
    Fetched,
    Decoded,
    Scaled,
    Encoded,
    Uploaded,
    Done,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Received => write!(f, "received"),
            Stage::Validated => write!(f, "validated"),
            Stage::Fetched => write!(f, "fetched"),
            Stage::Decoded => write!(f, "decoded"),
            Stage::Scaled => write!(f, "scaled"),
            Stage::Encoded => write!(f, "encoded"),
            Stage::Uploaded => write!(f, "uploaded"),
            Stage::Done => write!(f, "done"),
        }
    }
}

/// A thumbnail that made it to the destination.
#[derive(Debug, Clone, PartialEq)]
pub struct Uploaded {
    pub source: SourceReference,
    pub destination: DestinationReference,
    pub format: ImageFormat,
    pub source_dimensions: (u32, u32),
    pub plan: ScalingPlan,
    pub metadata: UploadMetadata,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Uploaded(Uploaded),
    Skipped(SkipReason),
}

/// What an invocation did with each record it looked at.
#[derive(Debug, Clone, PartialEq)]
pub struct Invocation {
    outcomes: Vec<Outcome>,
}

impl Invocation {
    pub fn outcomes(&self) -> &[Outcome] {
        &self.outcomes
    }

    pub fn uploads(&self) -> impl Iterator<Item = &Uploaded> {
        self.outcomes.iter().filter_map(|outcome| match outcome {
            Outcome::Uploaded(uploaded) => Some(uploaded),
            Outcome::Skipped(_) => None,
        })
    }

    /// `"Ok"` if anything was uploaded, `""` if every record was skipped.
    pub fn result(&self) -> &'static str {
        if self.uploads().next().is_some() {
            RESULT_OK
        } else {
            RESULT_SKIPPED
        }
    }
}

pub struct Pipeline<S> {
    store: S,
    config: ThumbnailConfig,
}

impl<S: ObjectStore> Pipeline<S> {
    pub fn new(store: S, config: ThumbnailConfig) -> Self {
        Self { store, config }
    }

    /// Handle one notification.
    ///
    /// Only the first record is read unless the config selects all of them.
    /// With several records the first error ends the invocation; uploads
    /// already made are kept.
    pub fn handle(&self, event: &S3Event) -> Result<Invocation, ThumbnailError> {
        let records = match self.config.records {
            RecordSelection::First => &event.records[..event.records.len().min(1)],
            RecordSelection::All => &event.records[..],
        };

        if records.is_empty() {
            log::info!("{}", SkipReason::NoRecords);
            return Ok(Invocation {
                outcomes: vec![Outcome::Skipped(SkipReason::NoRecords)],
            });
        }

        if records.len() < event.records.len() {
            log::debug!(
                "Ignoring {} record(s) after the first",
                event.records.len() - records.len()
            );
        }

        let outcomes = records
            .iter()
            .map(|record| self.process_record(record))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Invocation { outcomes })
    }

    pub fn process_record(&self, record: &S3EventRecord) -> Result<Outcome, ThumbnailError> {
        let source = SourceReference::from_record(record)?;
        log::debug!("{source}: {}", Stage::Received);

        let request = match validate::validate(source, &self.config.naming) {
            Ok(request) => request,
            Err(reason) => {
                log::info!("{reason}");
                return Ok(Outcome::Skipped(reason));
            }
        };

        self.transform(request).map(Outcome::Uploaded)
    }

    fn transform(&self, request: ThumbnailRequest) -> Result<Uploaded, ThumbnailError> {
        let ThumbnailRequest {
            source,
            destination,
            format,
        } = request;
        log::debug!("{source}: {} as {format}", Stage::Validated);

        let data = self.fetch(&source)?;
        log::debug!("{source}: {} {} bytes", Stage::Fetched, data.len());

        let img = image::decode(&data)?;
        let source_dimensions = (img.width(), img.height());
        log::debug!(
            "{source}: {} {}x{}",
            Stage::Decoded,
            source_dimensions.0,
            source_dimensions.1
        );

        let plan = ScalingPlan::fit(img.width(), img.height(), self.config.bounding_box);
        log::trace!("{source}: {plan:?}");
        let grid = image::resize(&img, &plan)?;
        log::debug!("{source}: {} to {}x{}", Stage::Scaled, plan.width, plan.height);

        let encoded = image::encode(&grid, format)?;
        let metadata = encoded.upload_metadata();
        log::debug!("{source}: {} {} bytes", Stage::Encoded, encoded.len());

        log::info!("Writing to: {destination}");
        self.upload(&destination, &encoded.data, &metadata)?;
        log::debug!("{source}: {}", Stage::Uploaded);

        log::info!(
            "Successfully resized {}/{} and uploaded to {}/{}",
            source.bucket,
            source.key,
            destination.bucket,
            destination.key
        );
        log::debug!("{source}: {}", Stage::Done);

        Ok(Uploaded {
            source,
            destination,
            format,
            source_dimensions,
            plan,
            metadata,
        })
    }

    fn fetch(&self, source: &SourceReference) -> Result<Vec<u8>, ThumbnailError> {
        let mut body = self
            .store
            .get_object(&source.bucket, &source.key)
            .map_err(|e| ThumbnailError::Fetch {
                bucket: source.bucket.clone(),
                key: source.key.clone(),
                source: e,
            })?;

        let mut data = Vec::new();
        body.read_to_end(&mut data)
            .map_err(|e| ThumbnailError::Read {
                bucket: source.bucket.clone(),
                key: source.key.clone(),
                source: e,
            })?;

        Ok(data)
    }

    fn upload(
        &self,
        destination: &DestinationReference,
        body: &[u8],
        metadata: &UploadMetadata,
    ) -> Result<(), ThumbnailError> {
        self.store
            .put_object(&destination.bucket, &destination.key, body, metadata)
            .map_err(|e| match e {
                StorageError::Service { code, message } => ThumbnailError::UploadRejected {
                    bucket: destination.bucket.clone(),
                    key: destination.key.clone(),
                    message: format!("{code}: {message}"),
                },
                other => ThumbnailError::Upload {
                    bucket: destination.bucket.clone(),
                    key: destination.key.clone(),
                    source: other,
                },
            })
    }
}
