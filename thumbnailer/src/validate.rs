//! Turns an event record into the locations and format of one thumbnail job,
//! or into a reason to leave the record alone.

use std::fmt;

use crate::config::DestinationNaming;
use crate::error::ThumbnailError;
use crate::event::S3EventRecord;
use crate::image::ImageFormat;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SourceReference {
    pub bucket: String,
    /// URL-decoded
    pub key: String,
}

impl SourceReference {
    pub fn from_record(record: &S3EventRecord) -> Result<Self, ThumbnailError> {
        Ok(Self {
            bucket: record.s3.bucket.name.clone(),
            key: record.s3.object.url_decoded_key()?,
        })
    }
}

impl fmt::Display for SourceReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.bucket, self.key)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DestinationReference {
    pub bucket: String,
    pub key: String,
}

impl DestinationReference {
    pub fn derive(source: &SourceReference, naming: &DestinationNaming) -> Self {
        Self {
            bucket: naming.bucket(&source.bucket),
            key: naming.key(&source.key),
        }
    }
}

impl fmt::Display for DestinationReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.bucket, self.key)
    }
}

/// Why a record was not processed. Not an error: the event is simply not ours.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    NoRecords,
    SameBucket { bucket: String },
    UnknownType { key: String },
    NonImage { key: String },
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::NoRecords => f.write_str("Event has no records."),
            SkipReason::SameBucket { .. } => {
                f.write_str("Destination bucket must not match source bucket.")
            }
            SkipReason::UnknownType { key } => {
                write!(f, "Unable to infer image type for key {key}")
            }
            SkipReason::NonImage { key } => write!(f, "Skipping non-image {key}"),
        }
    }
}

/// A record that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThumbnailRequest {
    pub source: SourceReference,
    pub destination: DestinationReference,
    pub format: ImageFormat,
}

pub fn validate(
    source: SourceReference,
    naming: &DestinationNaming,
) -> Result<ThumbnailRequest, SkipReason> {
    let destination = DestinationReference::derive(&source, naming);

    // writing into the source bucket would trigger us again, forever
    if source.bucket == destination.bucket {
        return Err(SkipReason::SameBucket {
            bucket: source.bucket,
        });
    }

    let format = infer_format(&source.key)?;

    Ok(ThumbnailRequest {
        source,
        destination,
        format,
    })
}

/// Format from the text after the last `.` of `key`.
///
/// Everything before that dot has to sit on one line; a key with a line
/// break ahead of its final dot has no recognisable extension.
pub fn infer_format(key: &str) -> Result<ImageFormat, SkipReason> {
    let unknown = || SkipReason::UnknownType {
        key: key.to_string(),
    };

    let (stem, extension) = key.rsplit_once('.').ok_or_else(unknown)?;
    if stem.contains(is_line_terminator) {
        return Err(unknown());
    }

    ImageFormat::from_extension(extension).ok_or_else(|| SkipReason::NonImage {
        key: key.to_string(),
    })
}

fn is_line_terminator(c: char) -> bool {
    matches!(c, '\n' | '\r' | '\u{85}' | '\u{2028}' | '\u{2029}')
}
