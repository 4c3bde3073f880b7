//! Object-created notifications, in the shape the object store delivers them.

use std::io::Read;

use serde::{Deserialize, Serialize};

use crate::error::ThumbnailError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct S3Event {
    #[serde(rename = "Records", default)]
    pub records: Vec<S3EventRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct S3EventRecord {
    #[serde(rename = "eventName", default, skip_serializing_if = "Option::is_none")]
    pub event_name: Option<String>,
    pub s3: S3Entity,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct S3Entity {
    pub bucket: S3Bucket,
    pub object: S3Object,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct S3Bucket {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct S3Object {
    /// URL-encoded, as delivered.
    pub key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
}

impl S3Event {
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    pub fn from_reader(reader: impl Read) -> serde_json::Result<Self> {
        serde_json::from_reader(reader)
    }

    /// A notification carrying one record. `key` is taken as already encoded.
    pub fn single(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            records: vec![S3EventRecord::new(bucket, key)],
        }
    }
}

impl S3EventRecord {
    pub fn new(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            event_name: Some("ObjectCreated:Put".to_string()),
            s3: S3Entity {
                bucket: S3Bucket { name: bucket.into() },
                object: S3Object {
                    key: key.into(),
                    size: None,
                },
            },
        }
    }
}

impl S3Object {
    /// Key with the store's form-style encoding undone: `+` is a space and
    /// `%XX` escapes are UTF-8 bytes.
    ///
    /// A `%` without two hex digits after it is an error. Escaped bytes that
    /// are not UTF-8 come out as U+FFFD.
    pub fn url_decoded_key(&self) -> Result<String, ThumbnailError> {
        if let Some(at) = malformed_escape(&self.key) {
            return Err(ThumbnailError::Event(format!(
                "object key {:?}: malformed escape at byte {at}",
                self.key
            )));
        }

        let spaced = self.key.replace('+', " ");
        let bytes = urlencoding::decode_binary(spaced.as_bytes());
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

/// Offset of the first `%` not followed by two hex digits.
fn malformed_escape(key: &str) -> Option<usize> {
    let bytes = key.as_bytes();
    bytes
        .iter()
        .enumerate()
        .filter(|(_, &b)| b == b'%')
        .map(|(i, _)| i)
        .find(|&i| {
            !matches!(
                bytes.get(i + 1..i + 3),
                Some([hi, lo]) if hi.is_ascii_hexdigit() && lo.is_ascii_hexdigit()
            )
        })
}
