use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

/// Largest thumbnail size; output never exceeds it on either axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct BoundingBox {
    pub width: u32,
    pub height: u32,
}

impl BoundingBox {
    pub fn new(width: u32, height: u32) -> Result<Self> {
        if width == 0 || height == 0 {
            anyhow::bail!("bounding box must be at least 1x1, got {width}x{height}");
        }
        Ok(Self { width, height })
    }
}

impl Default for BoundingBox {
    fn default() -> Self {
        Self {
            width: 100,
            height: 100,
        }
    }
}

/// How a destination is named from its source.
///
/// Bucket: `<source-bucket><bucket_suffix>`. Key: `<key_prefix><source-key>`.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct DestinationNaming {
    pub bucket_suffix: String,
    pub key_prefix: String,
}

impl DestinationNaming {
    pub fn bucket(&self, source_bucket: &str) -> String {
        format!("{source_bucket}{}", self.bucket_suffix)
    }

    pub fn key(&self, source_key: &str) -> String {
        format!("{}{source_key}", self.key_prefix)
    }
}

impl Default for DestinationNaming {
    fn default() -> Self {
        Self {
            bucket_suffix: "-resized".to_string(),
            key_prefix: "resized-".to_string(),
        }
    }
}

/// Which records of a notification are processed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum RecordSelection {
    /// Only the first record; any others are ignored.
    #[default]
    First,
    /// Every record, in order.
    All,
}

#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ThumbnailConfig {
    pub bounding_box: BoundingBox,
    pub naming: DestinationNaming,
    pub records: RecordSelection,
}

impl ThumbnailConfig {
    /// Read a JSON config. Missing fields take their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;

        let config: Self = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse config {}", path.display()))?;

        // re-validate, serde bypasses the constructor
        BoundingBox::new(config.bounding_box.width, config.bounding_box.height)?;

        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_thumbnail_constants() {
        let config = ThumbnailConfig::default();
        assert_eq!(config.bounding_box, BoundingBox { width: 100, height: 100 });
        assert_eq!(config.naming.bucket("photos"), "photos-resized");
        assert_eq!(config.naming.key("pics/cat.png"), "resized-pics/cat.png");
        assert_eq!(config.records, RecordSelection::First);
    }

    #[test]
    fn zero_sized_box_is_rejected() {
        assert!(BoundingBox::new(0, 100).is_err());
        assert!(BoundingBox::new(100, 0).is_err());
        assert!(BoundingBox::new(1, 1).is_ok());
    }

    #[test]
    fn partial_json_takes_defaults() {
        let config: ThumbnailConfig =
            serde_json::from_str(r#"{ "bounding_box": { "width": 64, "height": 48 } }"#).unwrap();
        assert_eq!(config.bounding_box, BoundingBox { width: 64, height: 48 });
        assert_eq!(config.naming, DestinationNaming::default());

        let config: ThumbnailConfig =
            serde_json::from_str(r#"{ "naming": { "key_prefix": "thumb/" }, "records": "All" }"#)
                .unwrap();
        assert_eq!(config.naming.bucket_suffix, "-resized");
        assert_eq!(config.naming.key("a.jpg"), "thumb/a.jpg");
        assert_eq!(config.records, RecordSelection::All);
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");

        let config = ThumbnailConfig {
            bounding_box: BoundingBox::new(320, 240).unwrap(),
            naming: DestinationNaming {
                bucket_suffix: "-thumbs".into(),
                key_prefix: String::new(),
            },
            records: RecordSelection::All,
        };
        config.save(&path).unwrap();

        assert_eq!(ThumbnailConfig::load(&path).unwrap(), config);
    }

    #[test]
    fn load_rejects_zero_box() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{ "bounding_box": { "width": 0, "height": 10 } }"#).unwrap();

        assert!(ThumbnailConfig::load(&path).is_err());
    }
}
