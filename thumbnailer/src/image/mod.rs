//! Image stages of a thumbnail: decode, fit to a bounding box, re-encode

mod decode;
mod encode;
mod scale;

pub use decode::decode;
pub use encode::{encode, EncodedImage};
pub use scale::{resize, ScalingPlan};

use std::fmt;

use imageproc::image::RgbImage;
use strum::{EnumIter, IntoEnumIterator};


/// Opaque 8-bit RGB pixels, the representation between decode and encode.
pub type PixelGrid = RgbImage;

/// Raster formats the thumbnailer reads and writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter)]
pub enum ImageFormat {
    Jpeg,
    Png,
}

impl ImageFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ImageFormat::Jpeg => "jpg",
            ImageFormat::Png => "png",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            ImageFormat::Jpeg => "image/jpeg",
            ImageFormat::Png => "image/png",
        }
    }

    /// Exact, case-sensitive match against the canonical extension.
    pub fn from_extension(extension: &str) -> Option<Self> {
        Self::iter().find(|format| format.extension() == extension)
    }
}

impl fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImageFormat::Jpeg => f.write_str("JPEG"),
            ImageFormat::Png => f.write_str("PNG"),
        }
    }
}
