//! Image encoding: JPEG, PNG

use imageproc::image::codecs::jpeg::JpegEncoder;
use imageproc::image::codecs::png::PngEncoder;
use imageproc::image::ImageResult;

use super::{ImageFormat, PixelGrid};
use crate::error::ThumbnailError;
use crate::storage::UploadMetadata;

/// Encoded thumbnail bytes, ready for upload.
#[derive(Debug, Clone)]
pub struct EncodedImage {
    pub data: Vec<u8>,
    pub format: ImageFormat,
}

impl EncodedImage {
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn upload_metadata(&self) -> UploadMetadata {
        UploadMetadata::new(self.data.len() as u64, self.format.mime_type())
    }
}

/// Compress an image to JPEG with the encoder's default quality
pub fn compress_to_jpeg<W>(img: &PixelGrid, writer: &mut W) -> ImageResult<()>
where
    W: std::io::Write,
{
    let mut encoder = JpegEncoder::new(writer);
    encoder.encode_image(img)
}

/// Compress an image to PNG with the encoder's default compression
pub fn compress_to_png<W>(img: &PixelGrid, writer: &mut W) -> ImageResult<()>
where
    W: std::io::Write,
{
    img.write_with_encoder(PngEncoder::new(writer))
}

pub fn encode(img: &PixelGrid, format: ImageFormat) -> Result<EncodedImage, ThumbnailError> {
    let (width, height) = img.dimensions();
    let mut buffer = Vec::with_capacity(capacity_hint(width, height));

    match format {
        ImageFormat::Jpeg => compress_to_jpeg(img, &mut buffer),
        ImageFormat::Png => compress_to_png(img, &mut buffer),
    }
    .map_err(|e| ThumbnailError::Encode {
        format,
        message: e.to_string(),
    })?;

    log::trace!("Encoded {width}x{height} {format}: {} bytes", buffer.len());

    Ok(EncodedImage {
        data: buffer,
        format,
    })
}

/// One byte per pixel, multiplied in `usize`.
fn capacity_hint(width: u32, height: u32) -> usize {
    (width as usize).saturating_mul(height as usize)
}
