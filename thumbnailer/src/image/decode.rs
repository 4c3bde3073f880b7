//! Image decoding

use imageproc::image::{load_from_memory, DynamicImage};

use crate::error::ThumbnailError;

/// Decode image from memory
///
/// The container format is sniffed from the bytes themselves, so an object
/// whose key says `.png` but holds a JPEG still decodes.
pub fn decode(data: &[u8]) -> Result<DynamicImage, ThumbnailError> {
    let img = load_from_memory(data).map_err(|e| ThumbnailError::Decode(e.to_string()))?;

    if img.width() == 0 || img.height() == 0 {
        return Err(ThumbnailError::Decode(format!(
            "image has no pixels ({}x{})",
            img.width(),
            img.height()
        )));
    }

    Ok(img)
}
