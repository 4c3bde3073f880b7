//! Fit-inside-the-box scaling with bilinear resampling over a white background

use fast_image_resize as fr;
use fr::images::Image as FrImage;
use imageproc::image::{imageops, DynamicImage, Rgb, Rgba, RgbaImage};

use super::PixelGrid;
use crate::config::BoundingBox;
use crate::error::ThumbnailError;

const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);

/// Target size for a thumbnail, and the factor that produced it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScalingPlan {
    pub factor: f32,
    pub width: u32,
    pub height: u32,
}

impl ScalingPlan {
    /// Largest size that fits `bounds` without distorting the source.
    ///
    /// The factor is the smaller of the two axis ratios, so whichever axis
    /// would overflow the box first is the binding one. Products are truncated
    /// toward zero and each side is kept at least one pixel wide.
    pub fn fit(width: u32, height: u32, bounds: BoundingBox) -> Self {
        let width_ratio = bounds.width as f32 / width as f32;
        let height_ratio = bounds.height as f32 / height as f32;
        let factor = width_ratio.min(height_ratio);

        let new_width = (factor * width as f32) as u32;
        let new_height = (factor * height as f32) as u32;

        ScalingPlan {
            factor,
            width: new_width.max(1),
            height: new_height.max(1),
        }
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

/// Resample `img` to the plan's size and flatten it onto white.
///
/// Each output pixel blends the four source pixels nearest its sample
/// point, whatever the scale factor.
///
/// Translucent source pixels are blended over the background, fully
/// transparent ones come out pure white.
pub fn resize(img: &DynamicImage, plan: &ScalingPlan) -> Result<PixelGrid, ThumbnailError> {
    let src = img.to_rgba8();
    let (width, height) = src.dimensions();
    let (new_width, new_height) = plan.dimensions();

    let src_image = FrImage::from_vec_u8(width, height, src.into_raw(), fr::PixelType::U8x4)
        .map_err(|e| ThumbnailError::Scale(format!("invalid source buffer: {e}")))?;

    let mut dst_image = FrImage::new(new_width, new_height, fr::PixelType::U8x4);

    let mut resizer = fr::Resizer::new();
    resizer
        .resize(
            &src_image,
            &mut dst_image,
            Some(
                &fr::ResizeOptions::new()
                    .resize_alg(fr::ResizeAlg::Interpolation(fr::FilterType::Bilinear)),
            ),
        )
        .map_err(|e| ThumbnailError::Scale(e.to_string()))?;

    let resized = RgbaImage::from_raw(new_width, new_height, dst_image.into_vec())
        .ok_or_else(|| ThumbnailError::Scale("resized buffer has the wrong size".to_string()))?;

    let mut canvas = RgbaImage::from_pixel(new_width, new_height, WHITE);
    imageops::overlay(&mut canvas, &resized, 0, 0);

    Ok(imageproc::map::map_colors(&canvas, |pixel| {
        Rgb([pixel[0], pixel[1], pixel[2]])
    }))
}
