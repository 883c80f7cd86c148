use image::{GrayImage, Luma, imageops};
use imageproc::distance_transform::Norm;
use tracing::debug;

use crate::{config::PadMode, error::Result, traits::MaskCleaner};

/// Surround the mask with a border of `width` pixels on every side.
///
/// Contours found afterwards live in padded coordinates; subtract `width` to
/// map them back onto the source raster.
pub fn pad_mask(mask: &GrayImage, width: u32, mode: PadMode) -> GrayImage {
    if width == 0 {
        return mask.clone();
    }

    let (w, h) = mask.dimensions();
    let (padded_w, padded_h) = (w + 2 * width, h + 2 * width);

    match mode {
        PadMode::ConstantWhite => {
            let mut canvas = GrayImage::from_pixel(padded_w, padded_h, Luma([255u8]));
            imageops::replace(&mut canvas, mask, width as i64, width as i64);
            canvas
        }
        PadMode::EdgeReplicate => GrayImage::from_fn(padded_w, padded_h, |x, y| {
            let sx = x.saturating_sub(width).min(w - 1);
            let sy = y.saturating_sub(width).min(h - 1);
            *mask.get_pixel(sx, sy)
        }),
    }
}

/// Opening followed by closing with a square structuring element.
///
/// The element radius equals `iterations`, which matches repeating a 3x3
/// erosion/dilation that many times.
#[derive(Debug, Clone)]
pub struct MorphologicalCleaner {
    pub iterations: u8,
}

impl Default for MorphologicalCleaner {
    fn default() -> Self {
        Self { iterations: 2 }
    }
}

impl MaskCleaner for MorphologicalCleaner {
    fn clean(&self, mask: &GrayImage) -> Result<GrayImage> {
        if self.iterations == 0 {
            return Ok(mask.clone());
        }

        let opened = imageproc::morphology::open(mask, Norm::LInf, self.iterations);
        let closed = imageproc::morphology::close(&opened, Norm::LInf, self.iterations);
        debug!(iterations = self.iterations, "mask opened and closed");
        Ok(closed)
    }
}

/// Leaves the mask untouched
#[derive(Debug, Clone, Default)]
pub struct NoCleaner;

impl MaskCleaner for NoCleaner {
    fn clean(&self, mask: &GrayImage) -> Result<GrayImage> {
        Ok(mask.clone())
    }
}
