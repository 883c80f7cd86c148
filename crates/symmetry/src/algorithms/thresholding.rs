use image::{DynamicImage, GrayImage, Luma};
use tracing::debug;

use crate::{
    config::{AsymmetryConfig, ThresholdMethod},
    error::Result,
    traits::Thresholder,
};

/// Reduce any decoded image to a single luminance channel
pub fn to_grayscale(image: &DynamicImage) -> GrayImage {
    match image {
        DynamicImage::ImageLuma8(gray) => gray.clone(),
        other => other.to_luma8(),
    }
}

/// Global Otsu binarization: pixels above the level become 255
#[derive(Debug, Clone, Default)]
pub struct OtsuThresholder;

impl Thresholder for OtsuThresholder {
    fn threshold(&self, image: &GrayImage) -> Result<GrayImage> {
        let level = imageproc::contrast::otsu_level(image);
        debug!(level, "Otsu threshold level");
        Ok(imageproc::contrast::threshold(image, level))
    }
}

/// Local mean binarization for unevenly lit images
#[derive(Debug, Clone)]
pub struct AdaptiveMeanThresholder {
    /// Half-width of the square neighborhood; the block is `2 * radius + 1` wide
    pub block_radius: u32,
    /// Subtracted from the local mean before comparing
    pub offset: i16,
}

impl Default for AdaptiveMeanThresholder {
    fn default() -> Self {
        Self {
            block_radius: 450,
            offset: 0,
        }
    }
}

impl Thresholder for AdaptiveMeanThresholder {
    fn threshold(&self, image: &GrayImage) -> Result<GrayImage> {
        let means = imageproc::filter::box_filter(image, self.block_radius, self.block_radius);
        debug!(block_radius = self.block_radius, offset = self.offset, "adaptive mean threshold");

        let binary = GrayImage::from_fn(image.width(), image.height(), |x, y| {
            let value = image.get_pixel(x, y)[0];
            let mean = means.get_pixel(x, y)[0];
            let local = mean as i32 - self.offset as i32;
            // Saturated pixels in an all-white window stay foreground
            let saturated = value == u8::MAX && mean == u8::MAX;
            if value as i32 > local || saturated {
                Luma([255u8])
            } else {
                Luma([0u8])
            }
        });
        Ok(binary)
    }
}

/// Build the thresholder named by the configuration
pub fn thresholder_for(config: &AsymmetryConfig) -> Box<dyn Thresholder> {
    match config.threshold_method {
        ThresholdMethod::Otsu => Box::new(OtsuThresholder),
        ThresholdMethod::AdaptiveMean => Box::new(AdaptiveMeanThresholder {
            block_radius: config.adaptive_block_radius(),
            offset: config.adaptive_offset,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    fn binary_fixture() -> GrayImage {
        GrayImage::from_fn(40, 30, |x, y| {
            if (10..30).contains(&x) && (5..25).contains(&y) {
                Luma([255u8])
            } else {
                Luma([0u8])
            }
        })
    }

    fn is_binary(image: &GrayImage) -> bool {
        image.pixels().all(|p| p[0] == 0 || p[0] == 255)
    }

    #[test]
    fn test_otsu_separates_two_levels() {
        let image = GrayImage::from_fn(20, 20, |x, _| {
            if x < 10 { Luma([40u8]) } else { Luma([210u8]) }
        });
        let mask = OtsuThresholder.threshold(&image).unwrap();

        assert!(is_binary(&mask));
        assert_eq!(mask.get_pixel(2, 2)[0], 0);
        assert_eq!(mask.get_pixel(15, 2)[0], 255);
    }

    #[test]
    fn test_otsu_is_idempotent_on_binary_mask() {
        let mask = binary_fixture();
        let once = OtsuThresholder.threshold(&mask).unwrap();
        let twice = OtsuThresholder.threshold(&once).unwrap();
        assert_eq!(once, mask);
        assert_eq!(twice, once);
    }

    #[test]
    fn test_adaptive_is_idempotent_on_binary_mask() {
        let thresholder = AdaptiveMeanThresholder {
            block_radius: 15,
            offset: 0,
        };
        let mask = binary_fixture();
        let once = thresholder.threshold(&mask).unwrap();
        let twice = thresholder.threshold(&once).unwrap();
        assert!(is_binary(&once));
        assert_eq!(once, mask);
        assert_eq!(twice, once);
    }

    #[test]
    fn test_adaptive_keeps_white_regions_wider_than_block() {
        let thresholder = AdaptiveMeanThresholder {
            block_radius: 15,
            offset: 0,
        };
        // 160 px square against a 31 px block: the interior windows are all white
        let mask = GrayImage::from_fn(200, 200, |x, y| {
            if (20..180).contains(&x) && (20..180).contains(&y) {
                Luma([255u8])
            } else {
                Luma([0u8])
            }
        });

        let once = thresholder.threshold(&mask).unwrap();
        assert_eq!(once.get_pixel(100, 100)[0], 255);
        assert_eq!(once, mask);
        assert_eq!(thresholder.threshold(&once).unwrap(), once);
    }

    #[test]
    fn test_adaptive_uniform_white_stays_white() {
        let white = GrayImage::from_pixel(50, 40, Luma([255u8]));
        let mask = AdaptiveMeanThresholder::default().threshold(&white).unwrap();
        assert_eq!(mask, white);
    }

    #[test]
    fn test_adaptive_handles_illumination_gradient() {
        // Dark square on a background that brightens from left to right
        let image = GrayImage::from_fn(60, 20, |x, y| {
            let background = 100 + 2 * x as u8;
            if (25..35).contains(&x) && (5..15).contains(&y) {
                Luma([background - 60])
            } else {
                Luma([background])
            }
        });
        let mask = AdaptiveMeanThresholder {
            block_radius: 10,
            offset: 0,
        }
        .threshold(&image)
        .unwrap();

        assert_eq!(mask.get_pixel(30, 10)[0], 0);
        assert_eq!(mask.get_pixel(30, 1)[0], 255);
    }

    #[test]
    fn test_color_input_is_reduced_to_luminance() {
        let color = RgbImage::from_pixel(4, 3, Rgb([255u8, 255, 255]));
        let gray = to_grayscale(&DynamicImage::ImageRgb8(color));
        assert_eq!(gray.dimensions(), (4, 3));
        assert!(gray.pixels().all(|p| p[0] == 255));
    }

    #[test]
    fn test_thresholder_for_config() {
        let config = AsymmetryConfig {
            threshold_method: ThresholdMethod::AdaptiveMean,
            ..Default::default()
        };
        let mask = thresholder_for(&config).threshold(&binary_fixture()).unwrap();
        assert!(is_binary(&mask));
    }
}
