use image::GrayImage;
use crate::{error::Result, types::ContourCandidate};

/// Trait for binarization algorithms
pub trait Thresholder: Send + Sync {
    /// Turn a grayscale raster into a {0, 255} mask
    fn threshold(&self, image: &GrayImage) -> Result<GrayImage>;
}

/// Trait for mask cleanup algorithms
pub trait MaskCleaner: Send + Sync {
    /// Remove noise specks and fill small gaps in a binary mask
    fn clean(&self, mask: &GrayImage) -> Result<GrayImage>;
}

/// Trait for contour extraction algorithms
pub trait ContourExtractor: Send + Sync {
    /// Trace every boundary in a binary mask, with hierarchy metadata
    fn extract_contours(&self, image: &GrayImage) -> Result<Vec<ContourCandidate>>;
}

/// Trait for object-selection policies
pub trait CandidateRanker: Send + Sync {
    /// Larger ranks win; equal ranks keep the earlier candidate
    fn rank(&self, candidate: &ContourCandidate) -> f64;
}
