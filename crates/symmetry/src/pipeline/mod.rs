pub mod builder;

use image::{DynamicImage, GrayImage};
use tracing::debug;

use crate::{
    algorithms::{
        centered_crop, draw_contour_overlay, fill_contour, flip_for, pad_mask, score_asymmetry,
        select_contour, to_grayscale,
    },
    config::{AsymmetryConfig, MirrorAxis, PadMode},
    error::{Result, SymmetryError},
    traits::{CandidateRanker, ContourExtractor, MaskCleaner, Thresholder},
    types::Analysis,
};

/// The five-stage object extraction and symmetry scoring pipeline
pub struct Pipeline {
    thresholder: Box<dyn Thresholder>,
    cleaner: Box<dyn MaskCleaner>,
    contour_extractor: Box<dyn ContourExtractor>,
    ranker: Box<dyn CandidateRanker>,
    pad_width: u32,
    pad_mode: PadMode,
    mirror_axis: MirrorAxis,
    produce_diagnostics: bool,
}

impl Pipeline {
    /// Create a new pipeline builder
    pub fn builder() -> builder::PipelineBuilder {
        builder::PipelineBuilder::new()
    }

    /// Build a pipeline from configuration values
    pub fn from_config(config: &AsymmetryConfig) -> Self {
        builder::PipelineBuilder::from_config(config).build()
    }

    #[allow(clippy::too_many_arguments)]
    pub fn new(
        thresholder: Box<dyn Thresholder>,
        cleaner: Box<dyn MaskCleaner>,
        contour_extractor: Box<dyn ContourExtractor>,
        ranker: Box<dyn CandidateRanker>,
        pad_width: u32,
        pad_mode: PadMode,
        mirror_axis: MirrorAxis,
        produce_diagnostics: bool,
    ) -> Self {
        Self {
            thresholder,
            cleaner,
            contour_extractor,
            ranker,
            pad_width,
            pad_mode,
            mirror_axis,
            produce_diagnostics,
        }
    }

    /// Process a decoded image of any color type
    pub fn process_dynamic(&self, image: &DynamicImage) -> Result<Analysis> {
        self.process(&to_grayscale(image))
    }

    /// Process a grayscale image through the entire pipeline
    pub fn process(&self, image: &GrayImage) -> Result<Analysis> {
        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return Err(SymmetryError::EmptyImage { width, height });
        }

        // Step 1: Binarize
        let mask = self.thresholder.threshold(image)?;

        // Step 2: Pad, then open and close
        let padded = pad_mask(&mask, self.pad_width, self.pad_mode);
        let cleaned = self.cleaner.clean(&padded)?;

        // Step 3: Pick the object outline
        let candidates = self.contour_extractor.extract_contours(&cleaned)?;
        let contour = select_contour(&candidates, self.ranker.as_ref())?;
        let bbox = contour.bounding_box().ok_or(SymmetryError::NoClosedContour {
            candidates: candidates.len(),
        })?;

        // Step 4: Fill and center
        let filled = fill_contour(cleaned.width(), cleaned.height(), &contour);
        let silhouette = centered_crop(&filled, &bbox)?;

        // Step 5: Mirror and compare
        let flip = flip_for(bbox.extent(), self.mirror_axis);
        let asymmetry = score_asymmetry(&silhouette, flip);
        debug!(
            score = asymmetry.score,
            crop = ?silhouette.dimensions(),
            "image analysed"
        );

        let (diff_mask, contour_overlay) = if self.produce_diagnostics {
            let overlay = draw_contour_overlay(image, &contour, self.pad_width);
            (Some(asymmetry.diff_mask.clone()), Some(overlay))
        } else {
            (None, None)
        };

        Ok(Analysis {
            silhouette,
            score: asymmetry.score,
            degenerate: asymmetry.is_degenerate(),
            flip: asymmetry.flip,
            contour,
            source_dimensions: (width, height),
            diff_mask,
            contour_overlay,
        })
    }

    /// Get information about the pipeline configuration
    pub fn info(&self) -> String {
        format!(
            "Pipeline: pad {}px ({}), mirror across {} axis, diagnostics {}",
            self.pad_width,
            self.pad_mode,
            self.mirror_axis,
            if self.produce_diagnostics {
                "on"
            } else {
                "off"
            }
        )
    }
}
