use crate::{
    algorithms::{
        ImageprocContourExtractor, MorphologicalCleaner, OtsuThresholder, PointCountRanker,
        ranker_for, thresholder_for,
    },
    config::{AsymmetryConfig, MirrorAxis, PadMode},
    pipeline::Pipeline,
    traits::{CandidateRanker, ContourExtractor, MaskCleaner, Thresholder},
};

/// Builder for creating processing pipelines with a fluent API
pub struct PipelineBuilder {
    thresholder: Option<Box<dyn Thresholder>>,
    cleaner: Option<Box<dyn MaskCleaner>>,
    contour_extractor: Option<Box<dyn ContourExtractor>>,
    ranker: Option<Box<dyn CandidateRanker>>,
    pad_width: u32,
    pad_mode: PadMode,
    mirror_axis: MirrorAxis,
    produce_diagnostics: bool,
}

impl PipelineBuilder {
    /// Create a new pipeline builder with default padding and mirroring
    pub fn new() -> Self {
        let defaults = AsymmetryConfig::default();
        Self {
            thresholder: None,
            cleaner: None,
            contour_extractor: None,
            ranker: None,
            pad_width: defaults.pad_width,
            pad_mode: defaults.pad_mode,
            mirror_axis: defaults.mirror_axis,
            produce_diagnostics: defaults.produce_diagnostics,
        }
    }

    /// Create a builder with every stage chosen by the configuration
    pub fn from_config(config: &AsymmetryConfig) -> Self {
        Self::new()
            .set_boxed_thresholder(thresholder_for(config))
            .set_cleaner(MorphologicalCleaner {
                iterations: config.morph_iterations,
            })
            .set_contour_extractor(ImageprocContourExtractor {
                approximation: config.chain_approximation,
            })
            .set_boxed_ranker(ranker_for(config.ranking))
            .with_padding(config.pad_width, config.pad_mode)
            .with_mirror_axis(config.mirror_axis)
            .with_diagnostics(config.produce_diagnostics)
    }

    /// Set the thresholder (replaces any existing one)
    pub fn set_thresholder<T>(self, thresholder: T) -> Self
    where
        T: Thresholder + 'static,
    {
        self.set_boxed_thresholder(Box::new(thresholder))
    }

    pub fn set_boxed_thresholder(mut self, thresholder: Box<dyn Thresholder>) -> Self {
        self.thresholder = Some(thresholder);
        self
    }

    /// Set the mask cleaner (replaces any existing one)
    pub fn set_cleaner<C>(mut self, cleaner: C) -> Self
    where
        C: MaskCleaner + 'static,
    {
        self.cleaner = Some(Box::new(cleaner));
        self
    }

    /// Set the contour extractor (replaces any existing one)
    pub fn set_contour_extractor<E>(mut self, extractor: E) -> Self
    where
        E: ContourExtractor + 'static,
    {
        self.contour_extractor = Some(Box::new(extractor));
        self
    }

    /// Set the candidate ranking policy (replaces any existing one)
    pub fn set_ranker<R>(self, ranker: R) -> Self
    where
        R: CandidateRanker + 'static,
    {
        self.set_boxed_ranker(Box::new(ranker))
    }

    pub fn set_boxed_ranker(mut self, ranker: Box<dyn CandidateRanker>) -> Self {
        self.ranker = Some(ranker);
        self
    }

    /// Border added around the mask before cleaning
    pub fn with_padding(mut self, width: u32, mode: PadMode) -> Self {
        self.pad_width = width;
        self.pad_mode = mode;
        self
    }

    pub fn with_mirror_axis(mut self, axis: MirrorAxis) -> Self {
        self.mirror_axis = axis;
        self
    }

    /// Produce the difference mask and contour overlay
    pub fn with_diagnostics(mut self, enabled: bool) -> Self {
        self.produce_diagnostics = enabled;
        self
    }

    /// Build the pipeline with default components if not specified
    pub fn build(self) -> Pipeline {
        Pipeline::new(
            self.thresholder.unwrap_or_else(|| Box::new(OtsuThresholder)),
            self.cleaner
                .unwrap_or_else(|| Box::new(MorphologicalCleaner::default())),
            self.contour_extractor
                .unwrap_or_else(|| Box::new(ImageprocContourExtractor::default())),
            self.ranker.unwrap_or_else(|| Box::new(PointCountRanker)),
            self.pad_width,
            self.pad_mode,
            self.mirror_axis,
            self.produce_diagnostics,
        )
    }
}

impl Default for PipelineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithms::{AreaRanker, NoCleaner};
    use crate::config::CandidateRanking;

    #[test]
    fn test_default_info() {
        let info = Pipeline::builder().build().info();
        assert!(info.contains("pad 50px (constant-white)"));
        assert!(info.contains("longest"));
        assert!(info.contains("diagnostics on"));
    }

    #[test]
    fn test_from_config_carries_settings() {
        let config = AsymmetryConfig {
            pad_width: 7,
            pad_mode: PadMode::EdgeReplicate,
            mirror_axis: MirrorAxis::Shortest,
            produce_diagnostics: false,
            ranking: CandidateRanking::BoundingBoxArea,
            ..Default::default()
        };
        let info = PipelineBuilder::from_config(&config).build().info();
        assert!(info.contains("pad 7px (edge-replicate)"));
        assert!(info.contains("shortest"));
        assert!(info.contains("diagnostics off"));
    }

    #[test]
    fn test_custom_stages() {
        let pipeline = Pipeline::builder()
            .set_cleaner(NoCleaner)
            .set_ranker(AreaRanker)
            .with_padding(10, PadMode::ConstantWhite)
            .build();

        let image = image::GrayImage::from_fn(60, 60, |x, y| {
            if (20..41).contains(&x) && (15..46).contains(&y) {
                image::Luma([0u8])
            } else {
                image::Luma([255u8])
            }
        });
        let analysis = pipeline.process(&image).unwrap();
        // Hole border sits one pixel outside the dark rectangle on each side
        assert_eq!(analysis.crop_dimensions(), (23, 33));
        assert!(analysis.score < 0.05, "score was {}", analysis.score);
    }
}
