//! # Symmetry: Bilateral Asymmetry Scoring
//!
//! Segments the single dominant object in a photograph and measures how far
//! it is from being mirror-symmetric.
//!
//! ## Pipeline
//!
//! 1. **Threshold**: Otsu or adaptive-mean binarization
//! 2. **Clean**: pad the mask, then morphological opening and closing
//! 3. **Select**: trace contours and keep the best ranked closed one
//! 4. **Crop**: fill the contour and crop around its bounding-box midpoint
//! 5. **Score**: mirror the crop and count the pixels that disagree
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use symmetry::Pipeline;
//!
//! let pipeline = Pipeline::builder().build();
//!
//! let image = image::open("specimen.png")?;
//! let analysis = pipeline.process_dynamic(&image)?;
//! println!("asymmetry: {:.4}", analysis.score);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## From Configuration
//!
//! ```rust,no_run
//! use symmetry::{AsymmetryConfig, Pipeline};
//!
//! let config = AsymmetryConfig::from_file("ascheck.toml")?;
//! let pipeline = Pipeline::from_config(&config);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod error;
pub mod types;
pub mod config;
pub mod traits;
pub mod algorithms;
pub mod pipeline;

pub use error::{SymmetryError, Result};
pub use types::{Analysis, AsymmetryResult, BorderKind, BoundingBox, ContourCandidate, Flip};
pub use config::{
    AsymmetryConfig, CandidateRanking, ChainApproximation, MirrorAxis, PadMode, ThresholdMethod,
};
pub use traits::*;
pub use pipeline::{Pipeline, builder::PipelineBuilder};
