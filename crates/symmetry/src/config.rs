//! Pipeline configuration.
//!
//! Every option is a plain value that can be loaded from TOML or JSON. Enum
//! options are read from strings; a string that names no known variant logs a
//! warning and falls back to the default instead of failing the load.

use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, VariantNames};
use tracing::warn;

use crate::error::{Result, SymmetryError};

fn parse_or_default<T>(option: &str, value: &str) -> T
where
    T: FromStr + Default + fmt::Display,
{
    value.trim().parse().unwrap_or_else(|_| {
        let fallback = T::default();
        warn!(
            "Unrecognized {} '{}', falling back to '{}'",
            option, value, fallback
        );
        fallback
    })
}

macro_rules! string_backed {
    ($ty:ty, $option:literal) => {
        impl From<String> for $ty {
            fn from(value: String) -> Self {
                parse_or_default($option, &value)
            }
        }

        impl From<$ty> for String {
            fn from(value: $ty) -> Self {
                value.to_string()
            }
        }
    };
}

/// Global binarization strategy
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[derive(Display, EnumString, VariantNames)]
#[serde(from = "String", into = "String")]
#[strum(ascii_case_insensitive)]
pub enum ThresholdMethod {
    /// Single histogram threshold minimizing intra-class variance
    #[default]
    #[strum(to_string = "Otsu")]
    Otsu,
    /// Per-pixel threshold against a large neighborhood mean
    #[strum(
        to_string = "AdaptiveMean",
        serialize = "adaptive-mean",
        serialize = "adaptive_mean"
    )]
    AdaptiveMean,
}

string_backed!(ThresholdMethod, "threshold method");

/// How the border added around the mask before cleaning is filled
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[derive(Display, EnumString, VariantNames)]
#[serde(from = "String", into = "String")]
#[strum(ascii_case_insensitive)]
pub enum PadMode {
    #[default]
    #[strum(
        to_string = "constant-white",
        serialize = "constant_white",
        serialize = "constant",
        serialize = "white"
    )]
    ConstantWhite,
    #[strum(
        to_string = "edge-replicate",
        serialize = "edge_replicate",
        serialize = "edge",
        serialize = "replicate"
    )]
    EdgeReplicate,
}

string_backed!(PadMode, "pad mode");

/// Whether traced boundaries keep every pixel or only the ends of straight runs
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[derive(Display, EnumString, VariantNames)]
#[serde(from = "String", into = "String")]
#[strum(ascii_case_insensitive)]
pub enum ChainApproximation {
    #[default]
    #[strum(to_string = "simple")]
    Simple,
    #[strum(to_string = "none")]
    None,
}

string_backed!(ChainApproximation, "chain approximation");

/// Policy used to pick the object among the closed contours
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[derive(Display, EnumString, VariantNames)]
#[serde(from = "String", into = "String")]
#[strum(ascii_case_insensitive)]
pub enum CandidateRanking {
    #[default]
    #[strum(to_string = "point-count", serialize = "point_count")]
    PointCount,
    #[strum(to_string = "area")]
    Area,
    #[strum(to_string = "bounding-box-area", serialize = "bounding_box_area")]
    BoundingBoxArea,
}

string_backed!(CandidateRanking, "candidate ranking");

/// Line the silhouette is reflected across
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[derive(Display, EnumString, VariantNames)]
#[serde(from = "String", into = "String")]
#[strum(ascii_case_insensitive)]
pub enum MirrorAxis {
    /// Reflect across the longest axis of the bounding box
    #[default]
    #[strum(to_string = "longest")]
    Longest,
    /// Reflect across the shortest axis of the bounding box
    #[strum(to_string = "shortest")]
    Shortest,
}

string_backed!(MirrorAxis, "mirror axis");

/// Settings for one run of the asymmetry pipeline
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(default)]
pub struct AsymmetryConfig {
    /// "Otsu" or "AdaptiveMean"
    #[schemars(with = "String")]
    pub threshold_method: ThresholdMethod,
    /// Neighborhood size for adaptive thresholding, in pixels (made odd)
    pub adaptive_block_size: u32,
    /// Subtracted from the neighborhood mean before comparing
    pub adaptive_offset: i16,
    /// Radius of the opening/closing structuring element
    pub morph_iterations: u8,
    /// Border added on every side before cleaning
    pub pad_width: u32,
    /// "constant-white" or "edge-replicate"
    #[schemars(with = "String")]
    pub pad_mode: PadMode,
    /// "simple" or "none"
    #[schemars(with = "String")]
    pub chain_approximation: ChainApproximation,
    /// "point-count", "area" or "bounding-box-area"
    #[schemars(with = "String")]
    pub ranking: CandidateRanking,
    /// "longest" or "shortest"
    #[schemars(with = "String")]
    pub mirror_axis: MirrorAxis,
    /// Produce the difference mask and contour overlay
    pub produce_diagnostics: bool,
}

impl Default for AsymmetryConfig {
    fn default() -> Self {
        Self {
            threshold_method: ThresholdMethod::Otsu,
            adaptive_block_size: 901,
            adaptive_offset: 0,
            morph_iterations: 2,
            pad_width: 50,
            pad_mode: PadMode::ConstantWhite,
            chain_approximation: ChainApproximation::Simple,
            ranking: CandidateRanking::PointCount,
            mirror_axis: MirrorAxis::Longest,
            produce_diagnostics: true,
        }
    }
}

impl AsymmetryConfig {
    /// Get the JSON schema for the configuration file
    pub fn schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(AsymmetryConfig)
    }

    /// Load configuration from a TOML file
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Load configuration from a TOML string
    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Load configuration from a JSON file
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Load configuration from a JSON string
    pub fn from_json(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    /// Auto-detect file format and load configuration
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_ref = path.as_ref();
        match path_ref.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Self::from_toml_file(path),
            Some("json") => Self::from_json_file(path),
            _ => Err(SymmetryError::UnsupportedConfigFormat),
        }
    }

    /// Convert configuration to a TOML string
    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(&self)?)
    }

    /// Save configuration to a TOML file
    pub fn to_toml_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        fs::write(path, self.to_toml()?)?;
        Ok(())
    }

    /// Half-width of the adaptive neighborhood (block size at least 3)
    pub fn adaptive_block_radius(&self) -> u32 {
        self.adaptive_block_size.max(3) / 2
    }
}
