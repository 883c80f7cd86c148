use thiserror::Error;

#[derive(Error, Debug)]
pub enum SymmetryError {
    #[error("Failed to load image: {0}")]
    ImageLoad(#[from] image::ImageError),

    #[error("Image has no pixels ({width}x{height})")]
    EmptyImage { width: u32, height: u32 },

    #[error("No object found: none of the {candidates} contours is closed")]
    NoClosedContour { candidates: usize },

    #[error(
        "Crop window x={x_range:?} y={y_range:?} falls outside the {width}x{height} canvas"
    )]
    CropOutOfBounds {
        x_range: (i64, i64),
        y_range: (i64, i64),
        width: u32,
        height: u32,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlDe(#[from] toml::de::Error),

    #[error("TOML write error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    #[error("Unsupported config format. Please use .toml or .json files")]
    UnsupportedConfigFormat,
}

pub type Result<T> = std::result::Result<T, SymmetryError>;
