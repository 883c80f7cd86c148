pub mod thresholding;
pub mod morphology;
pub mod extraction;
pub mod selection;
pub mod cropping;
pub mod scoring;
pub mod overlay;

pub use thresholding::*;
pub use morphology::*;
pub use extraction::*;
pub use selection::*;
pub use cropping::*;
pub use scoring::*;
pub use overlay::*;
