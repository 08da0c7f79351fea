//! Individual normalization steps

pub mod blur;
pub mod contour;
pub mod grayscale;
pub mod resize;
pub mod threshold;
pub mod warp;
