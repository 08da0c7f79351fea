use image::{GrayImage, Luma, Rgb, RgbImage};
use imageproc::geometric_transformations::{warp_into, Interpolation, Projection};

use super::contour::Quad;
use crate::canvas::{saturate_ink, BACKGROUND};

/// Projective map taking the ordered sheet corners onto the canvas corners
///
/// Returns `None` when the corners are degenerate (collinear or repeated).
pub fn sheet_projection(corners: &Quad, width: u32, height: u32) -> Option<Projection> {
    let right = width.saturating_sub(1) as f32;
    let bottom = height.saturating_sub(1) as f32;
    let target = [(0.0, 0.0), (right, 0.0), (right, bottom), (0.0, bottom)];
    Projection::from_control_points(*corners, target)
}

/// Warp the color scan onto a `width x height` canvas
pub fn apply_color(image: &RgbImage, projection: &Projection, width: u32, height: u32) -> RgbImage {
    let mut out = RgbImage::new(width, height);
    warp_into(
        image,
        projection,
        Interpolation::Bilinear,
        Rgb([0, 0, 0]),
        &mut out,
    );
    out
}

/// Warp the binary scan onto a `width x height` canvas
/// Bilinear sampling; pixels touched by any ink are kept as ink
pub fn apply_binary(
    binary: &GrayImage,
    projection: &Projection,
    width: u32,
    height: u32,
) -> GrayImage {
    let mut out = GrayImage::new(width, height);
    warp_into(
        binary,
        projection,
        Interpolation::Bilinear,
        Luma([BACKGROUND]),
        &mut out,
    );
    saturate_ink(out)
}
