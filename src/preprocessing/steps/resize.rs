use image::{imageops, imageops::FilterType, GrayImage, RgbImage};

use crate::canvas::saturate_ink;

/// Stretch the color scan to the canvas size without any geometry correction
pub fn apply_color(image: &RgbImage, width: u32, height: u32) -> RgbImage {
    imageops::resize(image, width, height, FilterType::Triangle)
}

/// Stretch the binary scan to the canvas size
/// Linear filtering, then any partially covered pixel becomes ink
pub fn apply_binary(binary: &GrayImage, width: u32, height: u32) -> GrayImage {
    saturate_ink(imageops::resize(binary, width, height, FilterType::Triangle))
}
