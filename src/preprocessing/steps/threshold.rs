use image::{GrayImage, Luma};
use imageproc::filter::separable_filter_equal;

use super::blur::gaussian_kernel;
use crate::canvas::{BACKGROUND, INK};

/// Side of the neighbourhood used for the local mean
pub const BLOCK_SIZE: usize = 21;
/// Amount subtracted from the local mean before comparing
pub const OFFSET: i16 = 10;

/// Apply inverted adaptive Gaussian thresholding
/// Marks and printed lines become ink (255), paper becomes background (0)
pub fn apply(image: &GrayImage) -> GrayImage {
    adaptive_gaussian_inv(image, BLOCK_SIZE, OFFSET)
}

/// Inverted adaptive thresholding against a Gaussian-weighted local mean
///
/// A pixel is ink when `pixel <= local_mean - offset`, so flat regions of any
/// brightness stay background and only locally darker pixels survive.
fn adaptive_gaussian_inv(img: &GrayImage, block_size: usize, offset: i16) -> GrayImage {
    let kernel = gaussian_kernel(block_size);
    let local_mean = separable_filter_equal(img, kernel.as_slice());

    GrayImage::from_fn(img.width(), img.height(), |x, y| {
        let pixel = img.get_pixel(x, y).0[0] as i16;
        let threshold = local_mean.get_pixel(x, y).0[0] as i16 - offset;
        if pixel <= threshold {
            Luma([INK])
        } else {
            Luma([BACKGROUND])
        }
    })
}
