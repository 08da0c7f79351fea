use image::GrayImage;
use imageproc::filter::separable_filter_equal;

/// Side of the smoothing window applied before binarization
pub const SMOOTHING_KERNEL_SIZE: usize = 5;

/// Gaussian smoothing with a square `size x size` window
/// Suppresses scan noise so isolated specks do not survive thresholding
pub fn apply(image: &GrayImage, size: usize) -> GrayImage {
    let kernel = gaussian_kernel(size);
    separable_filter_equal(image, kernel.as_slice())
}

/// Normalized 1-D Gaussian kernel for an odd window size
///
/// Sigma is derived from the window the same way common imaging libraries do
/// when none is given: `0.3 * ((size - 1) / 2 - 1) + 0.8`.
pub fn gaussian_kernel(size: usize) -> Vec<f32> {
    let size = size.max(1) | 1;
    let sigma = 0.3 * ((size as f32 - 1.0) * 0.5 - 1.0) + 0.8;
    let center = (size / 2) as f32;
    let two_sigma_sq = 2.0 * sigma * sigma;

    let mut kernel: Vec<f32> = (0..size)
        .map(|i| {
            let d = i as f32 - center;
            (-(d * d) / two_sigma_sq).exp()
        })
        .collect();

    let sum: f32 = kernel.iter().sum();
    for weight in &mut kernel {
        *weight /= sum;
    }
    kernel
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    #[test]
    fn test_kernel_is_normalized_and_symmetric() {
        let kernel = gaussian_kernel(21);
        assert_eq!(kernel.len(), 21);
        let sum: f32 = kernel.iter().sum();
        assert!((sum - 1.0).abs() < 1e-5);
        for i in 0..10 {
            assert!((kernel[i] - kernel[20 - i]).abs() < 1e-6);
        }
        assert!(kernel[10] > kernel[9]);
    }

    #[test]
    fn test_even_size_rounds_up_to_odd() {
        assert_eq!(gaussian_kernel(4).len(), 5);
    }

    #[test]
    fn test_blur_keeps_uniform_image() {
        let img = GrayImage::from_pixel(12, 12, Luma([90]));
        let blurred = apply(&img, SMOOTHING_KERNEL_SIZE);
        // separable passes may lose a unit to float truncation
        assert!(blurred.pixels().all(|p| (89..=90).contains(&p.0[0])));
    }

    #[test]
    fn test_blur_spreads_isolated_speck() {
        let mut img = GrayImage::from_pixel(11, 11, Luma([0]));
        img.put_pixel(5, 5, Luma([255]));

        let blurred = apply(&img, SMOOTHING_KERNEL_SIZE);

        assert!(blurred.get_pixel(5, 5).0[0] < 255);
        assert!(blurred.get_pixel(6, 5).0[0] > 0);
    }
}
