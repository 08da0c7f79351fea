use image::{imageops, GrayImage, RgbImage};

/// Convert a color scan to grayscale
/// Every later step works on luma only
pub fn apply(image: &RgbImage) -> GrayImage {
    imageops::grayscale(image)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn test_grayscale_converts_color() {
        let mut img = RgbImage::new(10, 10);
        img.put_pixel(0, 0, Rgb([255, 0, 0])); // Red
        img.put_pixel(1, 0, Rgb([0, 255, 0])); // Green
        img.put_pixel(2, 0, Rgb([0, 0, 255])); // Blue

        let gray = apply(&img);

        assert!(gray.get_pixel(0, 0).0[0] > 0);
        assert!(gray.get_pixel(1, 0).0[0] > 0);
        assert!(gray.get_pixel(2, 0).0[0] > 0);
        assert_eq!(gray.get_pixel(5, 5).0[0], 0);
    }

    #[test]
    fn test_grayscale_preserves_dimensions() {
        let img = RgbImage::new(100, 50);
        let gray = apply(&img);
        assert_eq!(gray.dimensions(), (100, 50));
    }
}
