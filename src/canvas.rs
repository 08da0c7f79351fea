use image::{GrayImage, Luma};

/// Pixel value stored for ink
pub const INK: u8 = 255;
/// Pixel value stored for background
pub const BACKGROUND: u8 = 0;

/// Promote every non-zero pixel to full ink
///
/// Resampling a binary image leaves grey edge pixels; these count as ink.
pub fn saturate_ink(mut image: GrayImage) -> GrayImage {
    for pixel in image.pixels_mut() {
        if pixel.0[0] != BACKGROUND {
            pixel.0[0] = INK;
        }
    }
    image
}

/// Single-channel raster where any non-zero pixel counts as ink
#[derive(Debug, Clone, PartialEq)]
pub struct BinaryCanvas {
    image: GrayImage,
}

impl BinaryCanvas {
    /// Blank canvas with no ink
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            image: GrayImage::from_pixel(width, height, Luma([BACKGROUND])),
        }
    }

    pub fn from_image(image: GrayImage) -> Self {
        Self { image }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    pub fn is_ink(&self, x: u32, y: u32) -> bool {
        self.image.get_pixel(x, y).0[0] != BACKGROUND
    }

    pub fn set_ink(&mut self, x: u32, y: u32) {
        self.image.put_pixel(x, y, Luma([INK]));
    }

    /// Count ink pixels in the half-open rectangle `[x0, x1) x [y0, y1)`
    pub fn count_ink(&self, x0: u32, y0: u32, x1: u32, y1: u32) -> u64 {
        let x1 = x1.min(self.width());
        let y1 = y1.min(self.height());
        let mut count = 0u64;
        for y in y0..y1 {
            for x in x0..x1 {
                if self.is_ink(x, y) {
                    count += 1;
                }
            }
        }
        count
    }

    pub fn as_image(&self) -> &GrayImage {
        &self.image
    }

    pub fn into_image(self) -> GrayImage {
        self.image
    }
}
