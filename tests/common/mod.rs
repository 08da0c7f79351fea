//! Synthetic answer sheets shared by the integration tests

#![allow(dead_code)]

use image::{ImageFormat, Rgb, RgbImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_filled_rect_mut};
use imageproc::geometric_transformations::{warp_into, Interpolation, Projection};
use imageproc::rect::Rect;
use omr_grade_server::SheetLayout;
use std::io::Cursor;

pub const DESK: Rgb<u8> = Rgb([40, 40, 40]);
pub const PAPER: Rgb<u8> = Rgb([235, 235, 235]);
pub const PENCIL: Rgb<u8> = Rgb([20, 20, 20]);
pub const BUBBLE_RADIUS: i32 = 14;

/// Draw a filled bubble for every answer onto a canvas-sized sheet,
/// surrounded by `margin` pixels of dark desk
pub fn render_sheet(answers: &[usize], margin: u32) -> RgbImage {
    let layout = SheetLayout::standard();
    let mut image = RgbImage::from_pixel(
        layout.canvas_width + 2 * margin,
        layout.canvas_height + 2 * margin,
        DESK,
    );
    draw_filled_rect_mut(
        &mut image,
        Rect::at(margin as i32, margin as i32).of_size(layout.canvas_width, layout.canvas_height),
        PAPER,
    );

    let rows = layout.rows_per_column as usize;
    for (question, choice) in answers.iter().enumerate() {
        let column = (question / rows) as u32;
        let row = (question % rows) as u32;
        let (cx, cy) = layout.choice_center(column, row, *choice);
        draw_filled_circle_mut(
            &mut image,
            (margin as i32 + cx as i32, margin as i32 + cy as i32),
            BUBBLE_RADIUS,
            PENCIL,
        );
    }
    image
}

/// Re-project a scan so its corners move by the given offsets, like a photo
/// taken slightly off-axis
pub fn skew(image: &RgbImage, offsets: [(f32, f32); 4]) -> RgbImage {
    let (w, h) = (image.width() as f32, image.height() as f32);
    let from = [(0.0, 0.0), (w, 0.0), (w, h), (0.0, h)];
    let mut to = from;
    for (corner, offset) in to.iter_mut().zip(offsets) {
        corner.0 += offset.0;
        corner.1 += offset.1;
    }
    let projection = Projection::from_control_points(from, to).expect("valid skew");
    let mut out = RgbImage::new(image.width(), image.height());
    warp_into(image, &projection, Interpolation::Bilinear, DESK, &mut out);
    out
}

/// Sixty answers cycling through A-D
pub fn cycling_answers() -> Vec<usize> {
    (0..60).map(|i| i % 4).collect()
}

pub fn png_bytes(image: &RgbImage) -> Vec<u8> {
    let mut bytes = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .expect("encode png");
    bytes
}
