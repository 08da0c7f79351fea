//! Sheet boundary detection on the binarized scan
//!
//! The outermost contour with the largest area is taken as the sheet edge and
//! simplified to a polygon; only a clean quadrilateral is accepted.

use image::GrayImage;
use imageproc::contours::{find_contours, Contour};
use imageproc::geometry::{approximate_polygon_dp, arc_length};
use imageproc::point::Point;
use serde::Serialize;

/// Polygon approximation tolerance as a fraction of the contour perimeter
pub const POLY_APPROX_EPSILON: f64 = 0.02;

/// Sheet corners ordered top-left, top-right, bottom-right, bottom-left
pub type Quad = [(f32, f32); 4];

/// Why no quadrilateral could be taken from the scan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum QuadRejection {
    /// The binary image contained no foreground at all
    NoContours,
    /// The largest contour did not simplify to four corners
    NotQuadrilateral { corners: usize },
}

/// Locate the sheet boundary and return its ordered corners
pub fn find_sheet_quad(binary: &GrayImage) -> Result<Quad, QuadRejection> {
    let contours = find_contours::<i32>(binary);

    let largest = contours
        .iter()
        .filter(|c| c.parent.is_none())
        .map(|c| (c, contour_area(&c.points)))
        .fold(None::<(&Contour<i32>, f64)>, |best, (c, area)| match best {
            Some((_, best_area)) if best_area >= area => best,
            _ => Some((c, area)),
        });

    let Some((sheet, area)) = largest else {
        return Err(QuadRejection::NoContours);
    };

    let polygon = simplify(&sheet.points);
    tracing::debug!(
        area,
        points = sheet.points.len(),
        corners = polygon.len(),
        "Largest external contour simplified"
    );

    if polygon.len() != 4 {
        return Err(QuadRejection::NotQuadrilateral {
            corners: polygon.len(),
        });
    }

    let corners = [
        (polygon[0].x as f32, polygon[0].y as f32),
        (polygon[1].x as f32, polygon[1].y as f32),
        (polygon[2].x as f32, polygon[2].y as f32),
        (polygon[3].x as f32, polygon[3].y as f32),
    ];
    Ok(order_corners(&corners))
}

/// Douglas-Peucker simplification of a closed contour
///
/// Approximates closed-curve `approxPolyDP` as found in OpenCV: the ring is
/// cut at the point farthest from the trace start and each half is simplified
/// as an open curve, so the start pixel is always a vertex.
fn simplify(points: &[Point<i32>]) -> Vec<Point<i32>> {
    // Single pixels and two-pixel specks have no usable perimeter
    if points.len() < 3 {
        return points.to_vec();
    }
    let perimeter = arc_length(points, true);
    let epsilon = (POLY_APPROX_EPSILON * perimeter).max(f64::EPSILON);

    let start = points[0];
    let far = points
        .iter()
        .enumerate()
        .fold((0usize, 0i64), |(best, best_dist), (i, p)| {
            let dx = (p.x - start.x) as i64;
            let dy = (p.y - start.y) as i64;
            let dist = dx * dx + dy * dy;
            if dist > best_dist {
                (i, dist)
            } else {
                (best, best_dist)
            }
        })
        .0;
    if far == 0 {
        return vec![start];
    }

    let mut polygon = approximate_polygon_dp(&points[..=far], epsilon, false);
    let mut closing: Vec<Point<i32>> = points[far..].to_vec();
    closing.push(start);
    let mut tail = approximate_polygon_dp(&closing, epsilon, false);

    // Both halves end on a vertex the other half already contributes
    polygon.pop();
    tail.pop();
    polygon.append(&mut tail);
    polygon
}

/// Enclosed area of a closed polygon (shoelace formula)
pub fn contour_area(points: &[Point<i32>]) -> f64 {
    if points.len() < 3 {
        return 0.0;
    }
    let twice_area: i64 = points
        .iter()
        .zip(points.iter().cycle().skip(1))
        .map(|(a, b)| a.x as i64 * b.y as i64 - b.x as i64 * a.y as i64)
        .sum();
    (twice_area as f64 / 2.0).abs()
}

/// Order four corners as top-left, top-right, bottom-right, bottom-left
///
/// TL has the smallest `x + y`, BR the largest; TR has the smallest `y - x`,
/// BL the largest. Ties go to the earliest point.
pub fn order_corners(points: &Quad) -> Quad {
    let sum = |p: &(f32, f32)| p.0 + p.1;
    let diff = |p: &(f32, f32)| p.1 - p.0;

    let top_left = arg_by(points, sum, |a, b| a < b);
    let bottom_right = arg_by(points, sum, |a, b| a > b);
    let top_right = arg_by(points, diff, |a, b| a < b);
    let bottom_left = arg_by(points, diff, |a, b| a > b);

    [top_left, top_right, bottom_right, bottom_left]
}

fn arg_by<K, C>(points: &Quad, key: K, better: C) -> (f32, f32)
where
    K: Fn(&(f32, f32)) -> f32,
    C: Fn(f32, f32) -> bool,
{
    let mut best = points[0];
    for p in &points[1..] {
        if better(key(p), key(&best)) {
            best = *p;
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;
    use imageproc::drawing::{draw_filled_rect_mut, draw_polygon_mut};
    use imageproc::rect::Rect;

    fn assert_near(actual: (f32, f32), expected: (f32, f32)) {
        assert_within(actual, expected, 2.0);
    }

    fn assert_within(actual: (f32, f32), expected: (f32, f32), tolerance: f32) {
        assert!(
            (actual.0 - expected.0).abs() <= tolerance
                && (actual.1 - expected.1).abs() <= tolerance,
            "expected {:?}, got {:?}",
            expected,
            actual
        );
    }

    #[test]
    fn test_order_corners_from_shuffled_input() {
        let shuffled = [(90.0, 110.0), (10.0, 5.0), (12.0, 100.0), (95.0, 8.0)];
        let ordered = order_corners(&shuffled);
        assert_eq!(ordered[0], (10.0, 5.0));
        assert_eq!(ordered[1], (95.0, 8.0));
        assert_eq!(ordered[2], (90.0, 110.0));
        assert_eq!(ordered[3], (12.0, 100.0));
    }

    #[test]
    fn test_contour_area_of_square() {
        let square = vec![
            Point::new(0, 0),
            Point::new(10, 0),
            Point::new(10, 10),
            Point::new(0, 10),
        ];
        assert_eq!(contour_area(&square), 100.0);
        assert_eq!(contour_area(&square[..2]), 0.0);
    }

    #[test]
    fn test_empty_image_has_no_contours() {
        let img = GrayImage::new(40, 40);
        assert_eq!(find_sheet_quad(&img), Err(QuadRejection::NoContours));
    }

    #[test]
    fn test_finds_rectangle_corners() {
        let mut img = GrayImage::new(300, 400);
        draw_filled_rect_mut(&mut img, Rect::at(50, 60).of_size(200, 300), Luma([255]));

        let quad = find_sheet_quad(&img).unwrap();

        assert_near(quad[0], (50.0, 60.0));
        assert_near(quad[1], (249.0, 60.0));
        assert_near(quad[2], (249.0, 359.0));
        assert_near(quad[3], (50.0, 359.0));
    }

    #[test]
    fn test_picks_largest_blob() {
        let mut img = GrayImage::new(300, 300);
        draw_filled_rect_mut(&mut img, Rect::at(5, 5).of_size(20, 20), Luma([255]));
        draw_filled_rect_mut(&mut img, Rect::at(100, 100).of_size(150, 120), Luma([255]));

        let quad = find_sheet_quad(&img).unwrap();

        assert_near(quad[0], (100.0, 100.0));
        assert_near(quad[2], (249.0, 219.0));
    }

    #[test]
    fn test_jagged_tilted_sheet_keeps_four_corners() {
        let mut img = GrayImage::new(300, 360);
        let corners = [(40, 30), (250, 45), (235, 330), (30, 315)];
        let outline: Vec<Point<i32>> = corners.iter().map(|&(x, y)| Point::new(x, y)).collect();
        draw_polygon_mut(&mut img, &outline, Luma([255]));

        // Small notches along every edge, like a torn or badly scanned border
        for i in 0..4 {
            let (ax, ay) = corners[i];
            let (bx, by) = corners[(i + 1) % 4];
            for step in 1..10 {
                let t = step as f32 / 10.0;
                let x = ax as f32 + (bx - ax) as f32 * t;
                let y = ay as f32 + (by - ay) as f32 * t;
                let size = 2 + (step % 3) as u32;
                draw_filled_rect_mut(
                    &mut img,
                    Rect::at(x as i32 - 1, y as i32 - 1).of_size(size, size),
                    Luma([0]),
                );
            }
        }

        let quad = find_sheet_quad(&img).unwrap();

        assert_within(quad[0], (40.0, 30.0), 6.0);
        assert_within(quad[1], (250.0, 45.0), 6.0);
        assert_within(quad[2], (235.0, 330.0), 6.0);
        assert_within(quad[3], (30.0, 315.0), 6.0);
    }

    #[test]
    fn test_triangle_is_rejected() {
        let mut img = GrayImage::new(200, 200);
        let triangle = [Point::new(20, 180), Point::new(100, 20), Point::new(180, 180)];
        draw_polygon_mut(&mut img, &triangle, Luma([255]));

        assert_eq!(
            find_sheet_quad(&img),
            Err(QuadRejection::NotQuadrilateral { corners: 3 })
        );
    }
}
