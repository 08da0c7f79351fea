use image::{GrayImage, RgbImage};
use serde::Serialize;
use std::time::Instant;

use super::steps;
use super::steps::contour::{Quad, QuadRejection};
use crate::canvas::BinaryCanvas;
use crate::layout::SheetLayout;

/// Why the scan was resized instead of perspective-corrected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FallbackReason {
    /// Thresholding left no foreground to trace
    NoContours,
    /// The sheet boundary did not simplify to four corners
    NotQuadrilateral { corners: usize },
    /// Four corners were found but no projective map fits them
    DegenerateQuad,
}

impl From<QuadRejection> for FallbackReason {
    fn from(rejection: QuadRejection) -> Self {
        match rejection {
            QuadRejection::NoContours => Self::NoContours,
            QuadRejection::NotQuadrilateral { corners } => Self::NotQuadrilateral { corners },
        }
    }
}

/// How the canvas was produced
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum NormalizationOutcome {
    /// Sheet corners were found and warped onto the canvas corners
    Corrected { corners: Quad },
    /// Plain resize, no geometry correction
    Fallback { reason: FallbackReason },
}

impl NormalizationOutcome {
    pub fn is_corrected(&self) -> bool {
        matches!(self, Self::Corrected { .. })
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Corrected { .. } => "corrected",
            Self::Fallback { .. } => "fallback",
        }
    }
}

/// Timing information for a single normalization step
#[derive(Debug, Clone, Serialize)]
pub struct StepTiming {
    pub name: String,
    pub time_ms: u64,
}

/// Result of normalization including timing stats
#[derive(Debug, Clone, Serialize)]
pub struct NormalizedSheet {
    /// Color scan on the canvas (not serialized)
    #[serde(skip)]
    pub color: RgbImage,
    /// Binarized scan on the canvas (not serialized)
    #[serde(skip)]
    pub canvas: BinaryCanvas,
    pub outcome: NormalizationOutcome,
    /// Total normalization time in milliseconds
    pub total_time_ms: u64,
    /// Individual step timings
    pub steps: Vec<StepTiming>,
}

/// Turns an arbitrary color scan into a fixed-size binary canvas
///
/// Never fails: when the sheet boundary cannot be found the scan is simply
/// resized and the outcome says so.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Normalizer {
    width: u32,
    height: u32,
}

impl Normalizer {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn for_layout(layout: &SheetLayout) -> Self {
        Self::new(layout.canvas_width, layout.canvas_height)
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Normalize a scan onto the canvas
    pub fn normalize(&self, image: &RgbImage) -> NormalizedSheet {
        let start = Instant::now();
        let mut timings = Vec::new();

        let gray = self.run_step("grayscale", &mut timings, || steps::grayscale::apply(image));
        let smoothed = self.run_step("blur", &mut timings, || {
            steps::blur::apply(&gray, steps::blur::SMOOTHING_KERNEL_SIZE)
        });
        let binary = self.run_step("threshold", &mut timings, || {
            steps::threshold::apply(&smoothed)
        });
        let quad = self.run_step("contour", &mut timings, || {
            steps::contour::find_sheet_quad(&binary)
        });

        let (color, canvas, outcome) = match quad {
            Ok(corners) => self.warp(image, &binary, corners, &mut timings),
            Err(rejection) => {
                self.resize(image, &binary, FallbackReason::from(rejection), &mut timings)
            }
        };

        NormalizedSheet {
            color,
            canvas: BinaryCanvas::from_image(canvas),
            outcome,
            total_time_ms: start.elapsed().as_millis() as u64,
            steps: timings,
        }
    }

    fn warp(
        &self,
        image: &RgbImage,
        binary: &GrayImage,
        corners: Quad,
        timings: &mut Vec<StepTiming>,
    ) -> (RgbImage, GrayImage, NormalizationOutcome) {
        let Some(projection) = steps::warp::sheet_projection(&corners, self.width, self.height)
        else {
            return self.resize(image, binary, FallbackReason::DegenerateQuad, timings);
        };

        tracing::debug!(?corners, "Warping sheet onto canvas");
        let (color, canvas) = self.run_step("warp", timings, || {
            (
                steps::warp::apply_color(image, &projection, self.width, self.height),
                steps::warp::apply_binary(binary, &projection, self.width, self.height),
            )
        });
        (color, canvas, NormalizationOutcome::Corrected { corners })
    }

    fn resize(
        &self,
        image: &RgbImage,
        binary: &GrayImage,
        reason: FallbackReason,
        timings: &mut Vec<StepTiming>,
    ) -> (RgbImage, GrayImage, NormalizationOutcome) {
        tracing::warn!(?reason, "Sheet boundary not found, resizing without correction");
        let (color, canvas) = self.run_step("resize", timings, || {
            (
                steps::resize::apply_color(image, self.width, self.height),
                steps::resize::apply_binary(binary, self.width, self.height),
            )
        });
        (color, canvas, NormalizationOutcome::Fallback { reason })
    }

    fn run_step<T, F>(&self, name: &str, timings: &mut Vec<StepTiming>, step_fn: F) -> T
    where
        F: FnOnce() -> T,
    {
        let step_start = Instant::now();
        let result = step_fn();
        timings.push(StepTiming {
            name: name.to_string(),
            time_ms: step_start.elapsed().as_millis() as u64,
        });
        result
    }
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::for_layout(&SheetLayout::standard())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{CANVAS_HEIGHT, CANVAS_WIDTH};
    use image::{imageops, Rgb};
    use imageproc::drawing::draw_filled_rect_mut;
    use imageproc::rect::Rect;

    #[test]
    fn test_output_is_canvas_sized_for_any_input() {
        let normalizer = Normalizer::default();
        for (w, h) in [(1, 1), (37, 900), (1600, 1200), (1000, 1400)] {
            let image = RgbImage::from_pixel(w, h, Rgb([240, 240, 240]));
            let sheet = normalizer.normalize(&image);
            assert_eq!(sheet.canvas.dimensions(), (CANVAS_WIDTH, CANVAS_HEIGHT));
            assert_eq!(sheet.color.dimensions(), (CANVAS_WIDTH, CANVAS_HEIGHT));
        }
    }

    #[test]
    fn test_blank_scan_falls_back_to_plain_resize() {
        let image = RgbImage::from_pixel(300, 420, Rgb([200, 210, 220]));

        let sheet = Normalizer::default().normalize(&image);

        assert_eq!(
            sheet.outcome,
            NormalizationOutcome::Fallback {
                reason: FallbackReason::NoContours
            }
        );
        let expected = imageops::resize(
            &image,
            CANVAS_WIDTH,
            CANVAS_HEIGHT,
            imageops::FilterType::Triangle,
        );
        assert_eq!(sheet.color, expected);
        assert_eq!(sheet.canvas.count_ink(0, 0, CANVAS_WIDTH, CANVAS_HEIGHT), 0);
        assert_eq!(sheet.steps.last().map(|s| s.name.as_str()), Some("resize"));
    }

    #[test]
    fn test_sheet_on_dark_background_is_corrected() {
        let mut image = RgbImage::from_pixel(600, 800, Rgb([40, 40, 40]));
        draw_filled_rect_mut(&mut image, Rect::at(100, 100).of_size(400, 560), Rgb([230, 230, 230]));

        let sheet = Normalizer::new(200, 280).normalize(&image);

        match sheet.outcome {
            NormalizationOutcome::Corrected { corners } => {
                // The ink band hugs the sheet edge from the outside
                assert!((85.0..=115.0).contains(&corners[0].0), "{:?}", corners);
                assert!((85.0..=115.0).contains(&corners[0].1), "{:?}", corners);
                assert!((485.0..=515.0).contains(&corners[2].0), "{:?}", corners);
                assert!((645.0..=675.0).contains(&corners[2].1), "{:?}", corners);
            }
            other => panic!("expected a corrected sheet, got {:?}", other),
        }
        assert_eq!(sheet.canvas.dimensions(), (200, 280));
        // Centre of the sheet is plain paper
        assert!(!sheet.canvas.is_ink(100, 140));
        assert!(sheet.outcome.is_corrected());
        assert_eq!(sheet.outcome.label(), "corrected");
    }

    #[test]
    fn test_outcome_serializes_with_status_tag() {
        let outcome = NormalizationOutcome::Fallback {
            reason: FallbackReason::NotQuadrilateral { corners: 6 },
        };
        let json = serde_json::to_value(outcome).unwrap();
        assert_eq!(json["status"], "fallback");
        assert_eq!(json["reason"]["kind"], "not_quadrilateral");
        assert_eq!(json["reason"]["corners"], 6);
    }
}
