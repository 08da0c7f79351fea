//! Answer extraction from a normalized binary canvas
//!
//! The canvas is cut into equal-width column strips; inside each strip every
//! question row is probed at the layout's choice positions and the choice with
//! the highest ink density wins.

use serde::Serialize;
use std::ops::Deref;

use crate::canvas::BinaryCanvas;
use crate::layout::SheetLayout;

/// Selected choice index per question, column-major then top-to-bottom
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct AnswerSequence(Vec<usize>);

impl AnswerSequence {
    pub fn new(choices: Vec<usize>) -> Self {
        Self(choices)
    }

    pub fn into_inner(self) -> Vec<usize> {
        self.0
    }
}

impl Deref for AnswerSequence {
    type Target = [usize];

    fn deref(&self) -> &[usize] {
        &self.0
    }
}

impl From<Vec<usize>> for AnswerSequence {
    fn from(choices: Vec<usize>) -> Self {
        Self(choices)
    }
}

impl FromIterator<usize> for AnswerSequence {
    fn from_iter<I: IntoIterator<Item = usize>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Densities measured for one question
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuestionReading {
    /// 1-based question number
    pub question: usize,
    pub choice: usize,
    /// Ink density per choice position, each in [0, 1]
    pub densities: Vec<f32>,
    /// No ink at any choice position; `choice` is then the default 0
    pub blank: bool,
}

/// Half-open pixel rectangle inside a column strip
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Roi {
    pub x0: u32,
    pub y0: u32,
    pub x1: u32,
    pub y1: u32,
}

impl Roi {
    /// Rectangle of `width x height` centred on `(cx, cy)`, clamped to `bounds`
    ///
    /// Sides are truncated to whole pixels first, then each edge is truncated
    /// toward zero.
    pub fn centered(cx: f32, cy: f32, width: f32, height: f32, bounds: (u32, u32)) -> Self {
        let width = width.trunc();
        let height = height.trunc();
        let x0 = (cx - width / 2.0) as i64;
        let x1 = (cx + width / 2.0) as i64;
        let y0 = (cy - height / 2.0) as i64;
        let y1 = (cy + height / 2.0) as i64;

        let clamp = |v: i64, max: u32| v.clamp(0, max as i64) as u32;
        Self {
            x0: clamp(x0, bounds.0),
            y0: clamp(y0, bounds.1),
            x1: clamp(x1, bounds.0),
            y1: clamp(y1, bounds.1),
        }
    }

    pub fn area(&self) -> u64 {
        let w = self.x1.saturating_sub(self.x0) as u64;
        let h = self.y1.saturating_sub(self.y0) as u64;
        w * h
    }
}

/// Read the selected choice for every question on the sheet
///
/// The result always holds exactly `layout.question_count()` entries.
pub fn extract(canvas: &BinaryCanvas, layout: &SheetLayout) -> AnswerSequence {
    read_questions(canvas, layout)
        .into_iter()
        .map(|reading| reading.choice)
        .collect()
}

/// Like [`extract`] but keeps the per-choice densities
pub fn read_questions(canvas: &BinaryCanvas, layout: &SheetLayout) -> Vec<QuestionReading> {
    let expected = layout.question_count();
    // Remainder pixels past the last full strip are never probed
    // A layout without columns reads nothing and falls through to padding
    let column_width = canvas.width().checked_div(layout.columns).unwrap_or(0);
    let strip_height = canvas.height();
    let row_height = strip_height as f32 / layout.rows_per_column as f32;
    let roi_width = (column_width as f32 * layout.roi_width_factor).max(layout.min_roi_side);
    let roi_height = (row_height * layout.roi_height_factor).max(layout.min_roi_side);

    let mut readings = Vec::with_capacity(expected);

    for column in 0..layout.columns {
        let strip_x = column * column_width;
        for row in 0..layout.rows_per_column {
            let cy = (row as f32 + 0.5) * row_height;
            let densities: Vec<f32> = layout
                .choice_ratios
                .iter()
                .map(|ratio| {
                    let cx = column_width as f32 * ratio;
                    let bounds = (column_width, strip_height);
                    let roi = Roi::centered(cx, cy, roi_width, roi_height, bounds);
                    ink_density(canvas, strip_x, &roi)
                })
                .collect();

            let choice = first_max(&densities);
            readings.push(QuestionReading {
                question: readings.len() + 1,
                choice,
                blank: densities.iter().all(|d| *d == 0.0),
                densities,
            });
        }
    }

    if readings.len() != expected {
        tracing::warn!(
            found = readings.len(),
            expected,
            "Question count differs from layout, adjusting"
        );
    }
    readings.truncate(expected);
    while readings.len() < expected {
        readings.push(QuestionReading {
            question: readings.len() + 1,
            choice: 0,
            densities: vec![0.0; layout.choice_count()],
            blank: true,
        });
    }

    readings
}

/// Fraction of ink pixels in an ROI given in strip coordinates
pub fn ink_density(canvas: &BinaryCanvas, strip_x: u32, roi: &Roi) -> f32 {
    let area = roi.area();
    if area == 0 {
        return 0.0;
    }
    let ink = canvas.count_ink(strip_x + roi.x0, roi.y0, strip_x + roi.x1, roi.y1);
    ink as f32 / area as f32
}

/// Index of the largest value; the earliest one wins ties and an empty slice gives 0
fn first_max(values: &[f32]) -> usize {
    let mut best = 0;
    for (i, value) in values.iter().enumerate().skip(1) {
        if *value > values[best] {
            best = i;
        }
    }
    best
}
