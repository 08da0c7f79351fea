//! Answer sheet layout descriptor
//!
//! The grid printed on the physical sheet is overlaid on the normalized
//! canvas; nothing here is measured from the image.

use serde::Serialize;

use crate::error::GradeError;

/// Width of the normalized canvas in pixels
pub const CANVAS_WIDTH: u32 = 1000;
/// Height of the normalized canvas in pixels
pub const CANVAS_HEIGHT: u32 = 1400;

/// Horizontal centre of each choice bubble, relative to its column width (A-D)
pub const DEFAULT_CHOICE_RATIOS: [f32; 4] = [0.15, 0.37, 0.60, 0.83];

/// Geometry of a multiple-choice answer sheet on the normalized canvas
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SheetLayout {
    pub canvas_width: u32,
    pub canvas_height: u32,
    pub columns: u32,
    pub rows_per_column: u32,
    /// One entry per choice, each in (0, 1)
    pub choice_ratios: Vec<f32>,
    /// ROI width as a fraction of the column width
    pub roi_width_factor: f32,
    /// ROI height as a fraction of the row height
    pub roi_height_factor: f32,
    /// Lower bound for both ROI sides, in pixels
    pub min_roi_side: f32,
}

impl Default for SheetLayout {
    fn default() -> Self {
        Self::standard()
    }
}

impl SheetLayout {
    /// The 60-question, 3-column, A-D sheet
    pub fn standard() -> Self {
        Self {
            canvas_width: CANVAS_WIDTH,
            canvas_height: CANVAS_HEIGHT,
            columns: 3,
            rows_per_column: 20,
            choice_ratios: DEFAULT_CHOICE_RATIOS.to_vec(),
            roi_width_factor: 0.12,
            roi_height_factor: 0.6,
            min_roi_side: 8.0,
        }
    }

    pub fn question_count(&self) -> usize {
        (self.columns * self.rows_per_column) as usize
    }

    pub fn choice_count(&self) -> usize {
        self.choice_ratios.len()
    }

    /// Integer column width; trailing pixels past `columns * column_width` are ignored
    pub fn column_width(&self) -> u32 {
        self.canvas_width / self.columns
    }

    pub fn row_height(&self) -> f32 {
        self.canvas_height as f32 / self.rows_per_column as f32
    }

    /// Centre of a choice bubble in canvas coordinates
    pub fn choice_center(&self, column: u32, row: u32, choice: usize) -> (f32, f32) {
        let column_width = self.column_width() as f32;
        let cx = column as f32 * column_width + self.choice_ratios[choice] * column_width;
        let cy = (row as f32 + 0.5) * self.row_height();
        (cx, cy)
    }

    /// Reject descriptors the extractor cannot work with
    pub fn validate(&self) -> Result<(), GradeError> {
        if self.canvas_width == 0 || self.canvas_height == 0 {
            return Err(GradeError::InvalidLayout(
                "canvas dimensions must be non-zero".to_string(),
            ));
        }
        if self.columns == 0 || self.rows_per_column == 0 {
            return Err(GradeError::InvalidLayout(
                "columns and rows_per_column must be non-zero".to_string(),
            ));
        }
        if self.columns > self.canvas_width {
            return Err(GradeError::InvalidLayout(format!(
                "{} columns do not fit in a {}px wide canvas",
                self.columns, self.canvas_width
            )));
        }
        if self.choice_ratios.is_empty() {
            return Err(GradeError::InvalidLayout(
                "at least one choice is required".to_string(),
            ));
        }
        if let Some(ratio) = self
            .choice_ratios
            .iter()
            .find(|r| !(0.0..=1.0).contains(*r))
        {
            return Err(GradeError::InvalidLayout(format!(
                "choice ratio {} is outside [0, 1]",
                ratio
            )));
        }
        if self.roi_width_factor <= 0.0 || self.roi_height_factor <= 0.0 {
            return Err(GradeError::InvalidLayout(
                "ROI factors must be positive".to_string(),
            ));
        }
        Ok(())
    }
}
