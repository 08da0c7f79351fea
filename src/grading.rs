//! End-to-end grading: decode, normalize, extract, compare

use image::RgbImage;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;

use crate::comparison::{self, ScoreReport};
use crate::debug::DebugSink;
use crate::error::GradeError;
use crate::extraction::{self, AnswerSequence, QuestionReading};
use crate::layout::SheetLayout;
use crate::preprocessing::{NormalizationOutcome, Normalizer};

/// Which of the two uploaded sheets an image is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SheetRole {
    /// The answer key
    Teacher,
    /// The response being graded
    Student,
}

impl SheetRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Teacher => "teacher",
            Self::Student => "student",
        }
    }
}

impl fmt::Display for SheetRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything read from one sheet
#[derive(Debug, Clone, Serialize)]
pub struct SheetReading {
    pub role: SheetRole,
    pub answers: AnswerSequence,
    pub questions: Vec<QuestionReading>,
    pub normalization: NormalizationOutcome,
    pub normalize_time_ms: u64,
}

/// Result of grading a student sheet against the key
#[derive(Debug, Clone, Serialize)]
pub struct GradeOutcome {
    pub report: ScoreReport,
    pub teacher: SheetReading,
    pub student: SheetReading,
}

/// Decode an uploaded image into an RGB raster
pub fn decode_sheet(bytes: &[u8], role: SheetRole) -> Result<RgbImage, GradeError> {
    let image = image::load_from_memory(bytes).map_err(|e| GradeError::Decode {
        role,
        message: e.to_string(),
    })?;
    tracing::debug!(
        %role,
        width = image.width(),
        height = image.height(),
        "Decoded sheet image"
    );
    Ok(image.into_rgb8())
}

/// Grade with the standard layout and no debug output
pub fn grade(teacher: &RgbImage, student: &RgbImage) -> ScoreReport {
    Grader::default().grade(teacher, student).report
}

/// Runs the normalize → extract → compare pipeline for a fixed layout
///
/// Holds no per-request state, so one instance can be shared across threads.
#[derive(Clone)]
pub struct Grader {
    layout: SheetLayout,
    normalizer: Normalizer,
    debug_sink: Option<Arc<dyn DebugSink>>,
}

impl Default for Grader {
    fn default() -> Self {
        let layout = SheetLayout::standard();
        Self {
            normalizer: Normalizer::for_layout(&layout),
            layout,
            debug_sink: None,
        }
    }
}

impl Grader {
    /// Create a grader for a custom sheet layout
    pub fn with_layout(layout: SheetLayout) -> Result<Self, GradeError> {
        layout.validate()?;
        Ok(Self {
            normalizer: Normalizer::for_layout(&layout),
            layout,
            debug_sink: None,
        })
    }

    /// Send every normalized canvas to `sink`
    pub fn with_debug_sink(mut self, sink: Arc<dyn DebugSink>) -> Self {
        tracing::info!(sink = sink.name(), "Debug canvas output enabled");
        self.debug_sink = Some(sink);
        self
    }

    pub fn layout(&self) -> &SheetLayout {
        &self.layout
    }

    pub fn debug_enabled(&self) -> bool {
        self.debug_sink.is_some()
    }

    /// Normalize one sheet and read its answers
    pub fn read_sheet(&self, image: &RgbImage, role: SheetRole) -> SheetReading {
        let sheet = self.normalizer.normalize(image);

        if let Some(sink) = &self.debug_sink {
            sink.persist(role, &sheet.canvas);
        }

        let questions = extraction::read_questions(&sheet.canvas, &self.layout);
        let answers: AnswerSequence = questions.iter().map(|q| q.choice).collect();
        let blank = questions.iter().filter(|q| q.blank).count();

        tracing::debug!(
            %role,
            normalization = sheet.outcome.label(),
            blank,
            time_ms = sheet.total_time_ms,
            "Sheet read"
        );

        SheetReading {
            role,
            answers,
            questions,
            normalization: sheet.outcome,
            normalize_time_ms: sheet.total_time_ms,
        }
    }

    /// Grade `student` against the `teacher` answer key
    pub fn grade(&self, teacher: &RgbImage, student: &RgbImage) -> GradeOutcome {
        let teacher = self.read_sheet(teacher, SheetRole::Teacher);
        let student = self.read_sheet(student, SheetRole::Student);
        let report = comparison::compare(&teacher.answers, &student.answers);

        GradeOutcome {
            report,
            teacher,
            student,
        }
    }
}
