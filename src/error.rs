use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::grading::SheetRole;

#[derive(Error, Debug)]
pub enum GradeError {
    #[error("Failed to decode {role} sheet: {message}")]
    Decode { role: SheetRole, message: String },

    #[error("Image too large: {size} bytes (max: {max} bytes)")]
    ImageTooLarge { size: usize, max: usize },

    #[error("Missing file in request: {0}")]
    MissingFile(&'static str),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Invalid sheet layout: {0}")]
    InvalidLayout(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

impl GradeError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            GradeError::Decode { .. } => (StatusCode::BAD_REQUEST, "DECODE_ERROR"),
            GradeError::ImageTooLarge { .. } => (StatusCode::PAYLOAD_TOO_LARGE, "IMAGE_TOO_LARGE"),
            GradeError::MissingFile(_) => (StatusCode::BAD_REQUEST, "MISSING_FILE"),
            GradeError::InvalidRequest(_) => (StatusCode::BAD_REQUEST, "INVALID_REQUEST"),
            GradeError::InvalidLayout(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INVALID_LAYOUT"),
            GradeError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }
}

impl IntoResponse for GradeError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        let body = Json(ErrorResponse {
            error: self.to_string(),
            code: code.to_string(),
        });

        (status, body).into_response()
    }
}
