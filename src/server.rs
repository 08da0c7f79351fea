use crate::comparison::ScoreReport;
use crate::config::Config;
use crate::debug::DirectorySink;
use crate::error::GradeError;
use crate::grading::{decode_sheet, Grader, SheetRole};
use crate::layout::SheetLayout;
use crate::preprocessing::NormalizationOutcome;
use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, Multipart, State},
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub grader: Arc<Grader>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let mut grader = Grader::default();
        if let Some(dir) = &config.debug_dir {
            grader = grader.with_debug_sink(Arc::new(DirectorySink::new(dir)));
        }
        Self {
            grader: Arc::new(grader),
            config: Arc::new(config),
        }
    }
}

/// Normalization outcome of both sheets
#[derive(Serialize)]
pub struct NormalizationSummary {
    pub teacher: NormalizationOutcome,
    pub student: NormalizationOutcome,
}

/// Grade response
#[derive(Serialize)]
pub struct GradeResponse {
    #[serde(flatten)]
    pub report: ScoreReport,
    pub normalization: NormalizationSummary,
    pub processing_time_ms: u64,
}

/// Root response
#[derive(Serialize)]
pub struct RootResponse {
    pub message: String,
}

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Server info response
#[derive(Serialize)]
pub struct InfoResponse {
    pub version: String,
    pub max_file_size_bytes: usize,
    pub debug_enabled: bool,
    pub layout: SheetLayout,
}

/// Build the router with all routes and middleware
pub fn router(state: AppState) -> Router {
    let body_limit = state.config.body_limit();

    Router::new()
        .route("/", get(handle_root))
        .route("/grade", post(handle_grade))
        .route("/health", get(handle_health))
        .route("/info", get(handle_info))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Run the HTTP server
pub async fn run(config: Config) -> anyhow::Result<()> {
    let addr = format!("{}:{}", config.host, config.port);
    let app = router(AppState::new(config));

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Handle grading requests
async fn handle_grade(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<GradeResponse>, GradeError> {
    let start = Instant::now();

    let mut teacher_data: Option<Bytes> = None;
    let mut student_data: Option<Bytes> = None;

    // Parse multipart form
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| GradeError::InvalidRequest(format!("Failed to parse multipart: {}", e)))?
    {
        let name = field.name().unwrap_or_default().to_string();

        let slot = match name.as_str() {
            "teacher" => &mut teacher_data,
            "student" => &mut student_data,
            _ => {
                // Ignore unknown fields
                continue;
            }
        };
        *slot = Some(field.bytes().await.map_err(|e| {
            GradeError::InvalidRequest(format!("Failed to read {} file: {}", name, e))
        })?);
    }

    let teacher_data = teacher_data.ok_or(GradeError::MissingFile("teacher"))?;
    let student_data = student_data.ok_or(GradeError::MissingFile("student"))?;

    for data in [&teacher_data, &student_data] {
        if data.len() > state.config.max_file_size {
            return Err(GradeError::ImageTooLarge {
                size: data.len(),
                max: state.config.max_file_size,
            });
        }
    }

    // Decoding and grading are CPU bound
    let grader = state.grader.clone();
    let outcome = tokio::task::spawn_blocking(move || {
        let teacher = decode_sheet(&teacher_data, SheetRole::Teacher)?;
        let student = decode_sheet(&student_data, SheetRole::Student)?;
        Ok::<_, GradeError>(grader.grade(&teacher, &student))
    })
    .await
    .map_err(|e| GradeError::Internal(format!("Grading task failed: {}", e)))??;

    let processing_time_ms = start.elapsed().as_millis() as u64;

    tracing::info!(
        "Graded in {}ms: {}/{} correct ({:.2}%), teacher {}, student {}",
        processing_time_ms,
        outcome.report.correct,
        outcome.report.total,
        outcome.report.percentage,
        outcome.teacher.normalization.label(),
        outcome.student.normalization.label()
    );

    Ok(Json(GradeResponse {
        report: outcome.report,
        normalization: NormalizationSummary {
            teacher: outcome.teacher.normalization,
            student: outcome.student.normalization,
        },
        processing_time_ms,
    }))
}

/// Handle root requests
async fn handle_root() -> impl IntoResponse {
    Json(RootResponse {
        message: "OMR grading backend is running".to_string(),
    })
}

/// Handle health check requests
async fn handle_health() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Handle info requests
async fn handle_info(State(state): State<AppState>) -> impl IntoResponse {
    Json(InfoResponse {
        version: env!("CARGO_PKG_VERSION").to_string(),
        max_file_size_bytes: state.config.max_file_size,
        debug_enabled: state.grader.debug_enabled(),
        layout: state.grader.layout().clone(),
    })
}
