use crate::assessment::RiskAuditService;
use crate::config::Config;
use crate::errors::AppError;
use crate::models::{AssessmentReport, AssessmentRequest, FormOptions};
use crate::prompt::PromptPayload;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use std::sync::Arc;

/// Shared application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration (read-only after startup).
    pub config: Config,
    /// Assessment pipeline.
    pub service: RiskAuditService,
}

fn rejection_to_error(rejection: JsonRejection) -> AppError {
    AppError::BadRequest(rejection.body_text())
}

/// Health check endpoint.
///
/// Reports whether the model credential is configured so operators can spot
/// a deployment that will reject every submission.
pub async fn health(State(state): State<Arc<AppState>>) -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::OK,
        Json(json!({
            "status": "healthy",
            "service": "dli-risk-audit",
            "version": env!("CARGO_PKG_VERSION"),
            "model_configured": state.service.is_configured(),
            "model": state.config.openai_model,
            "default_variant": state.config.default_variant,
        })),
    )
}

/// GET /api/v1/form-options
///
/// Option lists for every enumerated form field.
pub async fn form_options() -> Json<FormOptions> {
    Json(FormOptions::build())
}

/// POST /api/v1/assessments
///
/// Runs the complete pipeline for one form submission.
///
/// # Returns
///
/// * `Result<Json<AssessmentReport>, AppError>` - The report, or the failure for this submission.
pub async fn create_assessment(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<AssessmentRequest>, JsonRejection>,
) -> Result<Json<AssessmentReport>, AppError> {
    let Json(payload) = payload.map_err(rejection_to_error)?;
    tracing::info!("POST /assessments - variant: {:?}", payload.variant);

    let report = state.service.assess(&payload).await?;
    Ok(Json(report))
}

/// POST /api/v1/prompts/preview
///
/// Validates the submission and returns the prompt that would be sent,
/// without calling the model or recording a lead.
pub async fn preview_prompt(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<AssessmentRequest>, JsonRejection>,
) -> Result<Json<PromptPayload>, AppError> {
    let Json(payload) = payload.map_err(rejection_to_error)?;
    let prompt = state.service.preview_prompt(&payload)?;
    Ok(Json(prompt))
}

/// Application routes, without the transport middleware added at bootstrap.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/v1/form-options", get(form_options))
        .route("/api/v1/assessments", post(create_assessment))
        .route("/api/v1/prompts/preview", post(preview_prompt))
        .with_state(state)
}
