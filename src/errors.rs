use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::fmt;

/// Message shown to the submitter when the model reply cannot be used.
const ANALYSIS_FAILED: &str = "The risk analysis could not be completed. Please resubmit the form.";

/// Application-specific error types.
///
/// Every variant is scoped to a single submission; none of them terminate the process.
#[derive(Debug, Clone)]
pub enum AppError {
    /// A numeric field fell outside its allowed range.
    InvalidRange { field: String, message: String },
    /// An enumerated field held a value outside its option list.
    InvalidChoice { field: String, value: String },
    /// The email was absent or malformed in the lead-gated flow.
    InvalidEmail(String),
    /// The model credential is not configured; no call was attempted.
    ConfigurationMissing(String),
    /// The model reply was not a structured JSON object.
    MalformedReply(String),
    /// The model reply parsed but broke the expected schema.
    SchemaViolation { field: String, reason: String },
    /// Network or call-level failure talking to the model service.
    TransportFailure(String),
    /// Bad request error (invalid input outside the field validators).
    BadRequest(String),
    /// Error with context chain for better debugging.
    WithContext {
        /// The underlying source of the error.
        source: Box<AppError>,
        /// Additional context message.
        context: String,
    },
}

impl AppError {
    /// Stable snake_case tag used in HTTP bodies and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::InvalidRange { .. } => "invalid_range",
            AppError::InvalidChoice { .. } => "invalid_choice",
            AppError::InvalidEmail(_) => "invalid_email",
            AppError::ConfigurationMissing(_) => "configuration_missing",
            AppError::MalformedReply(_) => "malformed_reply",
            AppError::SchemaViolation { .. } => "schema_violation",
            AppError::TransportFailure(_) => "transport_failure",
            AppError::BadRequest(_) => "bad_request",
            AppError::WithContext { source, .. } => source.kind(),
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::InvalidRange { field, message } => {
                write!(f, "Invalid range for '{}': {}", field, message)
            }
            AppError::InvalidChoice { field, value } => {
                write!(f, "Invalid choice for '{}': '{}'", field, value)
            }
            AppError::InvalidEmail(msg) => write!(f, "Invalid email: {}", msg),
            AppError::ConfigurationMissing(msg) => write!(f, "Configuration missing: {}", msg),
            AppError::MalformedReply(msg) => write!(f, "Malformed reply: {}", msg),
            AppError::SchemaViolation { field, reason } => {
                write!(f, "Schema violation on '{}': {}", field, reason)
            }
            AppError::TransportFailure(msg) => write!(f, "Transport failure: {}", msg),
            AppError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            AppError::WithContext { source, context } => {
                write!(f, "{}: {}", context, source)
            }
        }
    }
}

impl std::error::Error for AppError {}

impl IntoResponse for AppError {
    /// Maps each error kind to an HTTP status code and JSON body.
    ///
    /// Reply failures are reported with a generic message; the detail only goes to the log.
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            AppError::InvalidRange { .. }
            | AppError::InvalidChoice { .. }
            | AppError::InvalidEmail(_)
            | AppError::BadRequest(_) => {
                tracing::info!("Rejected submission: {}", self);
                (StatusCode::BAD_REQUEST, self.to_string())
            }
            AppError::ConfigurationMissing(msg) => {
                tracing::error!("Configuration missing: {}", msg);
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "Configuration error: the analysis service is not configured".to_string(),
                )
            }
            AppError::MalformedReply(_) | AppError::SchemaViolation { .. } => {
                tracing::error!("Unusable model reply: {}", self);
                (StatusCode::BAD_GATEWAY, ANALYSIS_FAILED.to_string())
            }
            AppError::TransportFailure(msg) => {
                tracing::error!("Model service error: {}", msg);
                (
                    StatusCode::BAD_GATEWAY,
                    "External service error".to_string(),
                )
            }
            AppError::WithContext { source, context } => {
                tracing::error!("Error with context: {} -> {}", context, source);
                return source.clone().into_response();
            }
        };

        let body = Json(json!({
            "error": error_message,
            "kind": self.kind(),
        }));

        (status, body).into_response()
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        AppError::TransportFailure(err.to_string())
    }
}

/// Extension trait for adding context to errors.
/// Similar to `anyhow::Context` but for our `AppError` type.
pub trait ResultExt<T> {
    /// Add context to an error.
    fn context(self, context: impl Into<String>) -> Result<T, AppError>;

    /// Add context lazily (only evaluated on error).
    fn with_context<F>(self, f: F) -> Result<T, AppError>
    where
        F: FnOnce() -> String;
}

impl<T> ResultExt<T> for Result<T, AppError> {
    fn context(self, context: impl Into<String>) -> Result<T, AppError> {
        self.map_err(|e| AppError::WithContext {
            source: Box::new(e),
            context: context.into(),
        })
    }

    fn with_context<F>(self, f: F) -> Result<T, AppError>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| AppError::WithContext {
            source: Box::new(e),
            context: f(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_keeps_kind_of_source() {
        let err: Result<(), AppError> = Err(AppError::SchemaViolation {
            field: "mensaje".to_string(),
            reason: "missing".to_string(),
        });
        let wrapped = err.context("parsing reply").unwrap_err();

        assert_eq!(wrapped.kind(), "schema_violation");
        assert!(wrapped.to_string().starts_with("parsing reply: "));
    }

    #[test]
    fn test_status_codes() {
        let cases = vec![
            (
                AppError::InvalidEmail("x".to_string()),
                StatusCode::BAD_REQUEST,
            ),
            (
                AppError::ConfigurationMissing("key".to_string()),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
            (
                AppError::MalformedReply("x".to_string()),
                StatusCode::BAD_GATEWAY,
            ),
            (
                AppError::TransportFailure("x".to_string()),
                StatusCode::BAD_GATEWAY,
            ),
        ];

        for (err, expected) in cases {
            assert_eq!(err.into_response().status(), expected);
        }
    }

    #[test]
    fn test_with_context_delegates_status() {
        let err = AppError::WithContext {
            source: Box::new(AppError::InvalidRange {
                field: "employees".to_string(),
                message: "must be at least 1".to_string(),
            }),
            context: "validating".to_string(),
        };
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }
}
