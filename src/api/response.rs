//! Response types for the Roster Cost Engine API.
//!
//! This module defines the error response structures and the mapping from
//! engine errors to HTTP status codes.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::models::{Period, ProjectId};

/// API error response structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Error code for programmatic handling.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Optional details about the error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    /// Creates a new API error with details.
    pub fn with_details(
        code: impl Into<String>,
        message: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: Some(details.into()),
        }
    }

    /// Creates a malformed JSON error response.
    pub fn malformed_json(message: impl Into<String>) -> Self {
        Self::new("MALFORMED_JSON", message)
    }

    /// Creates an invalid query string error response.
    pub fn invalid_query(message: impl Into<String>) -> Self {
        Self::new("INVALID_QUERY", message)
    }
}

/// API error with HTTP status code.
pub struct ApiErrorResponse {
    /// The HTTP status code.
    pub status: StatusCode,
    /// The error body.
    pub error: ApiError,
}

impl ApiErrorResponse {
    /// A 400 response carrying `error`.
    pub fn bad_request(error: ApiError) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            error,
        }
    }
}

impl IntoResponse for ApiErrorResponse {
    fn into_response(self) -> Response {
        (self.status, Json(self.error)).into_response()
    }
}

impl From<EngineError> for ApiErrorResponse {
    fn from(error: EngineError) -> Self {
        match error {
            EngineError::NotFound { entity, id } => ApiErrorResponse {
                status: StatusCode::NOT_FOUND,
                error: ApiError::with_details(
                    "NOT_FOUND",
                    format!("{} not found: {}", entity, id),
                    format!("No {} with id '{}' exists", entity, id),
                ),
            },
            EngineError::InvalidInput { field, message } => ApiErrorResponse {
                status: StatusCode::BAD_REQUEST,
                error: ApiError::with_details(
                    "INVALID_INPUT",
                    format!("Invalid input '{}': {}", field, message),
                    field,
                ),
            },
            EngineError::Inconsistent { message } => ApiErrorResponse {
                status: StatusCode::CONFLICT,
                error: ApiError::with_details(
                    "INCONSISTENT_DATA",
                    "Stored data is inconsistent",
                    message,
                ),
            },
            EngineError::ConfigNotFound { path } => ApiErrorResponse {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                error: ApiError::with_details(
                    "CONFIG_ERROR",
                    "Configuration error",
                    format!("Configuration file not found: {}", path),
                ),
            },
            EngineError::ConfigParseError { path, message } => ApiErrorResponse {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                error: ApiError::with_details(
                    "CONFIG_ERROR",
                    "Configuration parse error",
                    format!("Failed to parse {}: {}", path, message),
                ),
            },
        }
    }
}

/// Body of `GET /projects/:project_id/cost`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectCostResponse {
    /// The project.
    pub project_id: ProjectId,
    /// The period costed.
    pub period: Period,
    /// Σ staff net salary.
    pub original_cost: Decimal,
}

/// Body of `GET /sharing/reciprocal`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReciprocalResponse {
    /// Source project.
    pub source: ProjectId,
    /// Destination project.
    pub destination: ProjectId,
    /// Whether the reverse edge exists.
    pub reciprocal: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_serialization() {
        let error = ApiError::new("TEST_ERROR", "Test message");
        let json = serde_json::to_string(&error).unwrap();
        assert!(json.contains("\"code\":\"TEST_ERROR\""));
        assert!(json.contains("\"message\":\"Test message\""));
        assert!(!json.contains("details"));
    }

    #[test]
    fn test_api_error_with_details_serialization() {
        let error = ApiError::with_details("TEST_ERROR", "Test message", "Some details");
        let json = serde_json::to_string(&error).unwrap();
        assert!(json.contains("\"details\":\"Some details\""));
    }

    #[test]
    fn test_status_mapping() {
        let cases = [
            (EngineError::not_found("project", "p9"), StatusCode::NOT_FOUND, "NOT_FOUND"),
            (
                EngineError::invalid("month", "must be 1-12"),
                StatusCode::BAD_REQUEST,
                "INVALID_INPUT",
            ),
            (
                EngineError::inconsistent("counterpart inactive"),
                StatusCode::CONFLICT,
                "INCONSISTENT_DATA",
            ),
            (
                EngineError::ConfigNotFound {
                    path: "engine.yaml".to_string(),
                },
                StatusCode::INTERNAL_SERVER_ERROR,
                "CONFIG_ERROR",
            ),
        ];
        for (engine_error, status, code) in cases {
            let api_error: ApiErrorResponse = engine_error.into();
            assert_eq!(api_error.status, status);
            assert_eq!(api_error.error.code, code);
        }
    }

    #[test]
    fn test_invalid_input_details_name_the_field() {
        let api_error: ApiErrorResponse = EngineError::invalid("shift_code", "unrecognized").into();
        assert_eq!(api_error.error.details.as_deref(), Some("shift_code"));
    }
}
