//! Response types for the addition engine API.
//!
//! This module defines the error response structures, success payloads
//! and error mapping for the HTTP API.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use crate::billing::ChildBillingError;
use crate::error::EngineError;
use crate::models::BillingRecord;

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

    /// Creates a validation error response.
    pub fn validation_error(message: impl Into<String>) -> Self {
        Self::new("VALIDATION_ERROR", message)
    }

    /// Creates an addition-not-found error response.
    pub fn addition_not_found(code: &str) -> Self {
        Self::with_details(
            "ADDITION_NOT_FOUND",
            format!("Addition not found: {}", code),
            format!("The addition code '{}' is not in the loaded catalog", code),
        )
    }

    /// Creates a malformed JSON error response.
    pub fn malformed_json(message: impl Into<String>) -> Self {
        Self::new("MALFORMED_JSON", message)
    }
}

/// API error with HTTP status code.
pub struct ApiErrorResponse {
    /// The HTTP status code.
    pub status: StatusCode,
    /// The error body.
    pub error: ApiError,
}

impl IntoResponse for ApiErrorResponse {
    fn into_response(self) -> Response {
        (self.status, Json(self.error)).into_response()
    }
}

impl From<EngineError> for ApiErrorResponse {
    fn from(error: EngineError) -> Self {
        match error {
            EngineError::CatalogNotFound { path } => ApiErrorResponse {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                error: ApiError::with_details(
                    "CATALOG_ERROR",
                    "Catalog configuration error",
                    format!("Catalog file not found: {}", path),
                ),
            },
            EngineError::CatalogParseError { path, message } => ApiErrorResponse {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                error: ApiError::with_details(
                    "CATALOG_ERROR",
                    "Catalog configuration parse error",
                    format!("Failed to parse {}: {}", path, message),
                ),
            },
            EngineError::AdditionNotFound { code } => ApiErrorResponse {
                status: StatusCode::BAD_REQUEST,
                error: ApiError::addition_not_found(&code),
            },
            EngineError::VersionOverlap {
                addition_code,
                first,
                second,
            } => ApiErrorResponse {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                error: ApiError::with_details(
                    "DATA_INTEGRITY_ERROR",
                    format!("Overlapping versions for addition '{}'", addition_code),
                    format!("Ranges starting {} and {} overlap", first, second),
                ),
            },
            EngineError::InvalidPeriod { value } => ApiErrorResponse {
                status: StatusCode::BAD_REQUEST,
                error: ApiError::with_details(
                    "INVALID_PERIOD",
                    format!("Invalid billing period '{}'", value),
                    "Billing periods use the YYYY-MM form",
                ),
            },
            EngineError::NoUsageRecords {
                facility_id,
                period,
            } => ApiErrorResponse {
                status: StatusCode::UNPROCESSABLE_ENTITY,
                error: ApiError::with_details(
                    "NO_USAGE_RECORDS",
                    format!(
                        "No billable usage records for facility '{}' in {}",
                        facility_id, period
                    ),
                    "Record daily usage before generating monthly billing",
                ),
            },
            EngineError::Storage { message } => ApiErrorResponse {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                error: ApiError::with_details("STORAGE_ERROR", "Storage failure", message),
            },
            EngineError::CalculationError { message } => ApiErrorResponse {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                error: ApiError::with_details("CALCULATION_ERROR", "Calculation failed", message),
            },
        }
    }
}

/// Response body of `POST /billing/usage`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsageUploadResponse {
    /// Number of usage records accepted.
    pub inserted_records: usize,
    /// Number of child rows upserted.
    pub upserted_children: usize,
}

/// Response body of `POST /billing/generate`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateResponse {
    /// The draft records written by the run.
    pub records: Vec<BillingRecord>,
    /// Per-child failures; the listed children need a retry.
    pub errors: Vec<ChildBillingError>,
}

/// Response body of `POST /billing/confirm`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfirmResponse {
    /// Number of records transitioned from draft to confirmed.
    pub confirmed: usize,
}
