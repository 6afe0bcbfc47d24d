//! HTTP request handlers for the addition engine API.
//!
//! This module contains the handler functions for all API endpoints.

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::post,
};
use std::sync::MutexGuard;
use tracing::{info, warn};
use uuid::Uuid;

use crate::billing::{
    BillingAggregator, BillingStore, InMemoryBillingStore, render_submission_csv,
};
use crate::calculation::{
    calculate_revenue, calculate_revenue_with_versions, merge_with_facility_settings,
};
use crate::error::EngineError;
use crate::models::{AdditionSelection, Child, FacilityAdditionSetting, Staff};

use super::request::{
    BillingRunRequest, CalculationRequest, ExportRequest, UsageUploadRequest,
};
use super::response::{
    ApiError, ApiErrorResponse, ConfirmResponse, GenerateResponse, UsageUploadResponse,
};
use super::state::AppState;

/// Creates the API router with all endpoints.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/calculate", post(calculate_handler))
        .route("/billing/usage", post(usage_handler))
        .route("/billing/generate", post(generate_handler))
        .route("/billing/confirm", post(confirm_handler))
        .route("/billing/export", post(export_handler))
        .with_state(state)
}

/// Handler for the `POST /calculate` endpoint.
///
/// Accepts a selection plus staffing/child context and returns the
/// what-if revenue projection.
async fn calculate_handler(
    State(state): State<AppState>,
    payload: Result<Json<CalculationRequest>, JsonRejection>,
) -> Response {
    // Correlation ID for request tracking
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing calculation request");

    // Handle JSON parsing errors
    let request = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => {
            let error = match rejection {
                JsonRejection::JsonDataError(err) => {
                    // The body text carries the detailed error from serde
                    let body_text = err.body_text();
                    warn!(
                        correlation_id = %correlation_id,
                        error = %body_text,
                        "JSON data error"
                    );
                    if body_text.contains("missing field") {
                        ApiError::new("VALIDATION_ERROR", body_text)
                    } else {
                        ApiError::malformed_json(body_text)
                    }
                }
                JsonRejection::JsonSyntaxError(err) => {
                    warn!(
                        correlation_id = %correlation_id,
                        error = %err,
                        "JSON syntax error"
                    );
                    ApiError::malformed_json(format!("Invalid JSON syntax: {}", err))
                }
                JsonRejection::MissingJsonContentType(_) => ApiError::new(
                    "MISSING_CONTENT_TYPE",
                    "Content-Type must be application/json",
                ),
                _ => ApiError::malformed_json("Failed to parse request body"),
            };
            return (StatusCode::BAD_REQUEST, Json(error)).into_response();
        }
    };

    // Convert request types to domain types
    let manual: Vec<AdditionSelection> =
        request.selections.into_iter().map(Into::into).collect();
    let settings: Vec<FacilityAdditionSetting> = request
        .facility_settings
        .into_iter()
        .map(Into::into)
        .collect();
    let staff: Vec<Staff> = request.staff.into_iter().map(Into::into).collect();
    let children: Vec<Child> = request.children.into_iter().map(Into::into).collect();

    // Every selected code must exist in the catalog
    let catalog = state.config().catalog();
    for selection in &manual {
        if catalog.find_addition(&selection.code).is_none() {
            warn!(
                correlation_id = %correlation_id,
                code = %selection.code,
                "Addition not found"
            );
            let api_error: ApiErrorResponse = EngineError::AdditionNotFound {
                code: selection.code.clone(),
            }
            .into();
            return api_error.into_response();
        }
    }

    // Facility settings, when supplied, take over the preset additions
    let selections = if settings.is_empty() {
        manual
    } else {
        merge_with_facility_settings(&manual, catalog.additions(), &settings)
    };

    let unit_price = request
        .unit_price
        .unwrap_or_else(|| state.config().billing().unit_price());

    let result = match request.target_month {
        Some(target) => calculate_revenue_with_versions(
            &selections,
            catalog,
            &staff,
            &children,
            request.base_reward_units,
            request.business_days,
            unit_price,
            target,
        ),
        None => calculate_revenue(
            &selections,
            catalog,
            &staff,
            &children,
            request.base_reward_units,
            request.business_days,
            unit_price,
        ),
    };

    info!(
        correlation_id = %correlation_id,
        selections = selections.len(),
        total_units_per_month = result.total_units_per_month,
        warnings = result.warnings.len(),
        "Calculation completed successfully"
    );
    (StatusCode::OK, Json(result)).into_response()
}

/// Handler for the `POST /billing/usage` endpoint.
///
/// Appends usage records (and optional child master rows) to the store.
/// This is the boundary with the out-of-scope operations UI.
async fn usage_handler(
    State(state): State<AppState>,
    Json(request): Json<UsageUploadRequest>,
) -> Response {
    let mut store = match lock_store(&state) {
        Ok(guard) => guard,
        Err(response) => return response,
    };

    let upserted_children = request.children.len();
    for child in request.children {
        store.upsert_child(child.into());
    }
    let inserted_records = request.records.len();
    for record in request.records {
        store.add_usage_record(record.into());
    }

    info!(inserted_records, upserted_children, "Stored usage upload");
    (
        StatusCode::OK,
        Json(UsageUploadResponse {
            inserted_records,
            upserted_children,
        }),
    )
        .into_response()
}

/// Handler for the `POST /billing/generate` endpoint.
async fn generate_handler(
    State(state): State<AppState>,
    Json(request): Json<BillingRunRequest>,
) -> Response {
    let mut store = match lock_store(&state) {
        Ok(guard) => guard,
        Err(response) => return response,
    };

    let aggregator = BillingAggregator::new(state.config().billing());
    match aggregator.generate(&mut *store, &request.facility_id, request.year_month) {
        Ok(outcome) => (
            StatusCode::OK,
            Json(GenerateResponse {
                records: outcome.records,
                errors: outcome.errors,
            }),
        )
            .into_response(),
        Err(err) => {
            warn!(
                facility_id = %request.facility_id,
                error = %err,
                "Billing generation failed"
            );
            let api_error: ApiErrorResponse = err.into();
            api_error.into_response()
        }
    }
}

/// Handler for the `POST /billing/confirm` endpoint.
async fn confirm_handler(
    State(state): State<AppState>,
    Json(request): Json<BillingRunRequest>,
) -> Response {
    let mut store = match lock_store(&state) {
        Ok(guard) => guard,
        Err(response) => return response,
    };

    let aggregator = BillingAggregator::new(state.config().billing());
    match aggregator.confirm(&mut *store, &request.facility_id, request.year_month) {
        Ok(confirmed) => (StatusCode::OK, Json(ConfirmResponse { confirmed })).into_response(),
        Err(err) => {
            let api_error: ApiErrorResponse = err.into();
            api_error.into_response()
        }
    }
}

/// Handler for the `POST /billing/export` endpoint.
///
/// Renders the submission CSV for a facility and month.
async fn export_handler(
    State(state): State<AppState>,
    Json(request): Json<ExportRequest>,
) -> Response {
    let store = match lock_store(&state) {
        Ok(guard) => guard,
        Err(response) => return response,
    };

    let records = match store.billing_records(&request.facility_id, request.year_month) {
        Ok(records) => records,
        Err(err) => {
            let api_error: ApiErrorResponse = err.into();
            return api_error.into_response();
        }
    };
    let child_ids: Vec<String> = records.iter().map(|r| r.child_id.clone()).collect();
    let children = match store.children(&child_ids) {
        Ok(children) => children,
        Err(err) => {
            let api_error: ApiErrorResponse = err.into();
            return api_error.into_response();
        }
    };

    let csv = render_submission_csv(&request.facility, request.year_month, &records, &children);
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/csv; charset=utf-8")],
        csv,
    )
        .into_response()
}

/// Acquires the billing store lock, mapping a poisoned mutex to a 500.
fn lock_store(state: &AppState) -> Result<MutexGuard<'_, InMemoryBillingStore>, Response> {
    state.store().lock().map_err(|_| {
        ApiErrorResponse {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            error: ApiError::new("STORAGE_ERROR", "Billing store lock poisoned"),
        }
        .into_response()
    })
}
