//! HTTP API module for the addition engine.
//!
//! This module provides the REST endpoints for what-if revenue
//! projections and monthly billing runs.

mod handlers;
mod request;
mod response;
mod state;

pub use handlers::create_router;
pub use request::{
    BillingRunRequest, CalculationRequest, ExportRequest, UsageUploadRequest,
};
pub use response::{ApiError, ConfirmResponse, GenerateResponse, UsageUploadResponse};
pub use state::AppState;
