use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Router,
};
use serde::Deserialize;
use serde_json::json;

use super::batch::{BatchError, LeadBatchProcessor, PlaceholderSignals, SignalProvider};
use super::domain::LeadInput;
use super::enrichment;
use super::import::accept_records;
use super::qualification::IcpCriteria;
use super::report::BatchReport;
use crate::config::DEFAULT_WORKERS;

/// Shared settings for the lead endpoints.
pub struct LeadWorkflow {
    provider: Arc<dyn SignalProvider>,
    default_workers: usize,
}

impl LeadWorkflow {
    pub fn new(default_workers: usize) -> Self {
        Self {
            provider: Arc::new(PlaceholderSignals),
            default_workers,
        }
    }

    pub fn with_provider(mut self, provider: Arc<dyn SignalProvider>) -> Self {
        self.provider = provider;
        self
    }
}

impl Default for LeadWorkflow {
    fn default() -> Self {
        Self::new(DEFAULT_WORKERS)
    }
}

#[derive(Debug, Deserialize)]
pub struct BatchRequest {
    pub leads: Vec<LeadInput>,
    #[serde(default)]
    pub criteria: Option<IcpCriteria>,
    #[serde(default)]
    pub parallel: Option<usize>,
}

/// Router exposing batch qualification and enrichment planning.
pub fn lead_router(workflow: Arc<LeadWorkflow>) -> Router {
    Router::new()
        .route("/api/v1/leads/batch", post(batch_handler))
        .route("/api/v1/leads/plan", post(plan_handler))
        .with_state(workflow)
}

pub(crate) async fn batch_handler(
    State(workflow): State<Arc<LeadWorkflow>>,
    axum::Json(request): axum::Json<BatchRequest>,
) -> Response {
    let (leads, skipped) = match accept_records(request.leads) {
        Ok(accepted) => accepted,
        Err(error) => return error_response(StatusCode::BAD_REQUEST, error.to_string()),
    };
    if let Some(lead_id) = skipped.first() {
        let message = format!("lead {lead_id}: missing company name");
        return error_response(StatusCode::BAD_REQUEST, message);
    }

    let workers = request.parallel.unwrap_or(workflow.default_workers);
    let processor = LeadBatchProcessor::new(request.criteria.unwrap_or_default())
        .with_workers(workers)
        .with_provider(Arc::clone(&workflow.provider));

    match processor.run(leads).await {
        Ok(results) => {
            let report = BatchReport::new(results, None, workers);
            (StatusCode::OK, axum::Json(report)).into_response()
        }
        Err(error @ (BatchError::InvalidWorkerCount(_) | BatchError::InvalidCheckpointCadence)) => {
            error_response(StatusCode::BAD_REQUEST, error.to_string())
        }
        Err(other) => error_response(StatusCode::INTERNAL_SERVER_ERROR, other.to_string()),
    }
}

pub(crate) async fn plan_handler(axum::Json(input): axum::Json<LeadInput>) -> Response {
    match input.into_lead(0) {
        Ok(lead) => (StatusCode::OK, axum::Json(enrichment::plan(&lead))).into_response(),
        Err(error) => error_response(StatusCode::BAD_REQUEST, error.to_string()),
    }
}

fn error_response(status: StatusCode, message: String) -> Response {
    (status, axum::Json(json!({ "error": message }))).into_response()
}
