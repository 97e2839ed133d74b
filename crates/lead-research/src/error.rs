use crate::config::ConfigError;
use crate::telemetry::TelemetryError;
use crate::workflows::leads::{
    BatchError, CheckpointError, ConfigurationError, CriteriaError, IngestError, SignalError,
    ValidationError,
};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::fmt;

#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Io(std::io::Error),
    Json(serde_json::Error),
    Server(axum::Error),
    Ingest(IngestError),
    Validation(ValidationError),
    Criteria(CriteriaError),
    Scoring(ConfigurationError),
    Signal(SignalError),
    Batch(BatchError),
    Checkpoint(CheckpointError),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Json(err) => write!(f, "json error: {}", err),
            AppError::Server(err) => write!(f, "server error: {}", err),
            AppError::Ingest(err) => write!(f, "lead import error: {}", err),
            AppError::Validation(err) => write!(f, "validation error: {}", err),
            AppError::Criteria(err) => write!(f, "criteria error: {}", err),
            AppError::Scoring(err) => write!(f, "scoring error: {}", err),
            AppError::Signal(err) => write!(f, "signal error: {}", err),
            AppError::Batch(err) => write!(f, "batch error: {}", err),
            AppError::Checkpoint(err) => write!(f, "checkpoint error: {}", err),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Io(err) => Some(err),
            AppError::Json(err) => Some(err),
            AppError::Server(err) => Some(err),
            AppError::Ingest(err) => Some(err),
            AppError::Validation(err) => Some(err),
            AppError::Criteria(err) => Some(err),
            AppError::Scoring(err) => Some(err),
            AppError::Signal(err) => Some(err),
            AppError::Batch(err) => Some(err),
            AppError::Checkpoint(err) => Some(err),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match self {
            AppError::Ingest(_)
            | AppError::Validation(_)
            | AppError::Criteria(_)
            | AppError::Scoring(_)
            | AppError::Signal(_)
            | AppError::Json(_)
            | AppError::Batch(BatchError::InvalidWorkerCount(_))
            | AppError::Batch(BatchError::InvalidCheckpointCadence) => StatusCode::BAD_REQUEST,
            AppError::Config(_)
            | AppError::Telemetry(_)
            | AppError::Io(_)
            | AppError::Server(_)
            | AppError::Batch(_)
            | AppError::Checkpoint(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<TelemetryError> for AppError {
    fn from(value: TelemetryError) -> Self {
        Self::Telemetry(value)
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<serde_json::Error> for AppError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

impl From<axum::Error> for AppError {
    fn from(value: axum::Error) -> Self {
        Self::Server(value)
    }
}

impl From<IngestError> for AppError {
    fn from(value: IngestError) -> Self {
        Self::Ingest(value)
    }
}

impl From<ValidationError> for AppError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<CriteriaError> for AppError {
    fn from(value: CriteriaError) -> Self {
        Self::Criteria(value)
    }
}

impl From<ConfigurationError> for AppError {
    fn from(value: ConfigurationError) -> Self {
        Self::Scoring(value)
    }
}

impl From<SignalError> for AppError {
    fn from(value: SignalError) -> Self {
        Self::Signal(value)
    }
}

impl From<BatchError> for AppError {
    fn from(value: BatchError) -> Self {
        Self::Batch(value)
    }
}

impl From<CheckpointError> for AppError {
    fn from(value: CheckpointError) -> Self {
        Self::Checkpoint(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_errors_map_to_bad_request() {
        let response = AppError::from(BatchError::InvalidWorkerCount(0)).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let unsupported = IngestError::UnsupportedFormat("leads.xlsx".to_string());
        let response = AppError::from(unsupported).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn infrastructure_errors_map_to_internal_error() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "disk full");
        let response = AppError::from(io).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
