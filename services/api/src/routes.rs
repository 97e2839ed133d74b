use crate::infra::AppState;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use lead_research::error::AppError;
use lead_research::workflows::leads::{
    lead_router, IcpCriteria, LeadWorkflow, QualificationEngine, ScoreBreakdown, SignalRecord,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

#[derive(Debug, Deserialize)]
pub(crate) struct QualifyRequest {
    pub(crate) signals: SignalRecord,
    #[serde(default)]
    pub(crate) criteria: Option<IcpCriteria>,
}

pub(crate) fn with_lead_routes(workflow: Arc<LeadWorkflow>) -> axum::Router {
    lead_router(workflow)
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
        .route(
            "/api/v1/leads/qualify",
            axum::routing::post(qualify_endpoint),
        )
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

pub(crate) async fn qualify_endpoint(
    Json(payload): Json<QualifyRequest>,
) -> Result<Json<ScoreBreakdown>, AppError> {
    let QualifyRequest { signals, criteria } = payload;
    signals.validate()?;

    let engine = QualificationEngine::new(criteria.unwrap_or_default());
    Ok(Json(engine.score(&signals)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use lead_research::workflows::leads::Tier;
    use metrics_exporter_prometheus::PrometheusBuilder;
    use std::sync::atomic::AtomicBool;
    use tower::ServiceExt;

    fn app_state(ready: bool) -> AppState {
        AppState {
            readiness: Arc::new(AtomicBool::new(ready)),
            metrics: Arc::new(PrometheusBuilder::new().build_recorder().handle()),
        }
    }

    fn app(ready: bool) -> axum::Router {
        with_lead_routes(Arc::new(LeadWorkflow::default())).layer(Extension(app_state(ready)))
    }

    #[tokio::test]
    async fn health_and_readiness_report_status() {
        let response = app(false)
            .oneshot(Request::get("/health").body(Body::empty()).expect("request"))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);

        let response = app(false)
            .oneshot(Request::get("/ready").body(Body::empty()).expect("request"))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

        let response = app(true)
            .oneshot(Request::get("/ready").body(Body::empty()).expect("request"))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn metrics_are_rendered_as_text() {
        let response = app(true)
            .oneshot(Request::get("/metrics").body(Body::empty()).expect("request"))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "text/plain; version=0.0.4"
        );
    }

    #[tokio::test]
    async fn qualify_endpoint_scores_signal_records() {
        let request = QualifyRequest {
            signals: SignalRecord {
                employee_count: Some(1000),
                revenue: Some(100_000_000.0),
                ..SignalRecord::default()
            },
            criteria: None,
        };

        let Json(breakdown) = qualify_endpoint(Json(request)).await.expect("scores");
        assert_eq!(breakdown.firmographic.sub_score("company_size"), Some(100.0));
        assert_eq!(breakdown.tier, Tier::D);
    }

    #[tokio::test]
    async fn qualify_endpoint_rejects_malformed_numbers() {
        let request = QualifyRequest {
            signals: SignalRecord {
                revenue: Some(-5.0),
                ..SignalRecord::default()
            },
            criteria: None,
        };

        let error = qualify_endpoint(Json(request))
            .await
            .expect_err("negative revenue");
        assert_eq!(error.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn batch_route_is_mounted() {
        let body = json!({"leads": [{"company_name": "Acme"}]});
        let response = app(true)
            .oneshot(
                Request::post("/api/v1/leads/batch")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(serde_json::to_vec(&body).expect("encode")))
                    .expect("request"),
            )
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);
    }
}
