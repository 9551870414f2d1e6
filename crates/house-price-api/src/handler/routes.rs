//! Route definitions for the House Price Prediction API
//!
//! - GET / - Liveness probe
//! - GET /health - Readiness probe
//! - POST /predict - Price prediction for one district
//! - GET /metrics - Prometheus exposition

use axum::{
    extract::{rejection::JsonRejection, DefaultBodyLimit, State},
    http::{header, StatusCode},
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use super::middleware::{metrics_middleware, request_id_middleware};
use super::{ErrorResponse, HealthResponse, RootResponse};
use crate::config::DEFAULT_MAX_BODY_BYTES;
use crate::contracts::PredictionResult;
use crate::error::{InferenceError, ValidationErrors, Violation};
use crate::model::{predict_price, PriceModel};
use crate::telemetry::{PredictionMetricsRegistry, PredictionOutcome, TelemetryError};
use crate::validation::validate_payload;

/// State shared across all routes
///
/// The model is constructed once at startup and injected here; handlers
/// only ever read it.
#[derive(Clone)]
pub struct AppState {
    pub model: Arc<dyn PriceModel>,
    pub metrics: Arc<PredictionMetricsRegistry>,
    pub max_body_bytes: usize,
}

impl AppState {
    pub fn new(model: Arc<dyn PriceModel>) -> Result<Self, TelemetryError> {
        Ok(Self {
            model,
            metrics: Arc::new(PredictionMetricsRegistry::new()?),
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        })
    }

    pub fn with_max_body_bytes(mut self, bytes: usize) -> Self {
        self.max_body_bytes = bytes;
        self
    }
}

/// API error types
#[derive(Debug)]
pub enum ApiError {
    InvalidInput(ValidationErrors),
    PredictionFailed(InferenceError),
    Internal(String),
}

impl ApiError {
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::InvalidInput(_) => "INVALID_INPUT",
            ApiError::PredictionFailed(_) => "PREDICTION_FAILED",
            ApiError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            ApiError::PredictionFailed(_) | ApiError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(err: ValidationErrors) -> Self {
        ApiError::InvalidInput(err)
    }
}

impl From<InferenceError> for ApiError {
    fn from(err: InferenceError) -> Self {
        ApiError::PredictionFailed(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::InvalidInput(ValidationErrors::single(Violation::invalid_body(
            rejection.body_text(),
        )))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = match self {
            ApiError::InvalidInput(errors) => {
                ErrorResponse::new(format!("Invalid input: {}", errors))
                    .with_violations(errors.into_violations())
            }
            ApiError::PredictionFailed(err) => {
                ErrorResponse::new(format!("Prediction failed: {}", err))
            }
            ApiError::Internal(msg) => ErrorResponse::new(msg),
        };

        (status, Json(body)).into_response()
    }
}

/// Create the router with all routes
pub fn create_router(state: AppState) -> Router {
    let max_body_bytes = state.max_body_bytes;

    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .route("/predict", post(predict))
        .route("/metrics", get(metrics))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            metrics_middleware,
        ))
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(request_id_middleware))
        .with_state(state)
}

/// GET / - Liveness probe
pub async fn root() -> Json<RootResponse> {
    Json(RootResponse::default())
}

/// GET /health - Readiness probe
///
/// Static payload; the process only serves once the model has loaded.
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse::default())
}

/// POST /predict - Predict a house price
///
/// Malformed, incomplete or out-of-range bodies are rejected with 400 before
/// the model is called. Any failure after validation is a 500.
pub async fn predict(
    State(state): State<AppState>,
    payload: Result<Json<serde_json::Value>, JsonRejection>,
) -> Result<Json<PredictionResult>, ApiError> {
    let metrics = state.metrics.prediction();

    let features = match payload
        .map_err(ApiError::from)
        .and_then(|Json(body)| validate_payload(&body).map_err(ApiError::from))
    {
        Ok(features) => features,
        Err(err) => {
            tracing::warn!(
                code = err.error_code(),
                error = %err_detail(&err),
                "Validation error"
            );
            metrics.record_outcome(PredictionOutcome::InvalidInput);
            return Err(err);
        }
    };

    tracing::info!(
        features = ?features.to_feature_vector(),
        "Received prediction request"
    );

    let outcome = {
        let _timer = metrics.start_inference_timer();
        predict_price(state.model.as_ref(), &features)
    };

    match outcome {
        Ok(result) => {
            tracing::info!(
                predicted_price = result.predicted_price,
                model = %state.model.name(),
                "Prediction successful"
            );
            metrics.record_outcome(PredictionOutcome::Success);
            metrics.observe_price(result.predicted_price);
            Ok(Json(result))
        }
        Err(err) => {
            let err = ApiError::PredictionFailed(err);
            tracing::error!(
                code = err.error_code(),
                error = %err_detail(&err),
                model = %state.model.name(),
                "Prediction error"
            );
            metrics.record_outcome(PredictionOutcome::InferenceFailed);
            Err(err)
        }
    }
}

/// GET /metrics - Prometheus text exposition
pub async fn metrics(State(state): State<AppState>) -> Result<Response, ApiError> {
    let body = state
        .metrics
        .encode_text()
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    Ok((
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        body,
    )
        .into_response())
}

fn err_detail(err: &ApiError) -> String {
    match err {
        ApiError::InvalidInput(errors) => errors.to_string(),
        ApiError::PredictionFailed(err) => err.to_string(),
        ApiError::Internal(msg) => msg.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ViolationCode;

    #[test]
    fn test_api_error_status_codes() {
        let err = ApiError::InvalidInput(ValidationErrors::single(Violation::missing("latitude")));
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.error_code(), "INVALID_INPUT");

        let err = ApiError::PredictionFailed(InferenceError::InputShape {
            expected: 12,
            actual: 0,
        });
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.error_code(), "PREDICTION_FAILED");
    }

    #[test]
    fn test_err_detail() {
        let err = ApiError::InvalidInput(ValidationErrors::single(Violation::new(
            "median_income",
            ViolationCode::OutOfRange,
            "field 'median_income' must be > 0, got -1",
        )));
        assert_eq!(err_detail(&err), "field 'median_income' must be > 0, got -1");
    }
}
