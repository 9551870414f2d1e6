//! HTTP handler for the House Price Prediction API
//!
//! The handler module is organized into:
//! - `routes`: route definitions, shared state and error mapping
//! - `middleware`: request ids, request logging and metrics
//!
//! Every request is independent. The only shared resource is the model,
//! which is read-only after startup.

pub mod middleware;
pub mod routes;

pub use middleware::{metrics_middleware, request_id_middleware, REQUEST_ID_HEADER};
pub use routes::{create_router, health_check, metrics, predict, root, ApiError, AppState};

use serde::{Deserialize, Serialize};

use crate::error::Violation;

/// Human-readable API name reported by `GET /health`
pub const API_NAME: &str = "House Price Prediction API";

/// API version reported by the probes
pub const API_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Body of `GET /`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RootResponse {
    pub status: String,
    pub version: String,
}

impl Default for RootResponse {
    fn default() -> Self {
        Self {
            status: "API is running".to_string(),
            version: API_VERSION.to_string(),
        }
    }
}

/// Body of `GET /health`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub api: String,
    pub version: String,
}

impl Default for HealthResponse {
    fn default() -> Self {
        Self {
            status: "healthy".to_string(),
            api: API_NAME.to_string(),
            version: API_VERSION.to_string(),
        }
    }
}

/// Error body for 4xx/5xx responses
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Human-readable description of what went wrong
    pub detail: String,
    /// Individual violated constraints (validation failures only)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub violations: Vec<Violation>,
}

impl ErrorResponse {
    pub fn new(detail: impl Into<String>) -> Self {
        Self {
            detail: detail.into(),
            violations: Vec::new(),
        }
    }

    pub fn with_violations(mut self, violations: Vec<Violation>) -> Self {
        self.violations = violations;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_probe_payloads() {
        assert_eq!(
            serde_json::to_value(RootResponse::default()).unwrap(),
            serde_json::json!({ "status": "API is running", "version": "1.0.0" })
        );
        assert_eq!(
            serde_json::to_value(HealthResponse::default()).unwrap(),
            serde_json::json!({
                "status": "healthy",
                "api": "House Price Prediction API",
                "version": "1.0.0"
            })
        );
    }

    #[test]
    fn test_error_response_omits_empty_violations() {
        let json = serde_json::to_value(ErrorResponse::new("Prediction failed: boom")).unwrap();
        assert_eq!(json, serde_json::json!({ "detail": "Prediction failed: boom" }));

        let json = serde_json::to_value(
            ErrorResponse::new("Invalid input").with_violations(vec![Violation::missing("latitude")]),
        )
        .unwrap();
        assert_eq!(json["violations"][0]["code"], "MISSING_FIELD");
    }
}
