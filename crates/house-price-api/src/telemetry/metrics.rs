//! Prometheus metrics for the prediction service
//!
//! - `house_price_http_requests_total` (counter) - Requests by method, route and status
//! - `house_price_http_request_duration_seconds` (histogram) - Request latency
//! - `house_price_predictions_total` (counter) - Prediction outcomes
//! - `house_price_inference_duration_seconds` (histogram) - Model call latency
//! - `house_price_predicted_price` (histogram) - Distribution of returned prices
//!
//! # Example
//!
//! ```rust,no_run
//! use house_price_api::telemetry::{PredictionMetricsRegistry, PredictionOutcome};
//!
//! let registry = PredictionMetricsRegistry::new().unwrap();
//! let metrics = registry.prediction();
//!
//! metrics.record_request("POST", "/predict", 200, 0.004);
//! metrics.record_outcome(PredictionOutcome::Success);
//! metrics.observe_price(312_500.0);
//! ```

use prometheus::{CounterVec, Gauge, Histogram, HistogramOpts, HistogramVec, Opts, Registry};
use std::sync::Arc;
use std::time::Instant;

use super::{Result, TelemetryError};

/// How a single prediction request ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PredictionOutcome {
    Success,
    InvalidInput,
    InferenceFailed,
}

impl PredictionOutcome {
    pub fn as_label(&self) -> &'static str {
        match self {
            PredictionOutcome::Success => "success",
            PredictionOutcome::InvalidInput => "invalid_input",
            PredictionOutcome::InferenceFailed => "inference_failed",
        }
    }
}

/// Prediction service metrics
pub struct PredictionMetrics {
    /// HTTP requests by method, route and status
    requests_total: CounterVec,

    /// HTTP request duration by method and route
    request_duration_seconds: HistogramVec,

    /// Prediction outcomes by result
    predictions_total: CounterVec,

    /// Model call duration
    inference_duration_seconds: Histogram,

    /// Distribution of returned prices
    predicted_price: Histogram,

    /// Model calls currently in progress
    active_inferences: Gauge,
}

impl PredictionMetrics {
    /// Create a new PredictionMetrics instance and register with the provided registry
    pub fn new(registry: Arc<Registry>) -> Result<Self> {
        let requests_total = CounterVec::new(
            Opts::new("http_requests_total", "Total number of HTTP requests")
                .namespace("house_price"),
            &["method", "route", "status"],
        )?;

        let request_duration_seconds = HistogramVec::new(
            HistogramOpts::new(
                "http_request_duration_seconds",
                "HTTP request duration in seconds",
            )
            .namespace("house_price")
            .buckets(vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5]),
            &["method", "route"],
        )?;

        let predictions_total = CounterVec::new(
            Opts::new("predictions_total", "Total number of prediction requests by outcome")
                .namespace("house_price"),
            &["result"],
        )?;

        let inference_duration_seconds = Histogram::with_opts(
            HistogramOpts::new(
                "inference_duration_seconds",
                "Model inference duration in seconds",
            )
            .namespace("house_price")
            .buckets(vec![0.00001, 0.0001, 0.0005, 0.001, 0.005, 0.01, 0.05, 0.1]),
        )?;

        let predicted_price = Histogram::with_opts(
            HistogramOpts::new("predicted_price", "Distribution of predicted house prices")
                .namespace("house_price")
                .buckets(vec![
                    50_000.0, 100_000.0, 150_000.0, 200_000.0, 250_000.0, 300_000.0,
                    400_000.0, 500_000.0, 750_000.0, 1_000_000.0,
                ]),
        )?;

        let active_inferences = Gauge::new(
            "house_price_active_inferences",
            "Number of model calls currently in progress",
        )?;

        registry.register(Box::new(requests_total.clone()))?;
        registry.register(Box::new(request_duration_seconds.clone()))?;
        registry.register(Box::new(predictions_total.clone()))?;
        registry.register(Box::new(inference_duration_seconds.clone()))?;
        registry.register(Box::new(predicted_price.clone()))?;
        registry.register(Box::new(active_inferences.clone()))?;

        Ok(Self {
            requests_total,
            request_duration_seconds,
            predictions_total,
            inference_duration_seconds,
            predicted_price,
            active_inferences,
        })
    }

    /// Record a finished HTTP request
    pub fn record_request(&self, method: &str, route: &str, status: u16, duration_secs: f64) {
        let status = status.to_string();
        self.requests_total
            .with_label_values(&[method, route, status.as_str()])
            .inc();
        self.request_duration_seconds
            .with_label_values(&[method, route])
            .observe(duration_secs);
    }

    /// Record how a prediction request ended
    pub fn record_outcome(&self, outcome: PredictionOutcome) {
        self.predictions_total
            .with_label_values(&[outcome.as_label()])
            .inc();
    }

    /// Record a returned price
    pub fn observe_price(&self, price: f64) {
        self.predicted_price.observe(price);
    }

    /// Start an inference timer (returns a guard that records duration on drop)
    pub fn start_inference_timer(&self) -> InferenceTimer<'_> {
        self.active_inferences.inc();
        InferenceTimer {
            start: Instant::now(),
            metrics: self,
        }
    }
}

/// RAII guard for timing model calls
pub struct InferenceTimer<'a> {
    start: Instant,
    metrics: &'a PredictionMetrics,
}

impl<'a> InferenceTimer<'a> {
    /// Get elapsed time in seconds
    pub fn elapsed_secs(&self) -> f64 {
        self.start.elapsed().as_secs_f64()
    }
}

impl<'a> Drop for InferenceTimer<'a> {
    fn drop(&mut self) {
        self.metrics
            .inference_duration_seconds
            .observe(self.start.elapsed().as_secs_f64());
        self.metrics.active_inferences.dec();
    }
}

/// Registry for all prediction metrics
pub struct PredictionMetricsRegistry {
    registry: Arc<Registry>,
    prediction: PredictionMetrics,
}

impl PredictionMetricsRegistry {
    /// Create a new metrics registry
    pub fn new() -> Result<Self> {
        Self::with_registry(Arc::new(Registry::new()))
    }

    /// Create with an existing Prometheus registry
    pub fn with_registry(registry: Arc<Registry>) -> Result<Self> {
        let prediction = PredictionMetrics::new(Arc::clone(&registry))?;

        Ok(Self {
            registry,
            prediction,
        })
    }

    /// Get the Prometheus registry
    pub fn registry(&self) -> Arc<Registry> {
        Arc::clone(&self.registry)
    }

    /// Get prediction metrics
    pub fn prediction(&self) -> &PredictionMetrics {
        &self.prediction
    }

    /// Gather all metrics in Prometheus format
    pub fn gather(&self) -> Vec<prometheus::proto::MetricFamily> {
        self.registry.gather()
    }

    /// Encode metrics as text for scraping
    pub fn encode_text(&self) -> Result<String> {
        use prometheus::Encoder;
        let encoder = prometheus::TextEncoder::new();
        let metric_families = self.gather();
        let mut buffer = Vec::new();
        encoder
            .encode(&metric_families, &mut buffer)
            .map_err(|e| TelemetryError::MetricsError(prometheus::Error::Msg(e.to_string())))?;
        String::from_utf8(buffer)
            .map_err(|e| TelemetryError::MetricsError(prometheus::Error::Msg(e.to_string())))
    }
}
