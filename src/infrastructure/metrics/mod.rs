//! Prometheus Metrics Module
//!
//! Provides application-wide metrics collection using Prometheus.
//!
//! # Metrics Collected
//! - HTTP request counts by method, path, and status
//! - HTTP request latency histograms
//! - Active WebSocket connection gauge
//! - Live delivery outcomes (delivered, offline, dropped)
//! - Persisted messages and conversation pointer failures

use once_cell::sync::Lazy;
use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, IntGauge, Opts, Registry,
    TextEncoder,
};

const NAMESPACE: &str = "hollow";

/// Global metrics registry
pub static REGISTRY: Lazy<Registry> = Lazy::new(|| {
    let registry = Registry::new();
    register_metrics(&registry);
    registry
});

/// HTTP request counter - tracks total requests by method, path, and status code
pub static HTTP_REQUESTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("http_requests_total", "Total number of HTTP requests").namespace(NAMESPACE),
        &["method", "path", "status"],
    )
    .expect("Failed to create HTTP_REQUESTS_TOTAL metric")
});

/// HTTP request latency histogram - tracks request duration in seconds
pub static HTTP_REQUEST_DURATION_SECONDS: Lazy<HistogramVec> = Lazy::new(|| {
    let buckets = vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0];
    HistogramVec::new(
        HistogramOpts::new(
            "http_request_duration_seconds",
            "HTTP request latency in seconds",
        )
        .namespace(NAMESPACE)
        .buckets(buckets),
        &["method", "path"],
    )
    .expect("Failed to create HTTP_REQUEST_DURATION_SECONDS metric")
});

/// Users with a live WebSocket connection registered in the hub
pub static WEBSOCKET_CONNECTIONS_ACTIVE: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::with_opts(
        Opts::new(
            "websocket_connections_active",
            "Number of users with a registered WebSocket connection",
        )
        .namespace(NAMESPACE),
    )
    .expect("Failed to create WEBSOCKET_CONNECTIONS_ACTIVE metric")
});

/// Hub delivery attempts by outcome
pub static HUB_DELIVERIES_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("hub_deliveries_total", "Live delivery attempts by outcome").namespace(NAMESPACE),
        &["outcome"], // "delivered", "offline", "dropped"
    )
    .expect("Failed to create HUB_DELIVERIES_TOTAL metric")
});

/// Messages durably stored
pub static MESSAGES_PERSISTED_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::with_opts(
        Opts::new("messages_persisted_total", "Direct messages written to storage")
            .namespace(NAMESPACE),
    )
    .expect("Failed to create MESSAGES_PERSISTED_TOTAL metric")
});

/// Sends whose conversation pointer could not be updated
pub static CONVERSATION_POINTER_FAILURES_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::with_opts(
        Opts::new(
            "conversation_pointer_failures_total",
            "Stored messages whose conversation last-message pointer was not updated",
        )
        .namespace(NAMESPACE),
    )
    .expect("Failed to create CONVERSATION_POINTER_FAILURES_TOTAL metric")
});

/// Register all metrics with the registry
fn register_metrics(registry: &Registry) {
    registry
        .register(Box::new(HTTP_REQUESTS_TOTAL.clone()))
        .expect("Failed to register HTTP_REQUESTS_TOTAL");
    registry
        .register(Box::new(HTTP_REQUEST_DURATION_SECONDS.clone()))
        .expect("Failed to register HTTP_REQUEST_DURATION_SECONDS");
    registry
        .register(Box::new(WEBSOCKET_CONNECTIONS_ACTIVE.clone()))
        .expect("Failed to register WEBSOCKET_CONNECTIONS_ACTIVE");
    registry
        .register(Box::new(HUB_DELIVERIES_TOTAL.clone()))
        .expect("Failed to register HUB_DELIVERIES_TOTAL");
    registry
        .register(Box::new(MESSAGES_PERSISTED_TOTAL.clone()))
        .expect("Failed to register MESSAGES_PERSISTED_TOTAL");
    registry
        .register(Box::new(CONVERSATION_POINTER_FAILURES_TOTAL.clone()))
        .expect("Failed to register CONVERSATION_POINTER_FAILURES_TOTAL");
}

/// Collect and encode all metrics as Prometheus text format
pub fn gather_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!(error = %e, "Failed to encode metrics");
        return String::new();
    }
    String::from_utf8(buffer).unwrap_or_default()
}

/// Helper to record HTTP request metrics
pub fn record_http_request(method: &str, path: &str, status: u16, duration_secs: f64) {
    let status = status.to_string();
    HTTP_REQUESTS_TOTAL
        .with_label_values(&[method, path, status.as_str()])
        .inc();
    HTTP_REQUEST_DURATION_SECONDS
        .with_label_values(&[method, path])
        .observe(duration_secs);
}

/// Outcome of a single hub delivery attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryOutcome {
    Delivered,
    Offline,
    Dropped,
}

impl DeliveryOutcome {
    fn as_str(&self) -> &'static str {
        match self {
            Self::Delivered => "delivered",
            Self::Offline => "offline",
            Self::Dropped => "dropped",
        }
    }
}

pub fn record_delivery(outcome: DeliveryOutcome) {
    HUB_DELIVERIES_TOTAL.with_label_values(&[outcome.as_str()]).inc();
}

pub fn set_websocket_connections(active: usize) {
    WEBSOCKET_CONNECTIONS_ACTIVE.set(active as i64);
}

pub fn record_message_persisted() {
    MESSAGES_PERSISTED_TOTAL.inc();
}

pub fn record_conversation_pointer_failure() {
    CONVERSATION_POINTER_FAILURES_TOTAL.inc();
}
