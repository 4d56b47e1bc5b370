//! # Prometheus Metrics — Exposition for Container Orchestration
//!
//! Exposes leadgate operational metrics in the Prometheus text exposition
//! format for scraping by Prometheus or any OpenMetrics-compatible collector.
//!
//! ## Metrics Exposed
//!
//! | Metric | Type | Labels | Description |
//! |--------|------|--------|-------------|
//! | `leadgate_submissions_total` | Counter | `form_type` | Accepted submissions |
//! | `leadgate_rejections_total` | Counter | `reason` | Rejected submissions (validation, spam, duplicate, rate_limit, persistence) |
//! | `leadgate_http_request_duration_seconds` | Histogram | `method`, `path` | Request latency |
//!
//! The `/metrics` endpoint renders the current registry state on each scrape.

use prometheus_client::encoding::text::encode;
use prometheus_client::metrics::counter::Counter;
use prometheus_client::metrics::family::Family;
use prometheus_client::metrics::histogram::{exponential_buckets, Histogram};
use prometheus_client::registry::Registry;

/// Label set for accepted-submission counts.
#[derive(Clone, Debug, Hash, PartialEq, Eq, prometheus_client::encoding::EncodeLabelSet)]
pub struct FormLabel {
    pub form_type: String,
}

/// Label set for rejection counts.
#[derive(Clone, Debug, Hash, PartialEq, Eq, prometheus_client::encoding::EncodeLabelSet)]
pub struct ReasonLabel {
    pub reason: &'static str,
}

/// Label set for the request-duration histogram.
#[derive(Clone, Debug, Hash, PartialEq, Eq, prometheus_client::encoding::EncodeLabelSet)]
pub struct HttpLabel {
    pub method: String,
    pub path: String,
}

/// Thread-safe metrics registry. All fields are safe to update from any
/// async task; `Family` creates per-label-set instances on first use.
pub struct Metrics {
    pub registry: Registry,
    pub submissions_total: Family<FormLabel, Counter>,
    pub rejections_total: Family<ReasonLabel, Counter>,
    pub http_request_duration: Family<HttpLabel, Histogram>,
}

impl Metrics {
    pub fn new() -> Self {
        let mut registry = Registry::default();

        let submissions_total = Family::<FormLabel, Counter>::default();
        registry.register(
            "leadgate_submissions",
            "Accepted contact-form submissions by form type",
            submissions_total.clone(),
        );

        let rejections_total = Family::<ReasonLabel, Counter>::default();
        registry.register(
            "leadgate_rejections",
            "Rejected contact-form submissions by reason",
            rejections_total.clone(),
        );

        let http_request_duration =
            Family::<HttpLabel, Histogram>::new_with_constructor(|| {
                Histogram::new(exponential_buckets(0.001, 2.0, 14))
            });
        registry.register(
            "leadgate_http_request_duration_seconds",
            "HTTP request duration by method and normalized path",
            http_request_duration.clone(),
        );

        Self {
            registry,
            submissions_total,
            rejections_total,
            http_request_duration,
        }
    }

    /// Render all metrics in Prometheus text exposition format.
    pub fn encode(&self) -> String {
        let mut buf = String::new();
        encode(&mut buf, &self.registry).expect("encoding metrics should not fail");
        buf
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}
