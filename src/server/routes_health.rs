//! # Health & Observability Endpoints
//!
//! | Endpoint | Purpose |
//! |----------|---------|
//! | `GET /api/health` | Service map for the public API (database, email, spam gate) |
//! | `GET /healthz` | Liveness — process is alive |
//! | `GET /readyz` | Readiness — database connected, accepting traffic |
//! | `GET /metrics` | Prometheus scraping endpoint |
//!
//! The readiness probe performs a `SELECT 1` with a 2-second timeout. If the
//! database is unreachable the service returns 503 so the load balancer
//! stops routing traffic until connectivity is restored.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use std::sync::Arc;

use super::AppState;
use crate::spam;

/// GET /api/health — live configuration and connectivity state.
pub(super) async fn handler_api_health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let db_check =
        tokio::time::timeout(std::time::Duration::from_secs(2), state.db.health_check()).await;
    let database = match db_check {
        Ok(Ok(())) => "connected",
        _ => "unreachable",
    };
    let status = if database == "connected" {
        "healthy"
    } else {
        "degraded"
    };

    Json(serde_json::json!({
        "success": true,
        "status": status,
        "services": {
            "database": database,
            "email": if state.notifier.is_configured() { "configured" } else { "disabled" },
            "spamGate": spam::mode_of(&state.config.spam),
        },
    }))
}

/// Liveness probe: returns 200 if the process is running.
pub(super) async fn handler_healthz() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

/// Readiness probe: returns 200 if the service can serve requests.
pub(super) async fn handler_readyz(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let check =
        tokio::time::timeout(std::time::Duration::from_secs(2), state.db.health_check()).await;

    match check {
        Ok(Ok(())) => (StatusCode::OK, "ok"),
        Ok(Err(_)) => (StatusCode::SERVICE_UNAVAILABLE, "database unreachable"),
        Err(_) => (StatusCode::SERVICE_UNAVAILABLE, "database timeout"),
    }
}

/// Prometheus metrics endpoint: returns all metrics in text exposition format.
pub(super) async fn handler_metrics(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let body = state.prom_metrics.encode();
    (
        StatusCode::OK,
        [(
            "content-type",
            "application/openmetrics-text; version=1.0.0; charset=utf-8",
        )],
        body,
    )
}
