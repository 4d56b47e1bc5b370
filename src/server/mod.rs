//! # Server — HTTP Surface for Intake and Admin
//!
//! Runs the Axum HTTP server: the public submission endpoint, the admin
//! listing/update surface, health probes, and Prometheus exposition.
//!
//! The admin endpoints carry no authentication, matching the source system;
//! an access-control layer would slot in as tower middleware in front of
//! `/api/contacts`.

mod routes_admin;
mod routes_contact;
mod routes_health;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use axum::extract::Request;
use axum::http::{StatusCode, Uri};
use axum::middleware::Next;
use axum::response::IntoResponse;
use axum::routing::{get, patch, post};
use axum::{Json, Router};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn, Instrument};

use crate::config::{AppConfig, RATE_LIMIT_WINDOW};
use crate::db::Database;
use crate::notify::Notifier;
use crate::pipeline::IntakePipeline;
use crate::prom_metrics::{self, Metrics};
use crate::rate_limit::RateLimiter;
use crate::spam::SpamGate;

pub struct AppState {
    pub db: Database,
    pub config: AppConfig,
    pub pipeline: IntakePipeline,
    pub notifier: Arc<Notifier>,
    pub rate_limiter: RateLimiter,
    pub prom_metrics: Metrics,
}

impl AppState {
    pub fn from_config(db: Database, config: AppConfig) -> Arc<Self> {
        let notifier = Arc::new(Notifier::from_config(&config.email));
        let pipeline = IntakePipeline::new(db.clone(), SpamGate::new(&config), Arc::clone(&notifier));
        let rate_limiter = RateLimiter::new(config.rate_limit_max, RATE_LIMIT_WINDOW);
        Arc::new(AppState {
            db,
            config,
            pipeline,
            notifier,
            rate_limiter,
            prom_metrics: Metrics::new(),
        })
    }
}

/// Middleware that records HTTP request duration into the Prometheus
/// histogram, generates (or propagates) a request ID for correlation, and
/// wraps the request in a tracing span using `.instrument()` for proper
/// async propagation.
async fn metrics_middleware(
    axum::extract::State(state): axum::extract::State<Arc<AppState>>,
    req: Request,
    next: Next,
) -> axum::response::Response {
    let request_id = req
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string())
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
    let method = req.method().to_string();
    let raw_path = req.uri().path().to_string();
    let norm_path = normalize_path(&raw_path);
    let start = std::time::Instant::now();

    let span = tracing::info_span!(
        "request",
        request_id = %request_id,
        method = %method,
        path = %raw_path,
    );
    let mut response = next.run(req).instrument(span).await;

    let duration = start.elapsed().as_secs_f64();
    state
        .prom_metrics
        .http_request_duration
        .get_or_create(&prom_metrics::HttpLabel {
            method,
            path: norm_path,
        })
        .observe(duration);

    if let Ok(value) = request_id.parse() {
        response.headers_mut().insert("x-request-id", value);
    }
    response
}

/// Normalize URL path to collapse high-cardinality segments (UUIDs, numeric
/// IDs) into placeholders, preventing histogram label explosion.
fn normalize_path(path: &str) -> String {
    path.split('/')
        .map(|seg| {
            if seg.is_empty() {
                seg.to_string()
            } else if seg.chars().all(|c| c.is_ascii_digit()) {
                ":id".to_string()
            } else if seg.len() == 36 && seg.chars().filter(|c| *c == '-').count() == 4 {
                ":uuid".to_string()
            } else {
                seg.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join("/")
}

const API_ENDPOINTS: [&str; 4] = [
    "POST /api/contact",
    "GET /api/contacts",
    "PATCH /api/contacts/{id}/status",
    "GET /api/health",
];

/// Catch-all for unmatched routes. `/api/*` misses get the endpoint list;
/// everything else a generic 404.
async fn handler_fallback(uri: Uri) -> impl IntoResponse {
    if uri.path() == "/api" || uri.path().starts_with("/api/") {
        (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({
                "success": false,
                "message": "Endpoint not found",
                "availableEndpoints": API_ENDPOINTS,
            })),
        )
    } else {
        (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({
                "success": false,
                "message": "Not found",
            })),
        )
    }
}

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/contact", post(routes_contact::handler_contact_submit))
        .route("/api/contacts", get(routes_admin::handler_contacts_list))
        .route(
            "/api/contacts/{id}/status",
            patch(routes_admin::handler_contact_update_status),
        )
        .route("/api/health", get(routes_health::handler_api_health))
        .route("/healthz", get(routes_health::handler_healthz))
        .route("/readyz", get(routes_health::handler_readyz))
        .route("/metrics", get(routes_health::handler_metrics))
        .fallback(handler_fallback)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(CatchPanicLayer::new())
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            metrics_middleware,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(RequestBodyLimitLayer::new(64 * 1024))
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(30),
        ))
        .with_state(state)
}

pub async fn run(port: u16, database_url: &str, config: AppConfig) -> Result<()> {
    let db = Database::connect(database_url).await?;
    if let Err(e) = db.health_check().await {
        warn!(error = %e, "database reachable check failed at startup");
    }

    info!(
        permissive = config.env.is_permissive(),
        email_configured = config.email.is_configured(),
        spam_gate = crate::spam::mode_of(&config.spam),
        rate_limit_max = config.rate_limit_max,
        "intake service configuration"
    );

    let state = AppState::from_config(db, config);
    let app = build_router(state);

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));
    info!(port, "intake server running");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("intake server shut down gracefully");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();
    #[cfg(unix)]
    {
        let mut sigterm = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler");
        tokio::select! { _ = ctrl_c => info!("received SIGINT, shutting down"), _ = sigterm.recv() => info!("received SIGTERM, shutting down") }
    }
    #[cfg(not(unix))]
    {
        ctrl_c.await.ok();
        info!("received SIGINT, shutting down");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_path_preserves_api_routes() {
        assert_eq!(normalize_path("/api/contact"), "/api/contact");
        assert_eq!(normalize_path("/api/contacts"), "/api/contacts");
        assert_eq!(normalize_path("/metrics"), "/metrics");
    }

    #[test]
    fn normalize_path_collapses_uuids() {
        assert_eq!(
            normalize_path("/api/contacts/550e8400-e29b-41d4-a716-446655440000/status"),
            "/api/contacts/:uuid/status"
        );
    }

    #[test]
    fn normalize_path_collapses_numeric_ids() {
        assert_eq!(normalize_path("/api/contacts/42/status"), "/api/contacts/:id/status");
    }

    #[test]
    fn normalize_path_handles_empty_and_root() {
        assert_eq!(normalize_path("/"), "/");
        assert_eq!(normalize_path(""), "");
    }
}
