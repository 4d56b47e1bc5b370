//! Public submission endpoint.
//!
//! Applies the per-client rate limit before handing the payload to the
//! intake pipeline, then maps the pipeline's error taxonomy onto the wire
//! envelope: 400 for validation and spam rejections, 429 for duplicates and
//! rate limiting, 500 for persistence failures (with internal detail only
//! outside production).

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use std::sync::Arc;
use tracing::error;

use super::AppState;
use crate::pipeline::SubmitError;
use crate::prom_metrics::{FormLabel, ReasonLabel};
use crate::submission::ContactPayload;

/// Rate-limit key for a request: first hop of `x-forwarded-for` when the
/// service sits behind a proxy, otherwise a shared bucket.
fn client_key(headers: &HeaderMap) -> String {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| "unknown".to_string())
}

pub(super) async fn handler_contact_submit(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(payload): Json<ContactPayload>,
) -> impl IntoResponse {
    let key = client_key(&headers);
    if !state.rate_limiter.check(&key) {
        state
            .prom_metrics
            .rejections_total
            .get_or_create(&ReasonLabel {
                reason: "rate_limit",
            })
            .inc();
        return (
            StatusCode::TOO_MANY_REQUESTS,
            Json(serde_json::json!({
                "success": false,
                "message": "Too many requests. Please try again later.",
            })),
        );
    }

    match state.pipeline.submit(payload).await {
        Ok(summary) => {
            state
                .prom_metrics
                .submissions_total
                .get_or_create(&FormLabel {
                    form_type: summary.form_type.clone(),
                })
                .inc();
            (
                StatusCode::CREATED,
                Json(serde_json::json!({
                    "success": true,
                    "message": "Submission received",
                    "data": summary,
                })),
            )
        }
        Err(SubmitError::Validation(errors)) => {
            state
                .prom_metrics
                .rejections_total
                .get_or_create(&ReasonLabel {
                    reason: "validation",
                })
                .inc();
            (
                StatusCode::BAD_REQUEST,
                Json(serde_json::json!({
                    "success": false,
                    "message": "Validation failed",
                    "errors": errors,
                })),
            )
        }
        Err(e @ SubmitError::SpamRejected) => {
            state
                .prom_metrics
                .rejections_total
                .get_or_create(&ReasonLabel { reason: "spam" })
                .inc();
            (
                StatusCode::BAD_REQUEST,
                Json(serde_json::json!({
                    "success": false,
                    "message": e.to_string(),
                })),
            )
        }
        Err(e @ SubmitError::Duplicate) => {
            state
                .prom_metrics
                .rejections_total
                .get_or_create(&ReasonLabel { reason: "duplicate" })
                .inc();
            (
                StatusCode::TOO_MANY_REQUESTS,
                Json(serde_json::json!({
                    "success": false,
                    "message": e.to_string(),
                })),
            )
        }
        Err(SubmitError::Persistence(e)) => {
            state
                .prom_metrics
                .rejections_total
                .get_or_create(&ReasonLabel {
                    reason: "persistence",
                })
                .inc();
            error!(error = %e, "failed to persist submission");
            let mut body = serde_json::json!({
                "success": false,
                "message": "Something went wrong. Please try again later.",
            });
            if state.config.env.is_permissive() {
                body["error"] = serde_json::Value::String(e.to_string());
            }
            (StatusCode::INTERNAL_SERVER_ERROR, Json(body))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn client_key_uses_first_forwarded_hop() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-forwarded-for",
            HeaderValue::from_static("203.0.113.7, 10.0.0.1"),
        );
        assert_eq!(client_key(&headers), "203.0.113.7");
    }

    #[test]
    fn client_key_falls_back_to_shared_bucket() {
        assert_eq!(client_key(&HeaderMap::new()), "unknown");

        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static("  "));
        assert_eq!(client_key(&headers), "unknown");
    }
}
