//! Admin listing and status updates over stored submissions.
//!
//! No authentication guards these endpoints; that matches the source system
//! and is a known gap rather than a feature.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use std::sync::Arc;
use tracing::error;
use uuid::Uuid;

use super::AppState;
use crate::db;
use crate::submission::SubmissionStatus;

#[derive(Deserialize)]
pub(super) struct ListQuery {
    #[serde(default)]
    page: Option<i64>,
    #[serde(default)]
    limit: Option<i64>,
}

/// GET /api/contacts — paginated listing, newest first.
pub(super) async fn handler_contacts_list(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListQuery>,
) -> impl IntoResponse {
    let page = query.page.unwrap_or(1).max(1);
    let limit = query.limit.unwrap_or(10);
    match state.db.list_submissions(page, limit).await {
        Ok((items, total)) => {
            let (limit, _) = db::page_window(page, limit);
            let pages = if total == 0 { 0 } else { (total + limit - 1) / limit };
            (
                StatusCode::OK,
                Json(serde_json::json!({
                    "success": true,
                    "data": items,
                    "pagination": {
                        "page": page,
                        "limit": limit,
                        "total": total,
                        "pages": pages,
                    },
                })),
            )
        }
        Err(e) => {
            error!(error = %e, "failed to list submissions");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({
                    "success": false,
                    "message": "Failed to fetch submissions",
                })),
            )
        }
    }
}

#[derive(Deserialize)]
pub(super) struct StatusBody {
    #[serde(default)]
    status: Option<String>,
}

/// PATCH /api/contacts/{id}/status — set the lifecycle status.
///
/// 400 when the status is outside the enumerated set (nothing is mutated),
/// 404 when the id is unknown or not a valid identifier.
pub(super) async fn handler_contact_update_status(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(body): Json<StatusBody>,
) -> impl IntoResponse {
    let Some(status) = body.status.as_deref().and_then(SubmissionStatus::parse) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({
                "success": false,
                "message": "Status must be one of 'new', 'contacted', 'converted'",
            })),
        );
    };

    let Ok(id) = Uuid::parse_str(&id) else {
        return (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({
                "success": false,
                "message": "Submission not found",
            })),
        );
    };

    match state.db.update_status(id, status).await {
        Ok(Some(submission)) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "success": true,
                "message": "Status updated",
                "data": submission,
            })),
        ),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({
                "success": false,
                "message": "Submission not found",
            })),
        ),
        Err(e) => {
            error!(error = %e, id = %id, "failed to update submission status");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({
                    "success": false,
                    "message": "Failed to update status",
                })),
            )
        }
    }
}
