//! # Intake Pipeline — Submission Orchestration
//!
//! Runs one submission through the strict gate order: field validation →
//! spam gate → duplicate window → persistence → notification dispatch.
//! Each gate short-circuits; nothing later runs once a gate rejects.
//!
//! Notifications are fire-and-forget: two detached tasks, one per
//! recipient, each logging and swallowing its own failure. A stored
//! submission is reported as accepted no matter what the mail channel does,
//! and the response never waits on it.
//!
//! The duplicate check and the insert are not atomic. Two identical
//! submissions racing through the window probe can both land; that race is
//! accepted rather than closed with a lock or unique index.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

use crate::db::Database;
use crate::notify::Notifier;
use crate::spam::SpamGate;
use crate::submission::{self, ContactPayload, FieldError};

/// Rolling interval during which a repeat email or phone is rejected.
pub const DUPLICATE_WINDOW_MINUTES: i64 = 60;

/// What the caller gets back for an accepted submission.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionSummary {
    pub id: Uuid,
    pub submitted_at: DateTime<Utc>,
    pub form_type: String,
}

#[derive(Debug, Error)]
pub enum SubmitError {
    /// One or more fields failed validation; all violations are carried.
    #[error("Validation failed")]
    Validation(Vec<FieldError>),
    /// The spam gate reported the token as non-human.
    #[error("Spam verification failed. Please try again.")]
    SpamRejected,
    /// A submission with the same email or phone exists inside the window.
    #[error("We already received a submission with this email or phone number. Please wait an hour before trying again.")]
    Duplicate,
    /// The store could not persist the submission.
    #[error("Failed to save submission")]
    Persistence(anyhow::Error),
}

pub struct IntakePipeline {
    db: Database,
    spam: SpamGate,
    notifier: Arc<Notifier>,
}

impl IntakePipeline {
    pub fn new(db: Database, spam: SpamGate, notifier: Arc<Notifier>) -> Self {
        IntakePipeline { db, spam, notifier }
    }

    /// Run one submission through the full gate sequence.
    pub async fn submit(&self, payload: ContactPayload) -> Result<SubmissionSummary, SubmitError> {
        let new = submission::validate(&payload).map_err(SubmitError::Validation)?;

        // Token presence is guaranteed by validation above.
        let token = payload.recaptcha_token.as_deref().unwrap_or("");
        if !self.spam.verify(token).await {
            return Err(SubmitError::SpamRejected);
        }

        let window_start = Utc::now() - Duration::minutes(DUPLICATE_WINDOW_MINUTES);
        let existing = self
            .db
            .find_recent_by_contact(&new.email, &new.phone, window_start)
            .await
            .map_err(SubmitError::Persistence)?;
        if existing.is_some() {
            return Err(SubmitError::Duplicate);
        }

        let stored = self
            .db
            .insert_submission(&new)
            .await
            .map_err(SubmitError::Persistence)?;
        info!(id = %stored.id, form_type = %stored.form_type, "submission stored");

        // Two independent dispatches; neither is awaited before replying and
        // neither failure can affect the other or the stored submission.
        let notifier = Arc::clone(&self.notifier);
        let operator_copy = stored.clone();
        tokio::spawn(async move {
            if let Err(e) = notifier.notify_operator(&operator_copy).await {
                warn!(error = %e, id = %operator_copy.id, "operator notification failed");
            }
        });
        let notifier = Arc::clone(&self.notifier);
        let applicant_copy = stored.clone();
        tokio::spawn(async move {
            if let Err(e) = notifier.notify_applicant(&applicant_copy).await {
                warn!(error = %e, id = %applicant_copy.id, "applicant acknowledgement failed");
            }
        });

        Ok(SubmissionSummary {
            id: stored.id,
            submitted_at: stored.submitted_at,
            form_type: stored.form_type,
        })
    }
}
