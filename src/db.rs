//! # Database — PostgreSQL Storage Layer
//!
//! Durable store for contact-form submissions via `sqlx::PgPool`.
//!
//! ## Schema
//!
//! - `submissions`: name, email (lowercase), phone, message, form_type,
//!   status, submitted_at — see `migrations/001_create_submissions.sql`.
//!
//! The store assigns ids (`gen_random_uuid()`) and timestamps (`NOW()`) at
//! insert time. Email, phone, status, and `submitted_at DESC` are indexed so
//! the duplicate-window probe and the admin listing stay cheap as the table
//! grows.

use anyhow::Result;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions};
use uuid::Uuid;

use crate::submission::{NewSubmission, Submission, SubmissionStatus};

const SUBMISSION_COLUMNS: &str = "id, name, email, phone, message, form_type, status, submitted_at";

/// Clamp a raw page/limit pair into query-safe values and compute the offset.
///
/// Pages are 1-indexed; anything below 1 maps to page 1. Page size is capped
/// at 100. Out-of-range pages are not an error — the query simply returns an
/// empty page.
pub(crate) fn page_window(page: i64, page_size: i64) -> (i64, i64) {
    let page = page.max(1);
    let page_size = page_size.clamp(1, 100);
    // Saturate so an absurd page number stays a valid (empty) window
    // instead of overflowing into a negative offset.
    (page_size, page.saturating_sub(1).saturating_mul(page_size))
}

#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Connect to PostgreSQL using the provided database URL.
    ///
    /// Manually parses the URL to preserve the full username — sqlx's
    /// built-in parser strips suffixes that some hosted poolers require.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let url = url::Url::parse(database_url)?;
        let username = urlencoding::decode(url.username())?.into_owned();
        let password = url
            .password()
            .map(|p| urlencoding::decode(p).map(|s| s.into_owned()))
            .transpose()?;
        let mut opts = PgConnectOptions::new()
            .host(url.host_str().unwrap_or("localhost"))
            .port(url.port().unwrap_or(5432))
            .database(url.path().trim_start_matches('/'))
            .username(&username);
        if let Some(ref pw) = password {
            opts = opts.password(pw);
        }
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect_with(opts)
            .await?;
        Ok(Database { pool })
    }

    /// Get a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Health check: execute `SELECT 1` to verify database connectivity.
    pub async fn health_check(&self) -> Result<()> {
        sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&self.pool)
            .await?;
        Ok(())
    }

    /// Insert a validated submission. The database assigns `id` and
    /// `submitted_at`; `status` starts at `new`.
    pub async fn insert_submission(&self, new: &NewSubmission) -> Result<Submission> {
        let sql = format!(
            "INSERT INTO submissions (name, email, phone, message, form_type)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {SUBMISSION_COLUMNS}"
        );
        let row = sqlx::query_as::<_, Submission>(&sql)
            .bind(&new.name)
            .bind(&new.email)
            .bind(&new.phone)
            .bind(&new.message)
            .bind(new.form_type.as_str())
            .fetch_one(&self.pool)
            .await?;
        Ok(row)
    }

    /// Find any submission matching the email OR phone with `submitted_at`
    /// inside the duplicate window. Only existence matters, so no ordering
    /// is imposed among matches.
    pub async fn find_recent_by_contact(
        &self,
        email: &str,
        phone: &str,
        window_start: DateTime<Utc>,
    ) -> Result<Option<Submission>> {
        let sql = format!(
            "SELECT {SUBMISSION_COLUMNS} FROM submissions
             WHERE (email = $1 OR phone = $2) AND submitted_at >= $3
             LIMIT 1"
        );
        let row = sqlx::query_as::<_, Submission>(&sql)
            .bind(email)
            .bind(phone)
            .bind(window_start)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    /// Paginated listing ordered by `submitted_at` descending, newest first.
    ///
    /// Returns the page items together with the total row count so callers
    /// can compute page counts. A page past the end yields an empty list,
    /// not an error.
    pub async fn list_submissions(
        &self,
        page: i64,
        page_size: i64,
    ) -> Result<(Vec<Submission>, i64)> {
        let (limit, offset) = page_window(page, page_size);
        let sql = format!(
            "SELECT {SUBMISSION_COLUMNS} FROM submissions
             ORDER BY submitted_at DESC
             LIMIT $1 OFFSET $2"
        );
        let items = sqlx::query_as::<_, Submission>(&sql)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM submissions")
            .fetch_one(&self.pool)
            .await?;
        Ok((items, total))
    }

    /// Atomically set the status of a submission.
    ///
    /// Returns the updated record, or `None` if the id is unknown. The
    /// status is already constrained to the enumerated set by the type, so
    /// an invalid value can never reach the UPDATE.
    pub async fn update_status(
        &self,
        id: Uuid,
        status: SubmissionStatus,
    ) -> Result<Option<Submission>> {
        let sql = format!(
            "UPDATE submissions SET status = $2 WHERE id = $1
             RETURNING {SUBMISSION_COLUMNS}"
        );
        let row = sqlx::query_as::<_, Submission>(&sql)
            .bind(id)
            .bind(status.as_str())
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }
}
