//! Shared test helpers for integration tests.

#![allow(dead_code)]

use leadgate::config::{AppConfig, EmailConfig, EnvMode, SpamConfig};
use leadgate::db::Database;
use leadgate::server::AppState;
use tokio::sync::OnceCell;
use uuid::Uuid;

/// Returns the test database URL from the `TEST_DATABASE_URL` environment variable.
/// Panics if the variable is not set.
pub fn test_db_url() -> String {
    std::env::var("TEST_DATABASE_URL")
        .expect("TEST_DATABASE_URL must be set for integration tests")
}

/// Returns true if the test database URL is configured.
pub fn has_test_db() -> bool {
    std::env::var("TEST_DATABASE_URL").is_ok()
}

static SCHEMA_INIT: OnceCell<()> = OnceCell::const_new();

/// Ensure the test database schema is set up (runs the migration once per
/// test binary).
pub async fn ensure_schema() {
    SCHEMA_INIT
        .get_or_init(|| async {
            let pool = sqlx::PgPool::connect(&test_db_url()).await.unwrap();
            sqlx::raw_sql(include_str!("../../migrations/001_create_submissions.sql"))
                .execute(&pool)
                .await
                .unwrap();
        })
        .await;
}

/// Connect to the test database (also ensures schema is set up) and truncate
/// all tables for test isolation.
pub async fn setup_test_db() -> Database {
    ensure_schema().await;
    let db = Database::connect(&test_db_url())
        .await
        .expect("Failed to connect to test database");
    sqlx::raw_sql("TRUNCATE TABLE submissions")
        .execute(db.pool())
        .await
        .unwrap();
    db
}

/// Test configuration: permissive mode, spam gate bypassed, mail channel
/// disabled, rate limit effectively off.
pub fn test_config() -> AppConfig {
    AppConfig {
        env: EnvMode::Development,
        spam: SpamConfig {
            skip: true,
            secret: None,
            verify_url: "http://127.0.0.1:9/siteverify".to_string(),
        },
        email: EmailConfig::Disabled,
        rate_limit_max: 10_000,
    }
}

/// Build an Axum test app router connected to the test database.
pub async fn build_test_app() -> axum::Router {
    build_test_app_with(test_config()).await
}

/// Build a test router with a custom configuration (rate limits, spam gate
/// posture, environment mode).
pub async fn build_test_app_with(config: AppConfig) -> axum::Router {
    let db = setup_test_db().await;
    let state = AppState::from_config(db, config);
    leadgate::server::build_router(state)
}

/// Shift a submission's timestamp into the past, for duplicate-window and
/// ordering tests.
pub async fn backdate_submission(pool: &sqlx::PgPool, id: Uuid, minutes: i64) {
    sqlx::query("UPDATE submissions SET submitted_at = NOW() - make_interval(mins => $2) WHERE id = $1")
        .bind(id)
        .bind(minutes as i32)
        .execute(pool)
        .await
        .unwrap();
}
