//! # Configuration — Explicit Startup Config
//!
//! All config-derived behavior (permissive vs strict spam gating, rate
//! limits, mail channel) lives in one struct built from the environment once
//! at startup and passed into component constructors. Nothing reads process
//! state ad hoc after boot.

use std::time::Duration;

/// Sliding window for the submission-endpoint rate limiter.
pub const RATE_LIMIT_WINDOW: Duration = Duration::from_secs(15 * 60);

/// Deployment mode. Everything that is not explicitly production runs
/// permissive: relaxed rate limits and fail-open spam verification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvMode {
    Production,
    Development,
}

impl EnvMode {
    pub fn from_value(value: &str) -> Self {
        if value.eq_ignore_ascii_case("production") {
            EnvMode::Production
        } else {
            EnvMode::Development
        }
    }

    pub fn is_permissive(self) -> bool {
        self == EnvMode::Development
    }
}

/// Spam-gate settings. `skip` disables verification entirely (local/dev);
/// a missing secret means fail-open by deliberate operational choice.
#[derive(Debug, Clone)]
pub struct SpamConfig {
    pub skip: bool,
    pub secret: Option<String>,
    pub verify_url: String,
}

/// Mail channel settings. "Not configured" is a typed variant, not a null
/// check: with `Disabled`, notification calls are immediate no-op successes.
#[derive(Debug, Clone)]
pub enum EmailConfig {
    Disabled,
    Configured {
        api_url: String,
        api_token: String,
        from: String,
        operator_to: String,
    },
}

impl EmailConfig {
    pub fn is_configured(&self) -> bool {
        matches!(self, EmailConfig::Configured { .. })
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub env: EnvMode,
    pub spam: SpamConfig,
    pub email: EmailConfig,
    /// Max submissions per client inside [`RATE_LIMIT_WINDOW`].
    pub rate_limit_max: u32,
}

/// Default siteverify endpoint, overridable for tests via
/// `RECAPTCHA_VERIFY_URL`.
const DEFAULT_VERIFY_URL: &str = "https://www.google.com/recaptcha/api/siteverify";

fn env_flag(name: &str) -> bool {
    std::env::var(name)
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}

impl AppConfig {
    /// Build the configuration from the environment. Missing optional values
    /// degrade to documented defaults; nothing here can fail.
    pub fn from_env() -> Self {
        let env = EnvMode::from_value(&std::env::var("APP_ENV").unwrap_or_default());

        let spam = SpamConfig {
            skip: env_flag("SKIP_RECAPTCHA"),
            secret: std::env::var("RECAPTCHA_SECRET").ok().filter(|s| !s.is_empty()),
            verify_url: std::env::var("RECAPTCHA_VERIFY_URL")
                .unwrap_or_else(|_| DEFAULT_VERIFY_URL.to_string()),
        };

        let email = match (
            std::env::var("MAIL_API_URL"),
            std::env::var("MAIL_API_TOKEN"),
            std::env::var("MAIL_FROM"),
            std::env::var("OPERATOR_EMAIL"),
        ) {
            (Ok(api_url), Ok(api_token), Ok(from), Ok(operator_to)) => EmailConfig::Configured {
                api_url,
                api_token,
                from,
                operator_to,
            },
            _ => EmailConfig::Disabled,
        };

        let rate_limit_max = std::env::var("RATE_LIMIT_MAX")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or_else(|| default_rate_limit(env));

        AppConfig {
            env,
            spam,
            email,
            rate_limit_max,
        }
    }
}

/// 5 requests per window in production, 20 in permissive mode.
pub(crate) fn default_rate_limit(env: EnvMode) -> u32 {
    if env.is_permissive() {
        20
    } else {
        5
    }
}
