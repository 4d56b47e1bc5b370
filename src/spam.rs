//! # Spam Gate — Token Verification
//!
//! Verifies the client-supplied anti-automation token against the external
//! verification service before a submission may proceed.
//!
//! The gate short-circuits to "human" in three documented cases: the skip
//! flag is set, the token is a recognized bypass sentinel, or no secret is
//! configured (deliberate fail-open so a misconfigured deployment degrades
//! to accepting traffic instead of dropping it). Transport failures are
//! asymmetric by design: permissive deployments fail open, production fails
//! closed.

use std::time::Duration;

use serde::Deserialize;
use tracing::warn;

use crate::config::{AppConfig, SpamConfig};

/// Tokens that always pass, supporting manual and dev testing without a
/// live verification round-trip.
const BYPASS_TOKENS: [&str; 2] = ["test_token", "dev_token"];

/// Bound on the verification network call.
const VERIFY_TIMEOUT: Duration = Duration::from_secs(5);

/// Gate posture for a given spam configuration: `bypassed`, `unconfigured`
/// (fail-open, no secret), or `active`.
pub fn mode_of(config: &SpamConfig) -> &'static str {
    if config.skip {
        "bypassed"
    } else if config.secret.is_none() {
        "unconfigured"
    } else {
        "active"
    }
}

pub struct SpamGate {
    client: reqwest::Client,
    config: SpamConfig,
    permissive: bool,
}

/// Subset of the siteverify response we care about.
#[derive(Deserialize)]
struct VerifyResponse {
    success: bool,
    #[serde(rename = "error-codes", default)]
    error_codes: Vec<String>,
}

impl SpamGate {
    pub fn new(config: &AppConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(VERIFY_TIMEOUT)
            .build()
            .unwrap_or_default();
        SpamGate {
            client,
            config: config.spam.clone(),
            permissive: config.env.is_permissive(),
        }
    }

    /// Human-readable description of the gate's posture, for the health
    /// endpoint and startup logging.
    pub fn mode(&self) -> &'static str {
        mode_of(&self.config)
    }

    /// Verify a token. Returns true when the submission should be treated
    /// as human.
    pub async fn verify(&self, token: &str) -> bool {
        if self.config.skip {
            return true;
        }
        if BYPASS_TOKENS.contains(&token) {
            return true;
        }
        let Some(secret) = self.config.secret.as_deref() else {
            return true;
        };

        let response = self
            .client
            .post(&self.config.verify_url)
            .form(&[("secret", secret), ("response", token)])
            .send()
            .await;

        match response {
            Ok(resp) => match resp.json::<VerifyResponse>().await {
                Ok(verdict) => {
                    if !verdict.success {
                        warn!(error_codes = ?verdict.error_codes, "spam gate rejected token");
                    }
                    verdict.success
                }
                Err(e) => {
                    warn!(error = %e, "spam gate: unreadable verification response");
                    self.permissive
                }
            },
            Err(e) => {
                warn!(error = %e, permissive = self.permissive, "spam gate: verification call failed");
                self.permissive
            }
        }
    }
}
