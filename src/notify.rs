//! # Notifier — Outbound Notification Dispatch
//!
//! Renders fixed templates for the two notification recipients and hands
//! them to the transactional-mail HTTP API. The operator message carries the
//! full submission plus quick-action links; the applicant message is a short
//! acknowledgement.
//!
//! An unconfigured channel is a typed state, not an error: `Disabled` makes
//! both calls immediate no-op successes. The two calls are independent —
//! one failing never affects the other — and callers in the pipeline log
//! and swallow failures rather than letting them reach the client.

use serde_json::json;
use thiserror::Error;

use crate::config::EmailConfig;
use crate::submission::Submission;

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("mail API request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("mail API returned status {status}")]
    Api { status: u16 },
}

pub enum Notifier {
    Disabled,
    Configured {
        client: reqwest::Client,
        api_url: String,
        api_token: String,
        from: String,
        operator_to: String,
    },
}

impl Notifier {
    pub fn from_config(email: &EmailConfig) -> Self {
        match email {
            EmailConfig::Disabled => Notifier::Disabled,
            EmailConfig::Configured {
                api_url,
                api_token,
                from,
                operator_to,
            } => Notifier::Configured {
                client: reqwest::Client::new(),
                api_url: api_url.clone(),
                api_token: api_token.clone(),
                from: from.clone(),
                operator_to: operator_to.clone(),
            },
        }
    }

    pub fn is_configured(&self) -> bool {
        matches!(self, Notifier::Configured { .. })
    }

    /// Full-detail alert to the operator inbox.
    pub async fn notify_operator(&self, submission: &Submission) -> Result<(), NotifyError> {
        match self {
            Notifier::Disabled => Ok(()),
            Notifier::Configured { operator_to, .. } => {
                let subject = format!("New contact submission from {}", submission.name);
                self.send(operator_to, &subject, &operator_body(submission))
                    .await
            }
        }
    }

    /// Acknowledgement back to the submitter.
    pub async fn notify_applicant(&self, submission: &Submission) -> Result<(), NotifyError> {
        match self {
            Notifier::Disabled => Ok(()),
            Notifier::Configured { .. } => {
                self.send(
                    &submission.email,
                    "Thanks for getting in touch",
                    &applicant_body(submission),
                )
                .await
            }
        }
    }

    async fn send(&self, to: &str, subject: &str, html: &str) -> Result<(), NotifyError> {
        let Notifier::Configured {
            client,
            api_url,
            api_token,
            from,
            ..
        } = self
        else {
            return Ok(());
        };
        let response = client
            .post(api_url)
            .bearer_auth(api_token)
            .json(&json!({
                "from": from,
                "to": to,
                "subject": subject,
                "html": html,
            }))
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(NotifyError::Api {
                status: response.status().as_u16(),
            });
        }
        Ok(())
    }
}

fn operator_body(s: &Submission) -> String {
    format!(
        "<h2>New contact submission</h2>\
         <p><strong>Name:</strong> {name}</p>\
         <p><strong>Email:</strong> {email}</p>\
         <p><strong>Phone:</strong> {phone}</p>\
         <p><strong>Form:</strong> {form_type}</p>\
         <p><strong>Received:</strong> {submitted_at}</p>\
         <p><strong>Message:</strong></p>\
         <blockquote>{message}</blockquote>\
         <p>\
           <a href=\"mailto:{email}\">Reply by email</a> &middot; \
           <a href=\"tel:{phone}\">Call {phone}</a>\
         </p>",
        name = s.name,
        email = s.email,
        phone = s.phone,
        form_type = s.form_type,
        submitted_at = s.submitted_at.to_rfc3339(),
        message = s.message,
    )
}

fn applicant_body(s: &Submission) -> String {
    format!(
        "<p>Hi {name},</p>\
         <p>Thanks for reaching out. We received your message and will get \
         back to you within one business day.</p>\
         <p>— The team</p>",
        name = s.name,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn submission() -> Submission {
        Submission {
            id: Uuid::new_v4(),
            name: "Jane Doe".into(),
            email: "jane@x.com".into(),
            phone: "9876543210".into(),
            message: "Interested in your product".into(),
            form_type: "hero".into(),
            status: "new".into(),
            submitted_at: Utc::now(),
        }
    }

    #[test]
    fn operator_body_includes_details_and_quick_actions() {
        let body = operator_body(&submission());
        assert!(body.contains("Jane Doe"));
        assert!(body.contains("jane@x.com"));
        assert!(body.contains("9876543210"));
        assert!(body.contains("Interested in your product"));
        assert!(body.contains("mailto:jane@x.com"));
        assert!(body.contains("tel:9876543210"));
    }

    #[test]
    fn applicant_body_is_an_acknowledgement() {
        let body = applicant_body(&submission());
        assert!(body.contains("Hi Jane Doe"));
        assert!(body.contains("We received your message"));
    }

    #[tokio::test]
    async fn disabled_notifier_is_a_noop_success() {
        let n = Notifier::from_config(&EmailConfig::Disabled);
        let s = submission();
        assert!(n.notify_operator(&s).await.is_ok());
        assert!(n.notify_applicant(&s).await.is_ok());
        assert!(!n.is_configured());
    }

    #[tokio::test]
    async fn configured_notifier_surfaces_transport_errors() {
        let n = Notifier::from_config(&EmailConfig::Configured {
            api_url: "http://127.0.0.1:9/send".into(),
            api_token: "token".into(),
            from: "noreply@example.com".into(),
            operator_to: "sales@example.com".into(),
        });
        let s = submission();
        assert!(matches!(
            n.notify_operator(&s).await,
            Err(NotifyError::Transport(_))
        ));
        assert!(matches!(
            n.notify_applicant(&s).await,
            Err(NotifyError::Transport(_))
        ));
    }
}
