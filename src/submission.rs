//! # Submission — Data Model and Field Validation
//!
//! The central entity of the intake pipeline: one contact-form entry with
//! validated fields and a lifecycle status. Validation collects every
//! violation in one pass so the client gets the full field-level picture
//! instead of the first failure.
//!
//! ## Field rules
//!
//! - `name`: 3–100 characters, letters and spaces only
//! - `email`: valid syntax, ≤255 characters, normalized to lowercase
//! - `phone`: exactly 10 ASCII digits, no country code
//! - `message`: 10–1000 characters
//! - `formType`: `hero` or `final`
//! - `recaptchaToken`: must be present (verified later by the spam gate)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Which form on the marketing site produced the submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormType {
    Hero,
    Final,
}

impl FormType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FormType::Hero => "hero",
            FormType::Final => "final",
        }
    }

    /// Parse from the wire value. Anything outside the enumerated set is rejected.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "hero" => Some(FormType::Hero),
            "final" => Some(FormType::Final),
            _ => None,
        }
    }
}

/// Lifecycle status, mutated only via the admin status update.
///
/// Transitions are unconstrained — any value to any value — but must stay
/// within the enumerated set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionStatus {
    New,
    Contacted,
    Converted,
}

impl SubmissionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubmissionStatus::New => "new",
            SubmissionStatus::Contacted => "contacted",
            SubmissionStatus::Converted => "converted",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "new" => Some(SubmissionStatus::New),
            "contacted" => Some(SubmissionStatus::Contacted),
            "converted" => Some(SubmissionStatus::Converted),
            _ => None,
        }
    }
}

/// A stored submission row. `id` and `submitted_at` are assigned by the
/// store at insert time and never change.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub message: String,
    pub form_type: String,
    pub status: String,
    pub submitted_at: DateTime<Utc>,
}

/// Raw request body for `POST /api/contact`.
///
/// Every field is optional at the deserialization layer so that missing
/// fields surface as field-level validation errors rather than a body
/// rejection.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactPayload {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub form_type: Option<String>,
    #[serde(default)]
    pub recaptcha_token: Option<String>,
}

/// A validated submission ready for insertion. Email is already lowercased.
#[derive(Debug, Clone)]
pub struct NewSubmission {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub message: String,
    pub form_type: FormType,
}

/// One field-level validation failure.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        FieldError {
            field,
            message: message.into(),
        }
    }
}

fn valid_name(name: &str) -> bool {
    let len = name.chars().count();
    (3..=100).contains(&len) && name.chars().all(|c| c.is_alphabetic() || c == ' ')
}

/// Lightweight email syntax check: one `@`, non-empty local part, dotted
/// domain, no whitespace. Deliverability is the mail channel's problem.
fn valid_email(email: &str) -> bool {
    if email.is_empty() || email.len() > 255 || email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.is_empty() || domain.contains('@') {
        return false;
    }
    match domain.split_once('.') {
        Some((host, tld)) => !host.is_empty() && !tld.is_empty(),
        None => false,
    }
}

fn valid_phone(phone: &str) -> bool {
    phone.len() == 10 && phone.bytes().all(|b| b.is_ascii_digit())
}

fn valid_message(message: &str) -> bool {
    let len = message.chars().count();
    (10..=1000).contains(&len)
}

/// Validate a raw payload, collecting every violation.
///
/// Returns the normalized [`NewSubmission`] on success, or the full list of
/// field errors. Whitespace is trimmed before any rule runs; email is
/// lowercased here so everything downstream (duplicate probe, storage,
/// notifications) sees the canonical form.
pub fn validate(payload: &ContactPayload) -> Result<NewSubmission, Vec<FieldError>> {
    let mut errors = Vec::new();

    let name = payload.name.as_deref().unwrap_or("").trim().to_string();
    if !valid_name(&name) {
        errors.push(FieldError::new(
            "name",
            "Name must be 3-100 characters, letters and spaces only",
        ));
    }

    let email = payload
        .email
        .as_deref()
        .unwrap_or("")
        .trim()
        .to_lowercase();
    if !valid_email(&email) {
        errors.push(FieldError::new(
            "email",
            "A valid email address of at most 255 characters is required",
        ));
    }

    let phone = payload.phone.as_deref().unwrap_or("").trim().to_string();
    if !valid_phone(&phone) {
        errors.push(FieldError::new("phone", "Phone must be exactly 10 digits"));
    }

    let message = payload.message.as_deref().unwrap_or("").trim().to_string();
    if !valid_message(&message) {
        errors.push(FieldError::new(
            "message",
            "Message must be 10-1000 characters",
        ));
    }

    let form_type = match payload.form_type.as_deref().and_then(FormType::parse) {
        Some(ft) => ft,
        None => {
            errors.push(FieldError::new(
                "formType",
                "Form type must be 'hero' or 'final'",
            ));
            FormType::Hero
        }
    };

    if payload
        .recaptcha_token
        .as_deref()
        .is_none_or(|t| t.trim().is_empty())
    {
        errors.push(FieldError::new(
            "recaptchaToken",
            "reCAPTCHA token is required",
        ));
    }

    if !errors.is_empty() {
        return Err(errors);
    }

    Ok(NewSubmission {
        name,
        email,
        phone,
        message,
        form_type,
    })
}
