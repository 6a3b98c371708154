//! Contact form fields, sanitization and validation
//!
//! Validation never stops at the first problem: every failing field adds its
//! message and the caller reports them together.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use thiserror::Error;

static TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").expect("valid tag regex"));

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^[A-Za-z0-9.!#$%&'*+/=?^_`{|}~-]+@[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?)+$",
    )
    .expect("valid email regex")
});

pub const NAME_REQUIRED: &str = "Name is required.";
pub const EMAIL_INVALID: &str = "A valid email address is required.";
pub const SUBJECT_REQUIRED: &str = "Subject is required.";
pub const MESSAGE_REQUIRED: &str = "Message is required.";

/// Raw form submission; every field is optional on the wire
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContactForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub message: String,
    /// Honeypot; humans never see or fill it
    #[serde(default)]
    pub website: String,
    #[serde(default)]
    pub recaptcha_token: String,
}

/// Sanitized, validated submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidContact {
    pub name: String,
    pub email: String,
    pub subject: Option<String>,
    pub message: String,
}

/// Every validation failure of one submission
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}", .0.join(" "))]
pub struct ValidationErrors(pub Vec<&'static str>);

/// Single-line field cleanup: strip markup, drop control characters, trim
pub fn clean_input(value: &str) -> String {
    let stripped = TAG_RE.replace_all(value, "");
    stripped
        .chars()
        .filter(|c| !c.is_control())
        .collect::<String>()
        .trim()
        .to_string()
}

pub fn is_valid_email(email: &str) -> bool {
    email.len() <= 254 && EMAIL_RE.is_match(email)
}

impl ContactForm {
    pub fn honeypot_filled(&self) -> bool {
        !self.website.is_empty()
    }

    /// Sanitize and validate, collecting all failures
    pub fn validate(&self, require_subject: bool) -> Result<ValidContact, ValidationErrors> {
        let name = clean_input(&self.name);
        let email = clean_input(&self.email);
        let subject = clean_input(&self.subject);
        let message = self.message.trim().to_string();

        let mut errors = Vec::new();

        if name.is_empty() {
            errors.push(NAME_REQUIRED);
        }
        if email.is_empty() || !is_valid_email(&email) {
            errors.push(EMAIL_INVALID);
        }
        if require_subject && subject.is_empty() {
            errors.push(SUBJECT_REQUIRED);
        }
        if message.is_empty() {
            errors.push(MESSAGE_REQUIRED);
        }

        if !errors.is_empty() {
            return Err(ValidationErrors(errors));
        }

        Ok(ValidContact {
            name,
            email,
            subject: if subject.is_empty() { None } else { Some(subject) },
            message,
        })
    }
}
