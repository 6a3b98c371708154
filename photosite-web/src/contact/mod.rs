//! Contact form handling
//!
//! One submission is processed in a fixed order: honeypot, bot-mitigation
//! token, field validation, then mail dispatch. Deployment variants (bot
//! protection on/off, subject required or not, JSON or plain-text replies)
//! are settings of the same service.

pub mod mailer;
pub mod recaptcha;
pub mod validate;

pub use mailer::{MailError, Mailer, OutgoingEmail, SendmailMailer};
pub use recaptcha::{RecaptchaClient, TokenVerifier, VerifyError};
pub use validate::{ContactForm, ValidContact, ValidationErrors};

use axum::http::StatusCode;
use photosite_common::config::ContactSettings;
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info, warn};

pub const SUCCESS_MESSAGE: &str = "Thank you! Your message has been sent successfully.";

/// Successful outcomes; both answer HTTP 200
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactOutcome {
    Sent,
    /// Honeypot was filled: reported as success, nothing sent
    SpamIgnored,
}

/// Rejections, each with the text shown to the submitter
///
/// Verification failures never carry the score.
#[derive(Debug, Error)]
pub enum ContactError {
    #[error("Server configuration error. Please contact the administrator.")]
    Misconfigured,

    #[error("Method not allowed.")]
    MethodNotAllowed,

    #[error("reCAPTCHA token missing. Please try again.")]
    TokenMissing,

    #[error("reCAPTCHA verification failed. You may be a bot. Please try again.")]
    VerificationFailed,

    #[error("{0}")]
    Validation(#[from] ValidationErrors),

    #[error("Sorry, there was a problem sending your message. Please try again later.")]
    Transport,
}

impl ContactError {
    pub fn status(&self) -> StatusCode {
        match self {
            ContactError::Misconfigured | ContactError::Transport => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            ContactError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ContactError::TokenMissing
            | ContactError::VerificationFailed
            | ContactError::Validation(_) => StatusCode::BAD_REQUEST,
        }
    }
}

/// Contact endpoint service
pub struct ContactService {
    settings: ContactSettings,
    verifier: Option<Arc<dyn TokenVerifier>>,
    mailer: Arc<dyn Mailer>,
}

impl ContactService {
    pub fn new(
        settings: ContactSettings,
        verifier: Option<Arc<dyn TokenVerifier>>,
        mailer: Arc<dyn Mailer>,
    ) -> Self {
        Self {
            settings,
            verifier,
            mailer,
        }
    }

    /// Production wiring: siteverify client (when enabled) and sendmail
    pub fn from_settings(settings: ContactSettings) -> Result<Self, VerifyError> {
        let verifier: Option<Arc<dyn TokenVerifier>> = match &settings.recaptcha {
            Some(recaptcha) => Some(Arc::new(RecaptchaClient::new(recaptcha)?)),
            None => None,
        };
        let mailer = Arc::new(SendmailMailer::new(settings.sendmail_path.clone()));
        Ok(Self::new(settings, verifier, mailer))
    }

    pub fn settings(&self) -> &ContactSettings {
        &self.settings
    }

    /// Process one submission
    pub async fn submit(&self, form: &ContactForm) -> Result<ContactOutcome, ContactError> {
        if form.honeypot_filled() {
            info!("Honeypot filled, discarding submission");
            return Ok(ContactOutcome::SpamIgnored);
        }

        let score = self.check_token(form).await?;

        let contact = form.validate(self.settings.require_subject).map_err(|errors| {
            info!(failures = errors.0.len(), "Contact submission failed validation");
            ContactError::Validation(errors)
        })?;

        let email = self.compose(&contact, score);
        if let Err(e) = self.mailer.send(&email).await {
            error!("Failed to send contact email: {}", e);
            return Err(ContactError::Transport);
        }

        info!("Contact email sent");
        Ok(ContactOutcome::Sent)
    }

    /// Verify the bot-mitigation token when protection is enabled
    ///
    /// Returns the score for the admin copy of the email.
    async fn check_token(&self, form: &ContactForm) -> Result<Option<f64>, ContactError> {
        let Some(recaptcha) = &self.settings.recaptcha else {
            return Ok(None);
        };
        let Some(verifier) = &self.verifier else {
            error!("Bot protection enabled but no verifier configured");
            return Err(ContactError::Misconfigured);
        };

        let token = form.recaptcha_token.trim();
        if token.is_empty() {
            return Err(ContactError::TokenMissing);
        }

        match verifier.verify(token).await {
            Ok(score) if score >= recaptcha.threshold => Ok(Some(score)),
            Ok(score) => {
                warn!(score, threshold = recaptcha.threshold, "reCAPTCHA score below threshold");
                Err(ContactError::VerificationFailed)
            }
            Err(e) => {
                warn!("reCAPTCHA verification failed: {}", e);
                Err(ContactError::VerificationFailed)
            }
        }
    }

    fn compose(&self, contact: &ValidContact, score: Option<f64>) -> OutgoingEmail {
        let mut body = format!("Name: {}\nEmail: {}\n", contact.name, contact.email);
        if let Some(subject) = &contact.subject {
            body.push_str(&format!("Subject: {}\n", subject));
        }
        if let Some(score) = score {
            body.push_str(&format!("reCAPTCHA Score: {}\n", score));
        }
        body.push_str(&format!("\nMessage:\n{}\n", contact.message));

        let subject = match &contact.subject {
            Some(subject) => format!("Website Contact: {}", subject),
            None => "Website Contact".to_string(),
        };

        OutgoingEmail {
            to: self.settings.contact_email.clone(),
            from_name: contact.name.clone(),
            from_address: self.settings.from_email.clone(),
            reply_to: contact.email.clone(),
            subject,
            body,
        }
    }
}
