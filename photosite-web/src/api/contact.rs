//! Contact form endpoint
//!
//! POST /contact with an urlencoded or multipart form. Replies are JSON
//! (`{"success": bool, "message": ...}`) or plain text depending on config.

use std::convert::Infallible;

use axum::{
    extract::{multipart::MultipartError, FromRequest, Multipart, Request, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Form, Json, Router,
};
use photosite_common::config::ResponseFormat;
use serde::Serialize;
use tracing::warn;

use crate::contact::{ContactError, ContactForm, ContactOutcome, SUCCESS_MESSAGE};
use crate::AppState;

/// JSON reply body
#[derive(Debug, Serialize)]
pub struct ContactResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Contact form read from either an urlencoded or a multipart body
///
/// An unreadable body yields an empty form so the submitter still gets
/// the full list of missing fields.
#[derive(Debug, Default)]
pub struct ContactSubmission(pub ContactForm);

#[axum::async_trait]
impl<S> FromRequest<S> for ContactSubmission
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let form = if is_multipart(&req) {
            match Multipart::from_request(req, state).await {
                Ok(multipart) => read_multipart(multipart).await.map_err(|e| e.to_string()),
                Err(rejection) => Err(rejection.to_string()),
            }
        } else {
            Form::<ContactForm>::from_request(req, state)
                .await
                .map(|Form(form)| form)
                .map_err(|rejection| rejection.to_string())
        };

        Ok(Self(form.unwrap_or_else(|e| {
            warn!("Unreadable contact form body: {}", e);
            ContactForm::default()
        })))
    }
}

fn is_multipart(req: &Request) -> bool {
    req.headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.trim_start().to_ascii_lowercase().starts_with("multipart/form-data"))
        .unwrap_or(false)
}

/// Collect the known text fields; unknown fields are drained and ignored
async fn read_multipart(mut multipart: Multipart) -> Result<ContactForm, MultipartError> {
    let mut form = ContactForm::default();
    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        let value = field.text().await?;
        match name.as_str() {
            "name" => form.name = value,
            "email" => form.email = value,
            "subject" => form.subject = value,
            "message" => form.message = value,
            "website" => form.website = value,
            "recaptcha_token" => form.recaptcha_token = value,
            _ => {}
        }
    }
    Ok(form)
}

/// Build contact routes; any method other than POST gets 405
pub fn contact_routes() -> Router<AppState> {
    Router::new().route("/contact", post(submit_contact).fallback(method_not_allowed))
}

fn reply(format: ResponseFormat, status: StatusCode, success: bool, message: Option<String>) -> Response {
    match format {
        ResponseFormat::Json => (status, Json(ContactResponse { success, message })).into_response(),
        ResponseFormat::Text => {
            let text = message.unwrap_or_else(|| "OK".to_string());
            (status, text).into_response()
        }
    }
}

fn reject(format: ResponseFormat, err: ContactError) -> Response {
    reply(format, err.status(), false, Some(err.to_string()))
}

/// POST /contact
pub async fn submit_contact(
    State(state): State<AppState>,
    ContactSubmission(form): ContactSubmission,
) -> Response {
    let format = state.contact_format;

    let Some(service) = &state.contact else {
        return reject(format, ContactError::Misconfigured);
    };

    match service.submit(&form).await {
        Ok(ContactOutcome::Sent) => reply(
            format,
            StatusCode::OK,
            true,
            Some(SUCCESS_MESSAGE.to_string()),
        ),
        Ok(ContactOutcome::SpamIgnored) => reply(format, StatusCode::OK, true, None),
        Err(err) => reject(format, err),
    }
}

/// Any non-POST request to /contact
pub async fn method_not_allowed(State(state): State<AppState>) -> Response {
    if state.contact.is_none() {
        return reject(state.contact_format, ContactError::Misconfigured);
    }
    reject(state.contact_format, ContactError::MethodNotAllowed)
}
