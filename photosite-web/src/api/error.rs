//! Error types for page handlers

use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use thiserror::Error;

use crate::loader::LoadError;
use crate::render::Renderer;

/// Page handler errors; the display text is what the visitor sees
#[derive(Debug, Error)]
pub enum ApiError {
    /// Query names no collection (400)
    #[error("No collection specified.")]
    MissingCollection,

    /// Collection metadata could not be loaded (404)
    #[error("Collection could not be loaded. Please return to the portfolio.")]
    CollectionUnavailable(#[from] LoadError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::MissingCollection => StatusCode::BAD_REQUEST,
            ApiError::CollectionUnavailable(_) => StatusCode::NOT_FOUND,
        }
    }

    /// Render as a full error-state page
    pub fn into_page(self, renderer: &Renderer) -> ErrorPage {
        let body = renderer.error_state(&self.to_string());
        ErrorPage {
            status: self.status(),
            html: renderer.page(Some("Error"), &body),
        }
    }
}

/// Rendered error page
#[derive(Debug)]
pub struct ErrorPage {
    pub status: StatusCode,
    pub html: String,
}

impl IntoResponse for ErrorPage {
    fn into_response(self) -> Response {
        (self.status, Html(self.html)).into_response()
    }
}

/// Result type for page handlers
pub type PageResult<T> = Result<T, ErrorPage>;
