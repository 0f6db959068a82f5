//! HTTP error mapping for the web layer.
//!
//! Client errors get the bare status phrase. Server errors are logged with
//! full detail and the client sees only "Internal Server Error".

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use snippetbox_store::StoreError;

use crate::templates::TemplateError;

/// Result type alias for request handlers.
pub type AppResult<T> = Result<T, AppError>;

/// Errors a request handler can end with.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Malformed request syntax (unparsable form body).
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Malformed id or unknown route.
    #[error("not found")]
    NotFound,

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Template(#[from] TemplateError),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Store(e) if e.is_not_found() => StatusCode::NOT_FOUND,
            Self::Store(_) | Self::Template(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Plain-text response carrying only the canonical reason phrase.
pub fn status_response(status: StatusCode) -> Response {
    let phrase = status.canonical_reason().unwrap_or("Unknown Status");
    (status, phrase.to_string()).into_response()
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, detail = ?self, "server error");
        } else {
            tracing::debug!(error = %self, %status, "client error");
        }
        status_response(status)
    }
}
