use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::models::envelope::Envelope;

pub type Result<T, E = AppError> = std::result::Result<T, E>;

/// A selector rule did not find what one match row needs.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExtractError {
    #[error("missing element `{0}`")]
    MissingElement(&'static str),
    #[error("missing attribute `{attr}` on `{element}`")]
    MissingAttribute {
        element: &'static str,
        attr: &'static str,
    },
    #[error("expected two teams, found {0}")]
    TeamCount(usize),
    #[error("invalid unix timestamp `{0}`")]
    InvalidTimestamp(String),
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("failed to fetch {url} after {attempts} attempts")]
    FetchExhausted { url: String, attempts: u32 },
    #[error("{0}")]
    NotFound(String),
    #[error("unexpected error: {0}")]
    Unexpected(#[from] anyhow::Error),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::FetchExhausted { .. } => StatusCode::BAD_GATEWAY,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Unexpected(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Envelope::<()>::from(Err(self));
        (status, Json(body)).into_response()
    }
}
