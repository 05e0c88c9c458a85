use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::documents::DocumentError;
use crate::error::{error_response, RepositoryError};

#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("at least one report column is required")]
    NoColumns,
    #[error("unable to write report: {0}")]
    Csv(#[from] csv::Error),
    #[error("unable to write report: {0}")]
    Write(String),
    #[error(transparent)]
    Document(#[from] DocumentError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl ReportError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::NoColumns => "VALIDATION_ERROR",
            Self::Document(err) => err.code(),
            Self::Csv(_) | Self::Write(_) | Self::Repository(_) => "INTERNAL_ERROR",
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            Self::NoColumns => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Document(err) => err.status(),
            Self::Csv(_) | Self::Write(_) | Self::Repository(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ReportError {
    fn into_response(self) -> Response {
        error_response(self.status(), self.code(), self.to_string())
    }
}
