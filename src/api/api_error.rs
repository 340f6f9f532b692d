use hyper::{Body, Response, StatusCode};
use log::error;
use thiserror::Error;

use crate::auth::AuthError;
use crate::health::HealthError;
use crate::query::QueryError;

use super::response_body::error_response;

/// Everything a handler can fail with, already sorted by status code.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    NotFound(String),
    #[error("Method not allowed.")]
    MethodNotAllowed,
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Auth(_) => StatusCode::FORBIDDEN,
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn into_response(self) -> Response<Body> {
        error_response(self.status(), &self.to_string())
    }
}

impl From<QueryError> for ApiError {
    fn from(err: QueryError) -> Self {
        match err {
            QueryError::InvalidDate(e) => ApiError::Validation(e.to_string()),
            QueryError::Storage(e) => {
                error!("{}", e);
                ApiError::Internal("Failed to read sensor data.".to_owned())
            }
        }
    }
}

impl From<HealthError> for ApiError {
    fn from(err: HealthError) -> Self {
        error!("{}", err);
        ApiError::Internal("Health check failed".to_owned())
    }
}
