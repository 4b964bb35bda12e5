//! Error types for txfeed-api

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use txfeed_core::SourceError;
use txfeed_data::DataError;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Not found: {resource}")]
    NotFound { resource: String },

    #[error("Bad request: {message}")]
    BadRequest { message: String },

    #[error("Internal server error")]
    InternalError,
}

/// JSON body of every error response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub suggestions: Vec<String>,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            ApiError::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ApiError::NotFound { .. } => "NOT_FOUND",
            ApiError::BadRequest { .. } => "BAD_REQUEST",
            ApiError::InternalError => "INTERNAL_ERROR",
        }
    }

    pub fn to_body(&self) -> ErrorBody {
        let suggestions = match self {
            ApiError::NotFound { .. } => vec!["Request /api/employees for the known employee ids".to_string()],
            ApiError::BadRequest { .. } => vec!["Use /api/transactions for the unfiltered feed".to_string()],
            ApiError::InternalError => vec![],
        };
        ErrorBody {
            code: self.code().to_string(),
            message: self.to_string(),
            suggestions,
        }
    }
}

impl From<DataError> for ApiError {
    fn from(error: DataError) -> Self {
        match error {
            DataError::EmployeeNotFound { id } => ApiError::NotFound {
                resource: format!("employee {}", id),
            },
            DataError::PageNotFound { token } => ApiError::NotFound {
                resource: format!("transactions page {}", token),
            },
            other => {
                log::error!(target: "txfeed::api", "dataset error: {}", other);
                ApiError::InternalError
            }
        }
    }
}

impl From<SourceError> for ApiError {
    fn from(error: SourceError) -> Self {
        match error {
            SourceError::Data(e) => e.into(),
            other => {
                log::error!(target: "txfeed::api", "source error: {}", other);
                ApiError::InternalError
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        log::debug!(target: "txfeed::api", "request failed: {}", self);
        (self.status(), Json(self.to_body())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_errors_map_to_not_found() {
        let err = ApiError::from(DataError::PageNotFound { token: "9".into() });
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
        assert_eq!(err.to_body().message, "Not found: transactions page 9");

        let err = ApiError::from(DataError::EmployeeNotFound { id: "zz".into() });
        assert_eq!(err.code(), "NOT_FOUND");
    }

    #[test]
    fn test_other_data_errors_are_internal() {
        let err = ApiError::from(DataError::DuplicateEmployee { id: "e1".into() });
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(err.to_body().suggestions.is_empty());
    }

    #[test]
    fn test_bad_request_body() {
        let body = ApiError::BadRequest {
            message: "employee id must not be empty".into(),
        }
        .to_body();
        assert_eq!(body.code, "BAD_REQUEST");
        assert_eq!(body.suggestions.len(), 1);
    }
}
