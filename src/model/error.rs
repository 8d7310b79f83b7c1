use axum::response::{IntoResponse, Response};
use http::StatusCode;
use thiserror::Error as ThisError;

use crate::query::QueryError;

#[derive(ThisError, Debug)]
pub enum AppError {
    #[error("method {0} is not allowed")]
    MethodNotAllowed(http::Method),
    #[error("unsupported content-type: {0:?}")]
    InvalidContentType(Option<String>),
    #[error("invalid payload: {0}")]
    InvalidPayload(#[source] serde_json::Error),
    #[error("invalid method: {0}")]
    InvalidMethod(String),
    #[error("invalid base64 body: {0}")]
    InvalidBody(#[source] data_encoding::DecodeError),
    #[error("failed to compile query: {0}")]
    QueryCompile(#[source] QueryError),
    #[error("fetch failed: {0:#}")]
    Fetch(anyhow::Error),
    #[error("failed to run query: {0}")]
    QueryRun(#[source] QueryError),
    #[error("query task did not complete: {0}")]
    QueryTask(#[source] tokio::task::JoinError),
    #[error("failed to serialize notification payload: {0}")]
    Serialize(#[source] serde_json::Error),
    #[error("notification failed: {0:#}")]
    Notify(anyhow::Error),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            AppError::InvalidContentType(_)
            | AppError::InvalidPayload(_)
            | AppError::InvalidMethod(_)
            | AppError::InvalidBody(_) => StatusCode::BAD_REQUEST,
            AppError::QueryCompile(_)
            | AppError::Fetch(_)
            | AppError::QueryRun(_)
            | AppError::QueryTask(_)
            | AppError::Serialize(_)
            | AppError::Notify(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Text sent back to the caller. Causes only go to the logs.
    pub fn public_message(&self) -> &'static str {
        match self {
            AppError::MethodNotAllowed(_) => "only POST method is supported",
            AppError::InvalidContentType(_) => "invalid content-type",
            AppError::InvalidPayload(_) => "invalid payload",
            AppError::InvalidMethod(_) => "invalid method",
            AppError::InvalidBody(_) => "invalid body",
            AppError::QueryCompile(_) => "failed to parse jq query",
            AppError::Fetch(_) => "failed to request",
            AppError::QueryRun(_) | AppError::QueryTask(_) => "failed to run jq query",
            AppError::Serialize(_) => "failed to marshal json",
            AppError::Notify(_) => "failed to notify",
        }
    }
}

impl From<QueryError> for AppError {
    fn from(err: QueryError) -> Self {
        match err {
            QueryError::Compile(_) => AppError::QueryCompile(err),
            QueryError::Fault(_) => AppError::QueryRun(err),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        (self.status_code(), format!("{}\n", self.public_message())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_errors_are_4xx() {
        assert_eq!(
            AppError::MethodNotAllowed(http::Method::GET).status_code(),
            StatusCode::METHOD_NOT_ALLOWED
        );
        assert_eq!(
            AppError::InvalidMethod("PATCH".to_string()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::InvalidContentType(None).status_code(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_query_errors_map_by_kind() {
        let err = AppError::from(QueryError::Compile("unexpected token".to_string()));
        assert!(matches!(err, AppError::QueryCompile(_)));
        assert_eq!(err.public_message(), "failed to parse jq query");

        let err = AppError::from(QueryError::Fault("boom".to_string()));
        assert!(matches!(err, AppError::QueryRun(_)));
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.public_message(), "failed to run jq query");
    }

    #[test]
    fn test_cause_not_echoed() {
        let err = AppError::Fetch(anyhow::anyhow!("dns error: secret-host.internal"));
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.public_message(), "failed to request");
        assert!(err.to_string().contains("secret-host.internal"));
    }
}
