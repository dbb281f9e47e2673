use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use uuid::Uuid;

/// Errors surfaced by the ticker library and mapped onto HTTP responses.
#[derive(Debug, thiserror::Error)]
pub enum TickerError {
    /// A caller broke an input contract (negative limit, missing field, bad range).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A stored row failed validation on read. A server-side data fault.
    #[error("invalid stored record: {0}")]
    InvalidRecord(String),

    #[error("ticker item not found: {0}")]
    NotFound(String),

    /// Only manual items can be edited or deleted through the admin API.
    #[error("cannot modify auto-generated ticker item {0}")]
    NotManual(Uuid),

    #[error("storage error: {0}")]
    Store(#[from] sqlx::Error),
}

impl TickerError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        TickerError::InvalidArgument(msg.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            TickerError::InvalidArgument(_) | TickerError::NotManual(_) => StatusCode::BAD_REQUEST,
            TickerError::NotFound(_) => StatusCode::NOT_FOUND,
            TickerError::InvalidRecord(_) | TickerError::Store(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for TickerError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("ticker request failed: {}", self);
        }
        let body = Json(json!({
            "success": false,
            "error": self.to_string(),
        }));
        (status, body).into_response()
    }
}

pub type TickerResult<T> = Result<T, TickerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = TickerError::invalid("limit must be >= 0, got -1");
        assert_eq!(err.to_string(), "invalid argument: limit must be >= 0, got -1");
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(TickerError::invalid("x").status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            TickerError::NotFound("abc".into()).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            TickerError::NotManual(Uuid::nil()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            TickerError::InvalidRecord("row 1 has no title".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            TickerError::Store(sqlx::Error::RowNotFound).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_into_response_keeps_status() {
        let res = TickerError::NotFound("abc".into()).into_response();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }
}
