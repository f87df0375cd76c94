//! Mapping of domain errors onto HTTP responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use passvault_common::Error;

/// JSON body of every error and of plain acknowledgements.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// A domain error on its way out of a handler.
#[derive(Debug)]
pub struct ApiError(pub Error);

impl ApiError {
    /// Missing, unknown or expired bearer token.
    pub fn unauthorized() -> Self {
        Self(Error::NotPermitted("Unauthorized".to_string()))
    }

    /// Status code and client-facing message.
    ///
    /// Server-side failures are reported without detail.
    pub fn parts(&self) -> (StatusCode, String) {
        match &self.0 {
            Error::InvalidInput(m) | Error::EnvelopeFormat(m) => {
                (StatusCode::BAD_REQUEST, m.clone())
            }
            Error::NotPermitted(m) => (StatusCode::UNAUTHORIZED, m.clone()),
            Error::NotFound(_) => (StatusCode::NOT_FOUND, "Not found".to_string()),
            Error::AlreadyExists(m) | Error::Conflict(m) => (StatusCode::CONFLICT, m.clone()),
            _ => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Server error".to_string(),
            ),
        }
    }
}

impl From<Error> for ApiError {
    fn from(e: Error) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = self.parts();
        if status.is_server_error() {
            tracing::error!(error = %self.0, "request failed");
        } else {
            tracing::debug!(%status, error = %self.0, "request rejected");
        }
        (status, Json(MessageResponse::new(message))).into_response()
    }
}

/// Handler result.
pub type ApiResult<T> = std::result::Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(e: Error) -> StatusCode {
        ApiError(e).parts().0
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            status_of(Error::InvalidInput("x".into())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(Error::EnvelopeFormat("x".into())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(Error::NotPermitted("x".into())),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            status_of(Error::NotFound("x".into())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(Error::AlreadyExists("x".into())),
            StatusCode::CONFLICT
        );
        assert_eq!(status_of(Error::Conflict("x".into())), StatusCode::CONFLICT);
        assert_eq!(
            status_of(Error::Storage("disk".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            status_of(Error::Integrity),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_internal_detail_hidden() {
        let (_, message) = ApiError(Error::Storage("/var/lib/secret/path".into())).parts();
        assert_eq!(message, "Server error");
    }

    #[test]
    fn test_not_found_hides_identifier() {
        let (_, message) = ApiError(Error::NotFound("Item not found: 1234".into())).parts();
        assert_eq!(message, "Not found");
    }
}
