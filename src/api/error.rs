//! HTTP error payloads and mapping from [`CheckoutError`].

use axum::extract::rejection::JsonRejection;
use axum::extract::FromRequest;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::CheckoutError;

const CONNECTION_MARKERS: [&str; 6] = ["connection", "connect", "refused", "timed out", "timeout", "pool"];
const CONNECTION_HINT: &str = "Verifique a conexão com o banco de dados.";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<&'static str>,
}

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self { Self { status, message: message.into() } }
    pub fn bad_request(message: impl Into<String>) -> Self { Self::new(StatusCode::BAD_REQUEST, message) }
    pub fn status(&self) -> StatusCode { self.status }

    /// Server errors whose message reads like a connectivity failure carry a hint.
    pub fn body(&self) -> ErrorBody {
        let lowered = self.message.to_lowercase();
        let looks_like_connection = self.status.is_server_error() && CONNECTION_MARKERS.iter().any(|m| lowered.contains(m));
        ErrorBody { error: self.message.clone(), hint: looks_like_connection.then_some(CONNECTION_HINT) }
    }
}

impl From<CheckoutError> for ApiError {
    fn from(e: CheckoutError) -> Self {
        let status = match &e {
            CheckoutError::NotFound(_) => StatusCode::NOT_FOUND,
            CheckoutError::Validation(_) | CheckoutError::InvalidConfig(_) => StatusCode::BAD_REQUEST,
            CheckoutError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self::new(status, e.to_string())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self { Self::bad_request(rejection.body_text()) }
}

/// JSON body extractor whose rejections answer with [`ErrorBody`] like every other error.
#[derive(Debug, FromRequest)]
#[from_request(via(Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!(status = %self.status, error = %self.message, "request failed");
        } else {
            tracing::debug!(status = %self.status, error = %self.message, "request rejected");
        }
        (self.status, Json(self.body())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(ApiError::from(CheckoutError::NotFound("Produto")).status(), StatusCode::NOT_FOUND);
        assert_eq!(ApiError::from(CheckoutError::Validation("x".into())).status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::from(CheckoutError::InvalidConfig("x".into())).status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::from(CheckoutError::Storage("x".into())).status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_connection_hint_only_for_server_errors() {
        let body = ApiError::from(CheckoutError::Storage("pool timed out while waiting for an open connection".into())).body();
        assert_eq!(body.hint, Some(CONNECTION_HINT));
        let body = ApiError::from(CheckoutError::Storage("duplicate key value".into())).body();
        assert_eq!(body.hint, None);
        let body = ApiError::bad_request("connection field missing").body();
        assert_eq!(body.hint, None);
        assert_eq!(ApiError::from(CheckoutError::NotFound("Produto")).body().error, "Produto não encontrado");
    }
}
