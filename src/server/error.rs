use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

use crate::errors::GatewayError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("upstream model error: {0}")]
    BadGateway(String),

    #[error("internal error: {0}")]
    Internal(String),
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub status: u16,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::BadGateway(_) => StatusCode::BAD_GATEWAY,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let error = match self {
            ApiError::BadRequest(msg)
            | ApiError::ServiceUnavailable(msg)
            | ApiError::BadGateway(msg)
            | ApiError::Internal(msg) => msg,
        };
        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), error = %error, "request failed");
        } else {
            tracing::warn!(status = status.as_u16(), error = %error, "request rejected");
        }
        (status, Json(ErrorResponse { error, status: status.as_u16() })).into_response()
    }
}

impl From<GatewayError> for ApiError {
    fn from(err: GatewayError) -> Self {
        let msg = err.to_string();
        match err {
            GatewayError::GatewayUnavailable(_) => ApiError::ServiceUnavailable(msg),
            GatewayError::InvalidImage(_) | GatewayError::InvalidAspectRatio { .. } => ApiError::BadRequest(msg),
            GatewayError::LlmProvider(_) | GatewayError::Http(_) | GatewayError::SseParsing(_) => {
                ApiError::BadGateway(msg)
            }
            _ => ApiError::Internal(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gateway_errors_map_to_statuses() {
        let cases = [
            (GatewayError::GatewayUnavailable("loading".into()), StatusCode::SERVICE_UNAVAILABLE),
            (GatewayError::InvalidImage("truncated".into()), StatusCode::BAD_REQUEST),
            (GatewayError::InvalidAspectRatio { ratio: 201.0, max: 200.0 }, StatusCode::BAD_REQUEST),
            (GatewayError::LlmProvider("500 Internal".into()), StatusCode::BAD_GATEWAY),
            (GatewayError::Config("missing".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, expected) in cases {
            assert_eq!(ApiError::from(err).status(), expected);
        }
    }

    #[tokio::test]
    async fn body_is_json_with_status() {
        let resp = ApiError::BadRequest("missing field `file`".into()).into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["status"], 400);
        assert_eq!(json["error"], "missing field `file`");
    }
}
