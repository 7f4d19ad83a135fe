//! API error type and its status-code policy: maps each
//! `proxy_core::ProxyError` variant onto an HTTP response.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use proxy_core::{DetectError, ProxyError, StreamError};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// The request body didn't match a known provider shape.
    ExtractionFailure,
    /// The PII analyzer was unreachable or returned a non-2xx status.
    DetectorUnavailable,
    /// The PII analyzer's response couldn't be decoded.
    DetectorMalformed,
    /// A masking-internal invariant was violated (entity span bounds).
    MaskingFailure,
    /// The upstream provider call itself failed; `status` is its code.
    UpstreamFailure,
    /// The client disconnected or the upstream stream ended abnormally.
    StreamAborted,
    InternalError,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ApiError {
    pub code: ErrorCode,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    upstream_status: Option<u16>,
}

impl ApiError {
    fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            upstream_status: None,
        }
    }

    /// Construct an `InternalError` directly, for startup-path failures
    /// (bind, address parsing) that never go through `ProxyError`.
    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }

    pub fn status_code(&self) -> StatusCode {
        match self.code {
            ErrorCode::ExtractionFailure => StatusCode::BAD_REQUEST,
            ErrorCode::DetectorUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            ErrorCode::DetectorMalformed => StatusCode::BAD_GATEWAY,
            ErrorCode::MaskingFailure | ErrorCode::InternalError => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            ErrorCode::UpstreamFailure => self
                .upstream_status
                .and_then(|s| StatusCode::from_u16(s).ok())
                .unwrap_or(StatusCode::BAD_GATEWAY),
            // Nonstandard but conventional for "client went away" - there is
            // no response body the client will ever see for this one.
            ErrorCode::StreamAborted => StatusCode::from_u16(499).unwrap_or(StatusCode::OK),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        (status, Json(self)).into_response()
    }
}

impl From<ProxyError> for ApiError {
    fn from(err: ProxyError) -> Self {
        match err {
            ProxyError::Extract(e) => ApiError::new(ErrorCode::ExtractionFailure, e.to_string()),
            ProxyError::Detect(DetectError::Unavailable { .. }) => {
                ApiError::new(ErrorCode::DetectorUnavailable, err.to_string())
            }
            ProxyError::Detect(DetectError::Malformed { .. }) => {
                ApiError::new(ErrorCode::DetectorMalformed, err.to_string())
            }
            ProxyError::Mask(e) => ApiError::new(ErrorCode::MaskingFailure, e.to_string()),
            ProxyError::Stream(StreamError::UpstreamFailure { status, message }) => ApiError {
                code: ErrorCode::UpstreamFailure,
                message,
                upstream_status: Some(status),
            },
            ProxyError::Stream(StreamError::Aborted { reason }) => {
                ApiError::new(ErrorCode::StreamAborted, reason)
            }
            ProxyError::Config(e) => ApiError::new(ErrorCode::InternalError, e.to_string()),
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use proxy_core::ExtractError;

    #[test]
    fn extraction_failure_maps_to_400() {
        let err: ApiError = ProxyError::Extract(ExtractError::UnknownShape {
            reason: "no messages or prompt".to_string(),
        })
        .into();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn detector_unavailable_maps_to_503_not_silently_forwarded() {
        let err: ApiError = ProxyError::Detect(DetectError::Unavailable {
            url: "http://analyzer".to_string(),
            reason: "connection refused".to_string(),
        })
        .into();
        assert_eq!(err.status_code(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn upstream_failure_propagates_the_original_status() {
        let err: ApiError = ProxyError::Stream(StreamError::UpstreamFailure {
            status: 429,
            message: "rate limited".to_string(),
        })
        .into();
        assert_eq!(err.status_code(), StatusCode::TOO_MANY_REQUESTS);
    }
}
