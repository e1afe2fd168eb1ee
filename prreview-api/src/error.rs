//! Mapping from engine errors to HTTP responses

use std::any::Any;

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{BoxError, Json};
use prreview_core::Error;
use serde::Serialize;
use tracing::{error, warn};

/// Stable machine-readable error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    TeamExists,
    PrExists,
    PrMerged,
    NotAssigned,
    NoCandidate,
    NotFound,
    InvalidRequest,
    InternalError,
}

#[derive(Debug, Serialize)]
struct ErrorDetail {
    code: ErrorCode,
    message: String,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

/// Wrapper to make the core error usable as an axum error response.
#[derive(Debug)]
pub struct ApiErr(pub Error);

impl ApiErr {
    /// Status and code for the wrapped error
    pub fn classify(&self) -> (StatusCode, ErrorCode) {
        match &self.0 {
            Error::TeamAlreadyExists(_) => (StatusCode::BAD_REQUEST, ErrorCode::TeamExists),
            Error::PullRequestAlreadyExists(_) => (StatusCode::CONFLICT, ErrorCode::PrExists),
            Error::PullRequestMerged(_) => (StatusCode::CONFLICT, ErrorCode::PrMerged),
            Error::ReviewerNotAssigned { .. } => (StatusCode::CONFLICT, ErrorCode::NotAssigned),
            Error::NoEligibleCandidate(_) => (StatusCode::CONFLICT, ErrorCode::NoCandidate),
            e if e.is_not_found() => (StatusCode::NOT_FOUND, ErrorCode::NotFound),
            Error::Validation(_) => (StatusCode::BAD_REQUEST, ErrorCode::InvalidRequest),
            _ => (StatusCode::INTERNAL_SERVER_ERROR, ErrorCode::InternalError),
        }
    }
}

impl IntoResponse for ApiErr {
    fn into_response(self) -> Response {
        let (status, code) = self.classify();

        let message = if self.0.is_domain() || matches!(self.0, Error::Validation(_)) {
            warn!(code = ?code, error = %self.0, "request rejected");
            self.0.to_string()
        } else {
            error!(error = %self.0, "request failed");
            "internal server error".to_string()
        };

        error_response(status, code, message)
    }
}

fn error_response(status: StatusCode, code: ErrorCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorBody {
            error: ErrorDetail {
                code,
                message: message.into(),
            },
        }),
    )
        .into_response()
}

/// Turn a panic inside a handler into the opaque 500 body
pub fn handle_panic(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = panic.downcast_ref::<String>() {
        s.as_str()
    } else if let Some(s) = panic.downcast_ref::<&str>() {
        *s
    } else {
        "unknown panic"
    };

    error!(panic = %detail, "panic recovered");
    error_response(
        StatusCode::INTERNAL_SERVER_ERROR,
        ErrorCode::InternalError,
        "internal server error",
    )
}

/// Map failures raised by tower middleware. A request that runs past the
/// configured timeout gets 504.
pub async fn handle_middleware_error(err: BoxError) -> Response {
    if err.is::<tower::timeout::error::Elapsed>() {
        warn!("request timed out");
        return error_response(
            StatusCode::GATEWAY_TIMEOUT,
            ErrorCode::InternalError,
            "request timed out",
        );
    }

    error!(error = %err, "middleware failure");
    error_response(
        StatusCode::INTERNAL_SERVER_ERROR,
        ErrorCode::InternalError,
        "internal server error",
    )
}

impl From<Error> for ApiErr {
    fn from(err: Error) -> Self {
        Self(err)
    }
}

impl From<JsonRejection> for ApiErr {
    fn from(rejection: JsonRejection) -> Self {
        Self(Error::Validation(rejection.body_text()))
    }
}

impl From<QueryRejection> for ApiErr {
    fn from(rejection: QueryRejection) -> Self {
        Self(Error::Validation(rejection.body_text()))
    }
}
