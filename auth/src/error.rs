use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::outcome::AuthStatus;

/// Every way authentication of a request can end other than success.
///
/// All variants except `VerifierTransportFailure` are domain outcomes with a
/// fixed status code. The transport failure is the only 500 and the only case
/// a caller may reasonably retry; its message never carries internal details.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("missing token")]
    MissingToken,
    #[error("invalid or expired token")]
    InvalidSignatureOrExpiry,
    #[error("invalid token: missing subject")]
    MissingSubjectClaim,
    #[error("invalid token: subject must be a non-negative integer")]
    NonIntegerSubject,
    #[error("subject not found")]
    SubjectNotFound,
    #[error("internal server error")]
    VerifierTransportFailure,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub message: String,
}

impl AuthError {
    pub fn status_code(&self) -> StatusCode {
        match self.protocol_status() {
            Some(status) => status.http_status(),
            None => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Wire status for this error, if it has one.
    pub fn protocol_status(&self) -> Option<AuthStatus> {
        match self {
            AuthError::MissingToken => Some(AuthStatus::MissingToken),
            AuthError::InvalidSignatureOrExpiry
            | AuthError::MissingSubjectClaim
            | AuthError::NonIntegerSubject => Some(AuthStatus::Invalid),
            AuthError::SubjectNotFound => Some(AuthStatus::NotFound),
            AuthError::VerifierTransportFailure => None,
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            message: self.to_string(),
        };
        (self.status_code(), Json(body)).into_response()
    }
}
