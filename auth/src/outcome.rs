//! The status protocol shared across the service boundary.
//!
//! Wire form: `{"Status": <0..3>, "ID": <int>}`. The integer values below are
//! the contract between the identity service and every dependent service and
//! must never be renumbered. A change in meaning requires a new
//! [`PROTOCOL_VERSION`].
use axum::http::{HeaderName, StatusCode};
use serde::{Deserialize, Serialize};

use crate::error::AuthError;
use crate::subject::SubjectId;

/// Version advertised in the [`PROTOCOL_HEADER`] of verification responses.
pub const PROTOCOL_VERSION: u8 = 1;
pub const PROTOCOL_HEADER: HeaderName = HeaderName::from_static("auth-protocol");

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum AuthStatus {
    MissingToken = 0,
    Invalid = 1,
    NotFound = 2,
    Ok = 3,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("unknown auth status {0}")]
pub struct UnknownStatus(pub u8);

impl TryFrom<u8> for AuthStatus {
    type Error = UnknownStatus;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::MissingToken),
            1 => Ok(Self::Invalid),
            2 => Ok(Self::NotFound),
            3 => Ok(Self::Ok),
            other => Err(UnknownStatus(other)),
        }
    }
}

impl From<AuthStatus> for u8 {
    fn from(status: AuthStatus) -> Self {
        status as u8
    }
}

impl AuthStatus {
    /// HTTP status a protected route answers with for this outcome.
    pub fn http_status(self) -> StatusCode {
        match self {
            AuthStatus::MissingToken | AuthStatus::Invalid => StatusCode::UNAUTHORIZED,
            AuthStatus::NotFound => StatusCode::NOT_FOUND,
            AuthStatus::Ok => StatusCode::OK,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthOutcome {
    #[serde(rename = "Status")]
    pub status: AuthStatus,
    // Only meaningful when status is Ok; 0 otherwise.
    #[serde(rename = "ID", default)]
    pub id: i64,
}

impl AuthOutcome {
    pub fn ok(subject: SubjectId) -> Self {
        Self {
            status: AuthStatus::Ok,
            id: subject.as_i64(),
        }
    }

    pub fn rejected(status: AuthStatus) -> Self {
        Self { status, id: 0 }
    }

    /// Map a local resolution onto the wire.
    ///
    /// Returns `None` for verifier failures, which have no protocol status and
    /// are answered as a plain 500 instead.
    pub fn from_resolution(result: &Result<SubjectId, AuthError>) -> Option<Self> {
        match result {
            Ok(subject) => Some(Self::ok(*subject)),
            Err(err) => err.protocol_status().map(Self::rejected),
        }
    }
}
