//! Resolved identity carried by an authenticated request.
//!
//! A `SubjectId` is the numeric id of a customer in the identity store. It is
//! inserted into the request extensions by the middleware and read back by
//! handlers through [`AuthSubject`]; it is never stored outside the request.

use std::fmt;

use axum::{extract::FromRequestParts, http::request::Parts};

use crate::error::AuthError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubjectId(i64);

/// Why a `sub` claim could not be turned into a [`SubjectId`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SubjectParseError {
    #[error("subject claim is missing")]
    Missing,
    #[error("subject claim is not a non-negative integer")]
    NotAnInteger,
}

impl SubjectId {
    /// Returns `None` for negative ids.
    pub fn new(id: i64) -> Option<Self> {
        (id >= 0).then_some(Self(id))
    }

    /// Parse the `sub` claim of a verified token.
    ///
    /// Only plain decimal digits are accepted: no sign, no whitespace, and the
    /// value must fit in an `i64`.
    pub fn parse(sub: Option<&str>) -> Result<Self, SubjectParseError> {
        let sub = match sub {
            Some(s) if !s.is_empty() => s,
            _ => return Err(SubjectParseError::Missing),
        };

        if !sub.bytes().all(|b| b.is_ascii_digit()) {
            return Err(SubjectParseError::NotAnInteger);
        }

        sub.parse::<i64>()
            .map(Self)
            .map_err(|_| SubjectParseError::NotAnInteger)
    }

    pub fn as_i64(self) -> i64 {
        self.0
    }
}

impl fmt::Display for SubjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<SubjectParseError> for AuthError {
    fn from(e: SubjectParseError) -> Self {
        match e {
            SubjectParseError::Missing => AuthError::MissingSubjectClaim,
            SubjectParseError::NotAnInteger => AuthError::NonIntegerSubject,
        }
    }
}

/// Handler-side access to the authenticated subject.
///
/// The middleware must already have inserted the `SubjectId` into the request
/// extensions. If it is absent the route was not wrapped, and the request is
/// rejected as unauthenticated.
#[derive(Debug, Clone, Copy)]
pub struct AuthSubject(pub SubjectId);

impl<S> FromRequestParts<S> for AuthSubject
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<SubjectId>()
            .copied()
            .map(AuthSubject)
            .ok_or(AuthError::MissingToken)
    }
}
