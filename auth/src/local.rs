//! Local strategy: the identity-owning service verifies tokens itself.
use async_trait::async_trait;
use tracing::{debug, error};

use crate::codec::TokenCodec;
use crate::error::AuthError;
use crate::resolver::{IdentityResolver, token_fingerprint};
use crate::subject::SubjectId;

/// Store failure behind an existence check (connection loss, query error, ...).
///
/// Absence is not an error: checkers report it as `Ok(false)`.
#[derive(Debug, thiserror::Error)]
#[error("identity store failure: {0}")]
pub struct StoreError(pub Box<dyn std::error::Error + Send + Sync + 'static>);

impl StoreError {
    pub fn new(e: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self(Box::new(e))
    }
}

/// "Does a subject with this id exist" against the local identity store.
#[async_trait]
pub trait SubjectExistenceChecker: Send + Sync {
    async fn exists(&self, id: SubjectId) -> Result<bool, StoreError>;
}

pub struct LocalVerifier<C> {
    codec: TokenCodec,
    checker: C,
}

impl<C: SubjectExistenceChecker> LocalVerifier<C> {
    pub fn new(codec: TokenCodec, checker: C) -> Self {
        Self { codec, checker }
    }

    /// Signature, expiry and subject claim checks; no store access.
    pub fn verify_token(&self, token: &str) -> Result<SubjectId, AuthError> {
        let claims = self.codec.verify(token).map_err(|e| {
            debug!(token_fp = %token_fingerprint(token), error = %e, "token rejected");
            AuthError::InvalidSignatureOrExpiry
        })?;

        SubjectId::parse(claims.sub.as_deref()).map_err(|e| {
            debug!(token_fp = %token_fingerprint(token), error = %e, "subject claim rejected");
            AuthError::from(e)
        })
    }
}

#[async_trait]
impl<C: SubjectExistenceChecker> IdentityResolver for LocalVerifier<C> {
    async fn resolve(&self, token: &str) -> Result<SubjectId, AuthError> {
        let subject = self.verify_token(token)?;

        match self.checker.exists(subject).await {
            Ok(true) => Ok(subject),
            Ok(false) => Err(AuthError::SubjectNotFound),
            Err(e) => {
                error!(subject = %subject, error = %e, "subject existence check failed");
                Err(AuthError::VerifierTransportFailure)
            }
        }
    }
}
