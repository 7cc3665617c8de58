//! Strategy seam between the middleware and the way identities are resolved.
use std::sync::Arc;

use async_trait::async_trait;
use sha2::{Digest, Sha256};

use crate::cache::CachedResolver;
use crate::codec::TokenCodec;
use crate::error::AuthError;
use crate::local::{LocalVerifier, SubjectExistenceChecker};
use crate::remote::RemoteVerifier;
use crate::subject::SubjectId;

/// Turns a raw bearer token into the subject it proves, or into the reason it
/// does not.
///
/// Implementations must be safe to call concurrently from any number of
/// requests and must not keep per-token state beyond the call (see
/// [`CachedResolver`] for the one bounded exception).
#[async_trait]
pub trait IdentityResolver: Send + Sync {
    async fn resolve(&self, token: &str) -> Result<SubjectId, AuthError>;
}

/// The configured verification strategy, shared by every request.
///
/// Cheap to clone. Chosen once at startup with [`Authenticator::local`] or
/// [`Authenticator::remote`].
#[derive(Clone)]
pub struct Authenticator {
    resolver: Arc<dyn IdentityResolver>,
}

impl std::fmt::Debug for Authenticator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Authenticator").finish_non_exhaustive()
    }
}

impl Authenticator {
    pub fn new(resolver: Arc<dyn IdentityResolver>) -> Self {
        Self { resolver }
    }

    /// Verify tokens in-process against the local identity store.
    pub fn local<C>(codec: TokenCodec, checker: C) -> Self
    where
        C: SubjectExistenceChecker + 'static,
    {
        Self::new(Arc::new(LocalVerifier::new(codec, checker)))
    }

    /// Delegate verification to the identity-owning service.
    pub fn remote(verifier: RemoteVerifier) -> Self {
        Self::new(Arc::new(verifier))
    }

    /// Put a bounded, time-limited cache of successful resolutions in front of
    /// the current strategy. A zero `ttl` or `capacity` leaves it unchanged.
    pub fn with_cache(self, ttl: std::time::Duration, capacity: usize) -> Self {
        match CachedResolver::new(self.resolver.clone(), ttl, capacity) {
            Some(cached) => Self::new(Arc::new(cached)),
            None => self,
        }
    }

    pub async fn resolve(&self, token: &str) -> Result<SubjectId, AuthError> {
        self.resolver.resolve(token).await
    }
}

/// Short, non-reversible token identifier for logs.
pub fn token_fingerprint(token: &str) -> String {
    let digest = Sha256::digest(token.as_bytes());
    hex::encode(&digest[..6])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fingerprint_is_short_and_stable() {
        let fp = token_fingerprint("header.payload.signature");
        assert_eq!(fp.len(), 12);
        assert_eq!(fp, token_fingerprint("header.payload.signature"));
        assert_ne!(fp, token_fingerprint("header.payload.signaturf"));
        assert!(!fp.contains("header"));
    }
}
