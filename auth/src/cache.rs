//! Optional short-lived cache of successful resolutions.
//!
//! Bounded by entry count (LRU eviction) and by a per-entry deadline, guarded
//! by a mutex, and keyed by the SHA-256 digest of the token so that raw tokens
//! are never held. An entry's deadline is the earlier of the cache TTL and the
//! token's own `exp`, so a token never outlives its expiry through the cache.
//! Only `Ok` resolutions are cached; every rejection and failure goes to the
//! inner strategy again on the next request.
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::Utc;
use lru::LruCache;
use sha2::{Digest, Sha256};
use tokio::sync::Mutex;

use crate::codec::unverified_expiry;
use crate::error::AuthError;
use crate::resolver::IdentityResolver;
use crate::subject::SubjectId;

type TokenDigest = [u8; 32];

struct Entry {
    subject: SubjectId,
    expires_at: Instant,
}

pub struct CachedResolver {
    inner: Arc<dyn IdentityResolver>,
    entries: Mutex<LruCache<TokenDigest, Entry>>,
    ttl: Duration,
}

impl CachedResolver {
    /// Returns `None` when `ttl` or `capacity` is zero (caching disabled).
    pub fn new(inner: Arc<dyn IdentityResolver>, ttl: Duration, capacity: usize) -> Option<Self> {
        if ttl.is_zero() {
            return None;
        }
        let capacity = NonZeroUsize::new(capacity)?;

        Some(Self {
            inner,
            entries: Mutex::new(LruCache::new(capacity)),
            ttl,
        })
    }

    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    async fn lookup(&self, key: &TokenDigest) -> Option<SubjectId> {
        let mut entries = self.entries.lock().await;
        let fresh = entries
            .get(key)
            .map(|entry| (entry.subject, Instant::now() < entry.expires_at));

        match fresh {
            Some((subject, true)) => Some(subject),
            Some((_, false)) => {
                entries.pop(key);
                None
            }
            None => None,
        }
    }

    /// How long a resolution of `token` may be reused, if at all.
    fn lifetime(&self, token: &str) -> Option<Duration> {
        let exp = unverified_expiry(token)?;
        let remaining = (exp - Utc::now()).to_std().ok()?;
        let lifetime = remaining.min(self.ttl);
        (!lifetime.is_zero()).then_some(lifetime)
    }
}

fn digest(token: &str) -> TokenDigest {
    Sha256::digest(token.as_bytes()).into()
}

#[async_trait]
impl IdentityResolver for CachedResolver {
    async fn resolve(&self, token: &str) -> Result<SubjectId, AuthError> {
        let key = digest(token);
        if let Some(subject) = self.lookup(&key).await {
            return Ok(subject);
        }

        // Lock is not held across the inner call; concurrent misses for the
        // same token each resolve independently and the last write wins.
        let subject = self.inner.resolve(token).await?;

        // A token without a readable exp is resolved but not remembered.
        if let Some(lifetime) = self.lifetime(token) {
            self.entries.lock().await.put(
                key,
                Entry {
                    subject,
                    expires_at: Instant::now() + lifetime,
                },
            );
        }
        Ok(subject)
    }
}
