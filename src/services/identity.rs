//! Customer table as the identity store behind local verification.
use async_trait::async_trait;
use auth::{StoreError, SubjectExistenceChecker, SubjectId};
use sqlx::PgPool;

use crate::repos::{customer_repo, error::RepoError};

/// Existence check against `customers`. A missing row is `Ok(false)`; any
/// other database failure surfaces as a [`StoreError`].
#[derive(Clone)]
pub struct PgSubjectChecker {
    db: PgPool,
}

impl PgSubjectChecker {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl SubjectExistenceChecker for PgSubjectChecker {
    async fn exists(&self, id: SubjectId) -> Result<bool, StoreError> {
        match customer_repo::exists(&self.db, id.as_i64()).await {
            Ok(found) => Ok(found),
            Err(RepoError::NotFound) => Ok(false),
            Err(e) => Err(StoreError::new(e)),
        }
    }
}
