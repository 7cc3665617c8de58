/*
 * Responsibility
 * - shared context attached to the Router (AppState)
 * - `auth` delegates every token to the customers service
 */
use auth::Authenticator;
use sqlx::PgPool;

#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub auth: Authenticator,
}

impl AppState {
    pub fn new(db: PgPool, auth: Authenticator) -> Self {
        Self { db, auth }
    }
}
