/*
 * Responsibility
 * - shared context attached to the Router (AppState)
 * - cheap to clone (PgPool and the auth handles are Arc inside)
 */
use auth::{Authenticator, TokenCodec};
use axum::extract::FromRef;
use sqlx::PgPool;

#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub codec: TokenCodec,
    pub auth: Authenticator,
}

impl AppState {
    pub fn new(db: PgPool, codec: TokenCodec, auth: Authenticator) -> Self {
        Self { db, codec, auth }
    }
}

// lets auth::endpoint::verify_token run on Router<AppState>
impl FromRef<AppState> for Authenticator {
    fn from_ref(state: &AppState) -> Self {
        state.auth.clone()
    }
}
