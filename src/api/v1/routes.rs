/*
 * Responsibility
 * - v1 URL layout
 * - public: /health, POST /customers (sign-up), /auth (token verification
 *   for dependent services)
 * - protected: /customers/me, wrapped by the auth middleware via route_layer
 */
use axum::{
    Router,
    routing::{get, post},
};

use crate::api::v1::handlers::{
    customers::{create_customer, delete_me, get_me},
    health::health,
};
use crate::state::AppState;

pub fn routes(state: &AppState) -> Router<AppState> {
    let protected = Router::new().route("/customers/me", get(get_me).delete(delete_me));
    let protected = auth::middleware::apply(protected, state.auth.clone());

    Router::new()
        .route("/health", get(health))
        .route("/customers", post(create_customer))
        .route("/auth", get(auth::endpoint::verify_token))
        .merge(protected)
}
