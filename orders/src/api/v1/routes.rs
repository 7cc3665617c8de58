/*
 * Responsibility
 * - v1 URL layout
 * - /health public; /orders wrapped by the auth middleware (remote strategy)
 */
use axum::{Router, routing::get};

use crate::api::v1::handlers::{
    health::health,
    orders::{create_order, list_orders},
};
use crate::state::AppState;

pub fn routes(state: &AppState) -> Router<AppState> {
    let protected = Router::new().route("/orders", get(list_orders).post(create_order));
    let protected = auth::middleware::apply(protected, state.auth.clone());

    Router::new().route("/health", get(health)).merge(protected)
}
