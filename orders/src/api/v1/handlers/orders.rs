/*
 * Responsibility
 * - /orders handlers, always behind the auth middleware
 * - the customer id comes from the verified subject, never from the body
 */
use auth::AuthSubject;
use axum::{Json, extract::State, http::StatusCode};

use crate::{
    api::v1::dto::orders::{CreateOrderRequest, OrderResponse},
    error::AppError,
    repos::order_repo,
    state::AppState,
};

pub async fn list_orders(
    State(state): State<AppState>,
    AuthSubject(customer): AuthSubject,
) -> Result<Json<Vec<OrderResponse>>, AppError> {
    let rows = order_repo::list_for_customer(&state.db, customer.as_i64()).await?;
    Ok(Json(rows.into_iter().map(OrderResponse::from).collect()))
}

pub async fn create_order(
    State(state): State<AppState>,
    AuthSubject(customer): AuthSubject,
    Json(req): Json<CreateOrderRequest>,
) -> Result<(StatusCode, Json<OrderResponse>), AppError> {
    req.validate().map_err(AppError::bad_request)?;

    let row = order_repo::create(&state.db, customer.as_i64(), req.item.trim(), req.quantity).await?;
    tracing::info!(order_id = row.id, customer_id = row.customer_id, "order created");

    Ok((StatusCode::CREATED, Json(row.into())))
}
