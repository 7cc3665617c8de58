/*
 * Responsibility
 * - /customers handlers
 * - sign-up is public; /customers/me runs behind the auth middleware and reads
 *   the verified subject through the AuthSubject extractor
 */
use auth::{AuthSubject, SubjectId};
use axum::{Json, extract::State, http::StatusCode};

use crate::{
    api::v1::dto::customers::{CreateCustomerRequest, CreatedCustomerResponse, CustomerResponse},
    error::AppError,
    repos::customer_repo,
    state::AppState,
};

pub async fn create_customer(
    State(state): State<AppState>,
    Json(req): Json<CreateCustomerRequest>,
) -> Result<(StatusCode, Json<CreatedCustomerResponse>), AppError> {
    req.validate().map_err(AppError::bad_request)?;

    let row = customer_repo::create(&state.db, req.name.trim(), req.email.trim()).await?;

    let subject = SubjectId::new(row.id).ok_or_else(|| {
        tracing::error!(id = row.id, "database returned a negative customer id");
        AppError::Internal
    })?;
    let token = state.codec.issue(subject)?;
    tracing::info!(customer_id = row.id, "customer created");

    Ok((
        StatusCode::CREATED,
        Json(CreatedCustomerResponse {
            customer: row.into(),
            token,
            expires_in: state.codec.ttl_seconds(),
        }),
    ))
}

pub async fn get_me(
    State(state): State<AppState>,
    AuthSubject(id): AuthSubject,
) -> Result<Json<CustomerResponse>, AppError> {
    let row = customer_repo::get(&state.db, id.as_i64()).await?;
    Ok(Json(row.into()))
}

pub async fn delete_me(
    State(state): State<AppState>,
    AuthSubject(id): AuthSubject,
) -> Result<StatusCode, AppError> {
    if customer_repo::delete(&state.db, id.as_i64()).await? {
        tracing::info!(customer_id = id.as_i64(), "customer deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::not_found("customer"))
    }
}
