/*
 * Responsibility
 * - SQLx operations on the customers table
 * - takes a PgPool; errors come back as RepoError
 */
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};

use crate::repos::error::RepoError;

#[derive(Debug, FromRow)]
pub struct CustomerRow {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

pub async fn create(db: &PgPool, name: &str, email: &str) -> Result<CustomerRow, RepoError> {
    let row = sqlx::query_as::<_, CustomerRow>(
        r#"
        INSERT INTO customers (name, email)
        VALUES ($1, $2)
        RETURNING id, name, email, created_at
        "#,
    )
    .bind(name)
    .bind(email)
    .fetch_one(db)
    .await
    .map_err(RepoError::from_sqlx)?;

    Ok(row)
}

pub async fn get(db: &PgPool, id: i64) -> Result<CustomerRow, RepoError> {
    let row = sqlx::query_as::<_, CustomerRow>(
        r#"
        SELECT id, name, email, created_at
        FROM customers
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_one(db)
    .await
    .map_err(RepoError::from_sqlx)?;

    Ok(row)
}

pub async fn exists(db: &PgPool, id: i64) -> Result<bool, RepoError> {
    let found: bool = sqlx::query_scalar(
        r#"
        SELECT EXISTS (SELECT 1 FROM customers WHERE id = $1)
        "#,
    )
    .bind(id)
    .fetch_one(db)
    .await?;

    Ok(found)
}

pub async fn delete(db: &PgPool, id: i64) -> Result<bool, RepoError> {
    let result = sqlx::query(
        r#"
        DELETE FROM customers
        WHERE id = $1
        "#,
    )
    .bind(id)
    .execute(db)
    .await?;

    Ok(result.rows_affected() > 0)
}
