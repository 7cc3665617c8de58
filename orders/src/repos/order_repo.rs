/*
 * Responsibility
 * - SQLx operations on the orders table
 * - every query is scoped to the owning customer id; this service never reads
 *   the customers table
 */
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};

use crate::repos::error::RepoError;

#[derive(Debug, FromRow)]
pub struct OrderRow {
    pub id: i64,
    pub customer_id: i64,
    pub item: String,
    pub quantity: i32,
    pub created_at: DateTime<Utc>,
}

pub async fn list_for_customer(db: &PgPool, customer_id: i64) -> Result<Vec<OrderRow>, RepoError> {
    let rows = sqlx::query_as::<_, OrderRow>(
        r#"
        SELECT id, customer_id, item, quantity, created_at
        FROM orders
        WHERE customer_id = $1
        ORDER BY created_at DESC
        "#,
    )
    .bind(customer_id)
    .fetch_all(db)
    .await?;

    Ok(rows)
}

pub async fn create(
    db: &PgPool,
    customer_id: i64,
    item: &str,
    quantity: i32,
) -> Result<OrderRow, RepoError> {
    let row = sqlx::query_as::<_, OrderRow>(
        r#"
        INSERT INTO orders (customer_id, item, quantity)
        VALUES ($1, $2, $3)
        RETURNING id, customer_id, item, quantity, created_at
        "#,
    )
    .bind(customer_id)
    .bind(item)
    .bind(quantity)
    .fetch_one(db)
    .await?;

    Ok(row)
}
