use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::repos::order_repo::OrderRow;

pub const MAX_QUANTITY: i32 = 1000;

#[derive(Debug, Deserialize)]
pub struct CreateOrderRequest {
    pub item: String,
    pub quantity: i32,
}

impl CreateOrderRequest {
    pub fn validate(&self) -> Result<(), &'static str> {
        let item = self.item.trim();
        if item.is_empty() {
            return Err("item is required");
        }
        if item.chars().count() > 200 {
            return Err("item must be <= 200 chars");
        }
        if !(1..=MAX_QUANTITY).contains(&self.quantity) {
            return Err("quantity must be between 1 and 1000");
        }
        Ok(())
    }
}

#[derive(Debug, Serialize)]
pub struct OrderResponse {
    pub id: i64,
    pub customer_id: i64,
    pub item: String,
    pub quantity: i32,
    pub created_at: DateTime<Utc>,
}

impl From<OrderRow> for OrderResponse {
    fn from(row: OrderRow) -> Self {
        Self {
            id: row.id,
            customer_id: row.customer_id,
            item: row.item,
            quantity: row.quantity,
            created_at: row.created_at,
        }
    }
}
