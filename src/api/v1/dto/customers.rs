/*
 * Responsibility
 * - customer request/response DTOs
 * - shape checks via validate()
 */
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::repos::customer_repo::CustomerRow;

#[derive(Debug, Deserialize)]
pub struct CreateCustomerRequest {
    pub name: String,
    pub email: String,
}

impl CreateCustomerRequest {
    pub fn validate(&self) -> Result<(), &'static str> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err("name is required");
        }
        if name.chars().count() > 100 {
            return Err("name must be <= 100 chars");
        }

        let email = self.email.trim();
        if email.is_empty() {
            return Err("email is required");
        }
        if email.len() > 254 {
            return Err("email must be <= 254 chars");
        }
        match email.split_once('@') {
            Some((local, domain)) if !local.is_empty() && domain.contains('.') => {}
            _ => return Err("email is malformed"),
        }

        Ok(())
    }
}

#[derive(Debug, Serialize)]
pub struct CustomerResponse {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

impl From<CustomerRow> for CustomerResponse {
    fn from(row: CustomerRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            email: row.email,
            created_at: row.created_at,
        }
    }
}

/// Returned on sign-up: the new customer plus a token for it.
#[derive(Debug, Serialize)]
pub struct CreatedCustomerResponse {
    pub customer: CustomerResponse,
    pub token: String,
    pub expires_in: u64,
}
