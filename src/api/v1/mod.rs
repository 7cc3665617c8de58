/*
 * Responsibility
 * - v1 public surface (re-exports routes())
 */
pub mod dto;
pub mod handlers;
mod routes;

pub use routes::routes;
