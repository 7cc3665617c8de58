/*
 * Responsibility
 * - public surface of the transport middleware
 * - authentication lives in the auth crate (auth::middleware::apply)
 */
pub mod http;
