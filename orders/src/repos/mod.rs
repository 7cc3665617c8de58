pub mod error;
pub mod order_repo;
