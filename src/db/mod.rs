//! SQLite persistence for the debt ledger.
//!
//! `migrations` owns pool setup, pragmas, and the idempotent schema for
//! the customers/products/orders/deliveries/payments tables; `repo` is the
//! typed access layer over them, including transactional balance
//! reconciliation.

pub mod migrations;
pub mod repo;

pub use migrations::init_db;
pub use repo::Repository;
