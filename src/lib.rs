pub mod api;
pub mod config;
pub mod db;
pub mod domain;
pub mod engine;
pub mod error;
pub mod orchestration;

pub use config::{AlertThresholds, Config};
pub use db::{init_db, Repository};
pub use domain::{
    Customer, CustomerId, Decimal, Delivery, DeliveryId, EntryId, EntryKind, LedgerEntry, Order,
    OrderId, OrderStatus, ProductId, ProductTemplate,
};
pub use error::AppError;
pub use orchestration::LedgerService;
