//! Domain types for the debt ledger.
//!
//! This module provides:
//! - Lossless money handling via the Decimal wrapper
//! - Id newtypes for every persisted record
//! - Customer, ProductTemplate, Order, Delivery, and LedgerEntry records
//! - The closed EntryKind variant set with legacy mapping at the boundary

pub mod customer;
pub mod decimal;
pub mod delivery;
pub mod ledger_entry;
pub mod order;
pub mod primitives;
pub mod product;

pub use customer::Customer;
pub use decimal::Decimal;
pub use delivery::Delivery;
pub use ledger_entry::{EntryKind, LedgerEntry};
pub use order::{Order, OrderStatus};
pub use primitives::{CustomerId, DeliveryId, EntryId, OrderId, ProductId};
pub use product::ProductTemplate;
