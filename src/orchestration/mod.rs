//! Command orchestration: the service layer between the HTTP handlers and
//! the repository. Handlers never mutate the ledger directly.

pub mod ledger;

pub use ledger::{LedgerService, NewOrder, OrderUpdate};
