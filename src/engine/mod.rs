//! Financial ledger engine: pricing, totals, reconciliation, completion,
//! and reporting. Everything here is pure; persistence and locking live in
//! the orchestration layer.

pub mod balance;
pub mod completion;
pub mod pricing;
pub mod reports;
pub mod totals;

pub use pricing::{compute_final_amount, compute_unit_price_from_total, Pricing, PricingInputs};
pub use reports::{
    compute_aggregates, compute_alerts, compute_customer_stats, Aggregates, Alert, AlertKind,
    CustomerStats, LedgerSnapshot, OrderRecords, Severity,
};
