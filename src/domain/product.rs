//! Product template reference data.

use crate::domain::{Decimal, ProductId};
use serde::{Deserialize, Serialize};

/// A reusable product template used to prefill new orders.
///
/// Templates are reference data only; orders copy the name/unit/price at
/// creation time, so editing or deactivating a template never touches
/// historical orders. Deactivation replaces hard deletion to avoid
/// orphaning orders that referenced the template by name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductTemplate {
    pub id: ProductId,
    pub name: String,
    pub default_quantity: i64,
    pub unit: String,
    pub default_unit_price: Decimal,
    pub is_active: bool,
}

impl ProductTemplate {
    pub fn new(name: String, default_quantity: i64, unit: String, default_unit_price: Decimal) -> Self {
        ProductTemplate {
            id: ProductId::generate(),
            name,
            default_quantity,
            unit,
            default_unit_price,
            is_active: true,
        }
    }
}
