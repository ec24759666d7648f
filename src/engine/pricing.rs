//! Order pricing calculator.
//!
//! Derives an order's authoritative final amount from its pricing inputs.
//! Pure and deterministic: the same inputs always produce the same result,
//! with exact decimal arithmetic throughout. Out-of-range inputs are
//! rejected before any write; nothing is silently clamped.

use crate::domain::Decimal;
use crate::error::AppError;

/// The raw pricing inputs of an order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PricingInputs {
    pub quantity: i64,
    pub unit_price: Decimal,
    pub discount_percent: Decimal,
    pub discount_cash: Decimal,
    pub shipping_fee: Decimal,
}

/// Materialized pricing derived from [`PricingInputs`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pricing {
    pub gross_amount: Decimal,
    pub discount_amount: Decimal,
    pub final_amount: Decimal,
}

/// Compute the authoritative final amount for an order.
///
/// `final = gross - gross * percent / 100 - discount_cash + shipping_fee`
/// where `gross = quantity * unit_price`.
///
/// # Errors
/// Returns a validation error naming the offending field when an input is
/// out of range, or when the computed final amount would be negative.
pub fn compute_final_amount(inputs: &PricingInputs) -> Result<Pricing, AppError> {
    validate_inputs(inputs)?;

    let gross_amount = inputs.unit_price * Decimal::from_i64(inputs.quantity);
    let discount_amount = compute_discount_amount(gross_amount, inputs.discount_percent);
    let final_amount = gross_amount - discount_amount - inputs.discount_cash + inputs.shipping_fee;

    if final_amount.is_negative() {
        return Err(AppError::validation(
            "final_amount",
            format!(
                "discounts exceed order value (computed final amount {})",
                final_amount
            ),
        ));
    }

    Ok(Pricing {
        gross_amount,
        discount_amount,
        final_amount,
    })
}

/// Percentage discount on a gross amount: `gross * percent / 100`.
pub fn compute_discount_amount(gross: Decimal, percent: Decimal) -> Decimal {
    gross * percent / Decimal::hundred()
}

/// Derive the unit price from a caller-entered total, for the
/// "enter total, derive unit price" input mode.
///
/// # Errors
/// Rejects non-positive quantities and negative totals.
pub fn compute_unit_price_from_total(total: Decimal, quantity: i64) -> Result<Decimal, AppError> {
    if quantity <= 0 {
        return Err(AppError::validation(
            "quantity",
            "must be greater than zero",
        ));
    }
    if total.is_negative() {
        return Err(AppError::validation("total", "must not be negative"));
    }
    Ok(total / Decimal::from_i64(quantity))
}

fn validate_inputs(inputs: &PricingInputs) -> Result<(), AppError> {
    if inputs.quantity <= 0 {
        return Err(AppError::validation(
            "quantity",
            "must be greater than zero",
        ));
    }
    if inputs.unit_price.is_negative() {
        return Err(AppError::validation("unit_price", "must not be negative"));
    }
    if inputs.discount_percent.is_negative() || inputs.discount_percent > Decimal::hundred() {
        return Err(AppError::validation(
            "discount_percent",
            "must be between 0 and 100",
        ));
    }
    if inputs.discount_cash.is_negative() {
        return Err(AppError::validation(
            "discount_cash",
            "must not be negative",
        ));
    }
    if inputs.shipping_fee.is_negative() {
        return Err(AppError::validation(
            "shipping_fee",
            "must not be negative",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inputs(
        quantity: i64,
        unit_price: i64,
        discount_percent: i64,
        discount_cash: i64,
        shipping_fee: i64,
    ) -> PricingInputs {
        PricingInputs {
            quantity,
            unit_price: Decimal::from_i64(unit_price),
            discount_percent: Decimal::from_i64(discount_percent),
            discount_cash: Decimal::from_i64(discount_cash),
            shipping_fee: Decimal::from_i64(shipping_fee),
        }
    }

    #[test]
    fn final_amount_reference_case() {
        // 30 * 50000 = 1,500,000 gross; 10% discount = 150,000; +20,000 ship.
        let pricing = compute_final_amount(&inputs(30, 50_000, 10, 0, 20_000)).unwrap();
        assert_eq!(pricing.gross_amount, Decimal::from_i64(1_500_000));
        assert_eq!(pricing.discount_amount, Decimal::from_i64(150_000));
        assert_eq!(pricing.final_amount, Decimal::from_i64(1_370_000));
    }

    #[test]
    fn deterministic_across_calls() {
        let i = inputs(7, 12_345, 3, 500, 1_000);
        let a = compute_final_amount(&i).unwrap();
        let b = compute_final_amount(&i).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn cash_discount_subtracts_after_percentage() {
        let pricing = compute_final_amount(&inputs(10, 1_000, 50, 2_000, 0)).unwrap();
        // gross 10,000; percent discount 5,000; cash 2,000.
        assert_eq!(pricing.final_amount, Decimal::from_i64(3_000));
    }

    #[test]
    fn rejects_zero_quantity() {
        let err = compute_final_amount(&inputs(0, 50_000, 0, 0, 0)).unwrap_err();
        match err {
            AppError::Validation { field, .. } => assert_eq!(field, "quantity"),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn rejects_negative_unit_price() {
        let err = compute_final_amount(&inputs(1, -1, 0, 0, 0)).unwrap_err();
        match err {
            AppError::Validation { field, .. } => assert_eq!(field, "unit_price"),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn rejects_discount_percent_over_100() {
        let err = compute_final_amount(&inputs(1, 1_000, 101, 0, 0)).unwrap_err();
        match err {
            AppError::Validation { field, .. } => assert_eq!(field, "discount_percent"),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn rejects_negative_final_amount_instead_of_clamping() {
        // gross 1,000; cash discount 5,000 pushes the total negative.
        let err = compute_final_amount(&inputs(1, 1_000, 0, 5_000, 0)).unwrap_err();
        match err {
            AppError::Validation { field, .. } => assert_eq!(field, "final_amount"),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn shipping_can_offset_cash_discount() {
        // Final lands on exactly zero: allowed.
        let pricing = compute_final_amount(&inputs(1, 1_000, 0, 2_000, 1_000)).unwrap();
        assert!(pricing.final_amount.is_zero());
    }

    #[test]
    fn unit_price_from_total() {
        let price = compute_unit_price_from_total(Decimal::from_i64(1_500_000), 30).unwrap();
        assert_eq!(price, Decimal::from_i64(50_000));
    }

    #[test]
    fn unit_price_from_total_rejects_zero_quantity() {
        assert!(compute_unit_price_from_total(Decimal::from_i64(100), 0).is_err());
    }

    #[test]
    fn discount_amount_keeps_fractions_exact() {
        let d = compute_discount_amount(Decimal::from_i64(999), Decimal::from_i64(10));
        assert_eq!(d.to_canonical_string(), "99.9");
    }
}
