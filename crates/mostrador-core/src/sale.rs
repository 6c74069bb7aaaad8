//! # Sale Planning
//!
//! The pure half of sale creation: everything that can be decided without
//! touching storage.
//!
//! ```text
//! CreateSaleRequest
//!      │
//!      ├──► consolidate_lines() ──► lock plan (distinct products, ascending id)
//!      │
//!      ├──► resolve_tax_rate()  ──► Option<TaxRate>   (request over tenant settings)
//!      │
//!      └──► compute_totals()    ──► SaleTotals { subtotal, tax, discount, total }
//! ```
//!
//! Lock order matters: two multi-line sales touching the same products must
//! take their row locks in the same order or they can wait on each other
//! forever. Sorting by product id gives every sale the same order.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::ValidationError;
use crate::money::Money;
use crate::types::{SaleLine, TaxRate, TenantSettings};
use crate::validation::ValidationResult;

// =============================================================================
// Lock Plan
// =============================================================================

/// Total quantity requested for one product across all lines of a sale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductDemand {
    pub product_id: String,
    pub quantity: i64,
}

/// Merges lines for the same product and sorts by product id.
///
/// The result is the order in which stock rows are locked and checked.
///
/// ## Example
/// ```rust
/// use mostrador_core::sale::consolidate_lines;
/// use mostrador_core::types::SaleLine;
///
/// let lines = vec![
///     SaleLine { product_id: "b".into(), quantity: 1 },
///     SaleLine { product_id: "a".into(), quantity: 2 },
///     SaleLine { product_id: "b".into(), quantity: 3 },
/// ];
/// let plan = consolidate_lines(&lines);
/// assert_eq!(plan[0].product_id, "a");
/// assert_eq!(plan[1].quantity, 4);
/// ```
pub fn consolidate_lines(lines: &[SaleLine]) -> Vec<ProductDemand> {
    let mut demand: BTreeMap<&str, i64> = BTreeMap::new();
    for line in lines {
        *demand.entry(line.product_id.as_str()).or_insert(0) += line.quantity;
    }

    demand
        .into_iter()
        .map(|(product_id, quantity)| ProductDemand {
            product_id: product_id.to_string(),
            quantity,
        })
        .collect()
}

// =============================================================================
// Totals
// =============================================================================

/// Computed amounts of a sale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SaleTotals {
    pub subtotal: Money,
    pub tax: Money,
    pub discount: Money,
    pub total: Money,
}

/// Picks the tax rate for a sale.
///
/// The request's `enable_tax` overrides the tenant setting; when tax
/// applies, the request's own rate wins over the tenant rate.
pub fn resolve_tax_rate(
    enable_tax: Option<bool>,
    requested: Option<u32>,
    settings: &TenantSettings,
) -> Option<TaxRate> {
    if !enable_tax.unwrap_or(settings.enable_tax) {
        return None;
    }
    Some(requested.map_or_else(|| settings.tax_rate(), TaxRate::from_bps))
}

/// Computes subtotal, tax and total from `(unit_price, quantity)` pairs.
///
/// ```text
/// subtotal = Σ unit_price × quantity
/// tax      = round(subtotal × rate)      (0 without a rate)
/// total    = subtotal + tax − discount
/// ```
///
/// The discount is applied after tax. A discount larger than
/// `subtotal + tax` is rejected rather than clamped, so a stored total is
/// never negative and never silently differs from what was asked.
/// Amounts that do not fit in i64 cents are rejected as out of range.
pub fn compute_totals(
    lines: &[(Money, i64)],
    tax_rate: Option<TaxRate>,
    discount: Money,
) -> ValidationResult<SaleTotals> {
    if discount.is_negative() {
        return Err(ValidationError::MustNotBeNegative {
            field: "discount_cents".to_string(),
        });
    }

    let mut subtotal = Money::zero();
    for (unit_price, qty) in lines {
        subtotal = unit_price
            .checked_mul_quantity(*qty)
            .and_then(|line| subtotal.checked_add(line))
            .ok_or_else(|| amount_out_of_range("subtotal_cents"))?;
    }
    let tax = tax_rate
        .map(|rate| subtotal.calculate_tax(rate))
        .unwrap_or_default();
    let gross = subtotal
        .checked_add(tax)
        .ok_or_else(|| amount_out_of_range("total_cents"))?;

    if discount > gross {
        return Err(ValidationError::DiscountTooLarge {
            discount: discount.cents(),
            max: gross.cents(),
        });
    }

    Ok(SaleTotals {
        subtotal,
        tax,
        discount,
        total: gross
            .checked_sub(discount)
            .ok_or_else(|| amount_out_of_range("total_cents"))?,
    })
}

/// Error for a money amount outside `0..=i64::MAX` cents.
pub fn amount_out_of_range(field: &str) -> ValidationError {
    ValidationError::OutOfRange {
        field: field.to_string(),
        min: 0,
        max: i64::MAX,
    }
}

// =============================================================================
// Sale Number
// =============================================================================

/// Formats a human-facing sale number: `SALE-YYYYMMDDHHMMSS-XXXXXX`.
///
/// The suffix is the first six hex digits of `entropy`, uppercased.
pub fn format_sale_number(now: DateTime<Utc>, entropy: &Uuid) -> String {
    let hex = entropy.simple().to_string();
    format!(
        "SALE-{}-{}",
        now.format("%Y%m%d%H%M%S"),
        hex[..6].to_uppercase()
    )
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn line(product_id: &str, quantity: i64) -> SaleLine {
        SaleLine {
            product_id: product_id.to_string(),
            quantity,
        }
    }

    #[test]
    fn test_consolidate_merges_and_sorts() {
        let plan = consolidate_lines(&[line("p-3", 1), line("p-1", 2), line("p-3", 4)]);
        assert_eq!(
            plan,
            vec![
                ProductDemand {
                    product_id: "p-1".to_string(),
                    quantity: 2
                },
                ProductDemand {
                    product_id: "p-3".to_string(),
                    quantity: 5
                },
            ]
        );
    }

    #[test]
    fn test_totals_without_tax() {
        // $20.00 × 2, no tax, no discount
        let totals = compute_totals(&[(Money::from_cents(2000), 2)], None, Money::zero()).unwrap();
        assert_eq!(totals.subtotal.cents(), 4000);
        assert_eq!(totals.tax.cents(), 0);
        assert_eq!(totals.total.cents(), 4000);
    }

    #[test]
    fn test_totals_discount_after_tax() {
        let totals = compute_totals(
            &[(Money::from_cents(1000), 1), (Money::from_cents(250), 4)],
            Some(TaxRate::from_bps(1600)),
            Money::from_cents(320),
        )
        .unwrap();
        assert_eq!(totals.subtotal.cents(), 2000);
        assert_eq!(totals.tax.cents(), 320);
        assert_eq!(totals.total.cents(), 2000);
    }

    #[test]
    fn test_discount_equal_to_gross_is_allowed() {
        let totals = compute_totals(
            &[(Money::from_cents(500), 1)],
            None,
            Money::from_cents(500),
        )
        .unwrap();
        assert!(totals.total.is_zero());
    }

    #[test]
    fn test_discount_larger_than_gross_is_rejected() {
        let err = compute_totals(
            &[(Money::from_cents(500), 1)],
            Some(TaxRate::from_bps(1000)),
            Money::from_cents(551),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            ValidationError::DiscountTooLarge {
                discount: 551,
                max: 550
            }
        ));
    }

    #[test]
    fn test_totals_overflow_is_out_of_range() {
        let err = compute_totals(&[(Money::from_cents(i64::MAX / 2), 3)], None, Money::zero())
            .unwrap_err();
        assert!(matches!(err, ValidationError::OutOfRange { ref field, .. } if field == "subtotal_cents"));

        let err = compute_totals(
            &[(Money::from_cents(i64::MAX / 2), 1), (Money::from_cents(i64::MAX / 2), 1), (Money::from_cents(2), 1)],
            None,
            Money::zero(),
        )
        .unwrap_err();
        assert!(matches!(err, ValidationError::OutOfRange { .. }));

        let err = compute_totals(
            &[(Money::from_cents(i64::MAX - 10), 1)],
            Some(TaxRate::from_bps(1600)),
            Money::zero(),
        )
        .unwrap_err();
        assert!(matches!(err, ValidationError::OutOfRange { ref field, .. } if field == "total_cents"));
    }

    #[test]
    fn test_resolve_tax_rate() {
        let mut settings = TenantSettings::unsaved("tenant-a", TaxRate::from_bps(800));
        assert_eq!(resolve_tax_rate(None, Some(1600), &settings), None);
        assert_eq!(resolve_tax_rate(Some(false), Some(1600), &settings), None);
        assert_eq!(
            resolve_tax_rate(Some(true), Some(1600), &settings),
            Some(TaxRate::from_bps(1600))
        );
        assert_eq!(
            resolve_tax_rate(Some(true), None, &settings),
            Some(TaxRate::from_bps(800))
        );

        settings.enable_tax = true;
        assert_eq!(
            resolve_tax_rate(None, None, &settings),
            Some(TaxRate::from_bps(800))
        );
        assert_eq!(resolve_tax_rate(Some(false), None, &settings), None);
    }

    #[test]
    fn test_format_sale_number() {
        let now = Utc.with_ymd_and_hms(2026, 3, 9, 14, 5, 7).unwrap();
        let entropy = Uuid::parse_str("a1b2c3d4-0000-4000-8000-000000000000").unwrap();
        assert_eq!(
            format_sale_number(now, &entropy),
            "SALE-20260309140507-A1B2C3"
        );
    }
}
