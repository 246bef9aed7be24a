//! Order summary engine.
//!
//! Prices a service order's labor and part line items and aggregates them
//! into a labor/parts/discount/fees summary. This is the single shared
//! implementation consumed by the order service; it is pure, deterministic,
//! and framework-agnostic (no HTTP or database types in its signature).
//!
//! Rounding happens to 2 decimal places at every aggregation step (line
//! total, category subtotal, grand total), not once at the end. Callers
//! depending on bit-compatible totals rely on this.

use rust_decimal::prelude::FromPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Rounds a monetary value to 2 decimal places, half away from zero.
pub fn round2(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Coerces an optional float into a monetary Decimal. Absent or non-finite
/// values silently become zero; invalid numeric input never fails pricing.
pub fn normalize(value: Option<f64>) -> Decimal {
    value
        .filter(|v| v.is_finite())
        .and_then(Decimal::from_f64)
        .unwrap_or(Decimal::ZERO)
}

/// A raw labor line as submitted by the client.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LaborInput {
    pub description: String,
    #[serde(default)]
    pub hours: Option<f64>,
    #[serde(default)]
    pub rate: Option<f64>,
}

/// A raw part line as submitted by the client. `inventory_item_id` links the
/// line to a tracked inventory item; lines without it are free-form parts.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PartInput {
    #[serde(default)]
    pub inventory_item_id: Option<Uuid>,
    pub description: String,
    #[serde(default)]
    pub quantity: i32,
    #[serde(default)]
    pub unit_price: Option<f64>,
}

/// A labor line with its computed total.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PricedLabor {
    pub description: String,
    pub hours: Decimal,
    pub rate: Decimal,
    pub line_total: Decimal,
}

/// A part line with its computed total.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PricedPart {
    pub inventory_item_id: Option<Uuid>,
    pub description: String,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub line_total: Decimal,
}

/// Aggregate totals for a service order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct OrderSummary {
    pub labor: Decimal,
    pub parts: Decimal,
    pub discount: Decimal,
    pub additional_fees: Decimal,
    pub total: Decimal,
}

/// Result of pricing an order: the line items augmented with their totals,
/// plus the aggregate summary. Input order is preserved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricedOrder {
    pub labor: Vec<PricedLabor>,
    pub parts: Vec<PricedPart>,
    pub summary: OrderSummary,
}

/// Prices every line item and computes the order summary.
///
/// `total = round2(labor + parts + additional_fees - discount)`. The
/// discount is deliberately not bounded by the other totals; an oversized
/// discount yields a negative total.
pub fn compute_summary(
    labor: &[LaborInput],
    parts: &[PartInput],
    discount: Option<f64>,
    additional_fees: Option<f64>,
) -> PricedOrder {
    let labor: Vec<PricedLabor> = labor
        .iter()
        .map(|entry| {
            let hours = normalize(entry.hours);
            let rate = normalize(entry.rate);
            PricedLabor {
                description: entry.description.clone(),
                hours,
                rate,
                line_total: round2(hours * rate),
            }
        })
        .collect();

    let parts: Vec<PricedPart> = parts
        .iter()
        .map(|entry| {
            let unit_price = normalize(entry.unit_price);
            let quantity = entry.quantity.max(0);
            PricedPart {
                inventory_item_id: entry.inventory_item_id,
                description: entry.description.clone(),
                quantity,
                unit_price,
                line_total: round2(Decimal::from(quantity) * unit_price),
            }
        })
        .collect();

    let labor_subtotal = round2(labor.iter().map(|l| l.line_total).sum());
    let parts_subtotal = round2(parts.iter().map(|p| p.line_total).sum());
    let discount = round2(normalize(discount));
    let additional_fees = round2(normalize(additional_fees));
    let total = round2(labor_subtotal + parts_subtotal + additional_fees - discount);

    PricedOrder {
        labor,
        parts,
        summary: OrderSummary {
            labor: labor_subtotal,
            parts: parts_subtotal,
            discount,
            additional_fees,
            total,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn labor(description: &str, hours: f64, rate: f64) -> LaborInput {
        LaborInput {
            description: description.into(),
            hours: Some(hours),
            rate: Some(rate),
        }
    }

    fn part(description: &str, quantity: i32, unit_price: f64) -> PartInput {
        PartInput {
            inventory_item_id: None,
            description: description.into(),
            quantity,
            unit_price: Some(unit_price),
        }
    }

    #[test]
    fn labor_line_total_is_hours_times_rate() {
        let priced = compute_summary(&[labor("brake job", 2.5, 80.0)], &[], None, None);
        assert_eq!(priced.labor[0].line_total, dec!(200.00));
        assert_eq!(priced.summary.labor, dec!(200.00));
    }

    #[test]
    fn part_line_total_is_quantity_times_unit_price() {
        let priced = compute_summary(&[], &[part("oil filter", 3, 10.0)], None, None);
        assert_eq!(priced.parts[0].line_total, dec!(30.00));
        assert_eq!(priced.summary.parts, dec!(30.00));
    }

    #[test]
    fn worked_example_from_contract() {
        // labor [{hours:2, rate:100}], parts [{quantity:3, unitPrice:10}],
        // discount 5 => labor=200, parts=30, total=225
        let priced = compute_summary(
            &[labor("engine diagnostics", 2.0, 100.0)],
            &[part("spark plug", 3, 10.0)],
            Some(5.0),
            None,
        );
        assert_eq!(priced.summary.labor, dec!(200.00));
        assert_eq!(priced.summary.parts, dec!(30.00));
        assert_eq!(priced.summary.discount, dec!(5.00));
        assert_eq!(priced.summary.total, dec!(225.00));
    }

    #[test]
    fn empty_entries_yield_zero_subtotals() {
        let priced = compute_summary(&[], &[], Some(5.0), Some(12.5));
        assert_eq!(priced.summary.labor, Decimal::ZERO);
        assert_eq!(priced.summary.parts, Decimal::ZERO);
        // total == additional_fees - discount
        assert_eq!(priced.summary.total, dec!(7.50));
    }

    #[test]
    fn oversized_discount_permits_negative_total() {
        let priced = compute_summary(&[labor("wash", 1.0, 10.0)], &[], Some(50.0), None);
        assert_eq!(priced.summary.total, dec!(-40.00));
    }

    #[test]
    fn non_finite_numbers_degrade_to_zero() {
        let priced = compute_summary(
            &[LaborInput {
                description: "mystery".into(),
                hours: Some(f64::NAN),
                rate: Some(f64::INFINITY),
            }],
            &[PartInput {
                inventory_item_id: None,
                description: "mystery part".into(),
                quantity: 2,
                unit_price: Some(f64::NEG_INFINITY),
            }],
            Some(f64::NAN),
            None,
        );
        assert_eq!(priced.labor[0].line_total, Decimal::ZERO);
        assert_eq!(priced.parts[0].line_total, Decimal::ZERO);
        assert_eq!(priced.summary.discount, Decimal::ZERO);
        assert_eq!(priced.summary.total, Decimal::ZERO);
    }

    #[test]
    fn absent_numbers_degrade_to_zero() {
        let priced = compute_summary(
            &[LaborInput {
                description: "estimate pending".into(),
                hours: None,
                rate: None,
            }],
            &[],
            None,
            None,
        );
        assert_eq!(priced.labor[0].line_total, Decimal::ZERO);
        assert_eq!(priced.summary.total, Decimal::ZERO);
    }

    #[test]
    fn line_totals_round_before_aggregation() {
        // 1.333 * 3 = 3.999 -> 4.00 per line; two lines -> 8.00
        let parts = vec![part("hose clamp", 3, 1.333), part("hose clamp", 3, 1.333)];
        let priced = compute_summary(&[], &parts, None, None);
        assert_eq!(priced.parts[0].line_total, dec!(4.00));
        assert_eq!(priced.summary.parts, dec!(8.00));
    }

    #[test]
    fn entry_order_is_preserved() {
        let priced = compute_summary(
            &[labor("first", 1.0, 1.0), labor("second", 1.0, 1.0)],
            &[part("alpha", 1, 1.0), part("beta", 1, 1.0)],
            None,
            None,
        );
        assert_eq!(priced.labor[0].description, "first");
        assert_eq!(priced.labor[1].description, "second");
        assert_eq!(priced.parts[0].description, "alpha");
        assert_eq!(priced.parts[1].description, "beta");
    }

    #[test]
    fn compute_summary_is_idempotent() {
        let labor_entries = vec![labor("alignment", 1.25, 96.4)];
        let part_entries = vec![part("tie rod", 2, 45.99)];
        let first = compute_summary(&labor_entries, &part_entries, Some(10.0), Some(3.5));
        for _ in 0..5 {
            let again = compute_summary(&labor_entries, &part_entries, Some(10.0), Some(3.5));
            assert_eq!(first, again);
        }
    }

    #[test]
    fn negative_quantity_clamps_to_zero() {
        let priced = compute_summary(
            &[],
            &[PartInput {
                inventory_item_id: None,
                description: "returned part".into(),
                quantity: -4,
                unit_price: Some(10.0),
            }],
            None,
            None,
        );
        assert_eq!(priced.parts[0].quantity, 0);
        assert_eq!(priced.parts[0].line_total, Decimal::ZERO);
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        fn money() -> impl Strategy<Value = f64> {
            // Two-decimal amounts within a realistic invoice range.
            (0i64..1_000_000).prop_map(|cents| cents as f64 / 100.0)
        }

        proptest! {
            #[test]
            fn total_matches_summary_identity(
                hours in money(),
                rate in money(),
                quantity in 0i32..500,
                unit_price in money(),
                discount in money(),
                fees in money(),
            ) {
                let priced = compute_summary(
                    &[LaborInput {
                        description: "labor".into(),
                        hours: Some(hours),
                        rate: Some(rate),
                    }],
                    &[PartInput {
                        inventory_item_id: None,
                        description: "part".into(),
                        quantity,
                        unit_price: Some(unit_price),
                    }],
                    Some(discount),
                    Some(fees),
                );
                let s = &priced.summary;
                prop_assert_eq!(
                    s.total,
                    round2(s.labor + s.parts + s.additional_fees - s.discount)
                );
            }

            #[test]
            fn summary_values_have_at_most_two_decimals(
                hours in money(),
                rate in money(),
                discount in money(),
            ) {
                let priced = compute_summary(
                    &[LaborInput {
                        description: "labor".into(),
                        hours: Some(hours),
                        rate: Some(rate),
                    }],
                    &[],
                    Some(discount),
                    None,
                );
                for value in [
                    priced.summary.labor,
                    priced.summary.parts,
                    priced.summary.discount,
                    priced.summary.additional_fees,
                    priced.summary.total,
                ] {
                    prop_assert_eq!(value, round2(value));
                }
            }
        }
    }
}
