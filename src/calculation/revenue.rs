//! Monthly revenue projection.
//!
//! Combines the base service reward, fixed-unit additions and the single
//! percentage-based addition into daily and monthly unit totals, with a
//! per-selection breakdown explaining every line. Used standalone for
//! what-if projections; monthly billing re-derives per-day additions from
//! usage records instead (see `billing::aggregator`).

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

use crate::config::RuleCatalog;
use crate::models::{
    AdditionBreakdown, AdditionSelection, BreakdownStatus, CalculationResult, Child, Severity,
    Staff, Warning, YearMonth,
};

use super::eligibility::check_requirements;
use super::exclusivity::resolve_exclusive_groups;
use super::limits::apply_monthly_limits;
use super::suggestions::generate_suggestions;

/// Projects daily and monthly units for a selection of additions.
///
/// The pipeline is: exclusivity resolution, monthly cap clamping,
/// eligibility checking, suggestion generation, then totalling. The
/// function is a pure computation with no I/O and is deterministic for
/// identical inputs, including selection order (the breakdown follows
/// selection order).
///
/// Totalling rules:
/// - The monthly total starts from `base_reward_units * business_days`.
/// - Each contributing fixed-unit selection adds `units * occurrences`,
///   where occurrences is the (possibly clamped) custom count or else
///   every business day. Selections demoted by exclusivity or failing a
///   hard requirement contribute nothing.
/// - The illustrative daily total only includes additions applied on
///   every business day.
/// - The single active percentage addition contributes
///   `floor(subtotal * rate / 100)` over the running monthly subtotal,
///   to the monthly total only.
pub fn calculate_revenue(
    selections: &[AdditionSelection],
    catalog: &RuleCatalog,
    staff: &[Staff],
    children: &[Child],
    base_reward_units: i64,
    business_days: u32,
    unit_price: Decimal,
) -> CalculationResult {
    let exclusivity = resolve_exclusive_groups(selections, catalog);
    let limit = apply_monthly_limits(&exclusivity.resolved, catalog, business_days);
    let requirement_warnings = check_requirements(&limit.limited, catalog, staff, children);
    let suggestions = generate_suggestions(staff, &limit.limited, catalog);

    let mut breakdown: Vec<AdditionBreakdown> = Vec::new();
    let mut total_units_per_day = base_reward_units;
    let mut total_units_per_month = base_reward_units * i64::from(business_days);

    // Subtotal the percentage addition is computed over.
    let mut percentage_base = total_units_per_month;

    for selection in &limit.limited {
        let Some(addition) = catalog.find_addition(&selection.code) else {
            continue;
        };

        let was_excluded = exclusivity
            .conflicts
            .iter()
            .any(|c| c.addition_code == selection.code);
        let has_error = requirement_warnings
            .iter()
            .any(|w| w.addition_code == selection.code && w.severity == Severity::Error);

        let mut status = BreakdownStatus::Active;
        let mut status_reason: Option<String> = None;

        if was_excluded {
            status = BreakdownStatus::Excluded;
            status_reason = Some("demoted by exclusivity resolution".to_string());
        } else if !selection.enabled {
            status = BreakdownStatus::Invalid;
            status_reason = Some("not enabled".to_string());
        } else if has_error {
            status = BreakdownStatus::Invalid;
            status_reason = Some("requirements not met".to_string());
        } else if selection
            .custom_days_per_month
            .is_some_and(|days| days < business_days)
        {
            status = BreakdownStatus::Limited;
            status_reason = Some(format!(
                "limited to {} times per month",
                selection.custom_days_per_month.unwrap_or(0)
            ));
        }

        // Percentage additions are totalled after the fixed-unit pass.
        if addition.is_percentage {
            breakdown.push(AdditionBreakdown {
                code: addition.code.clone(),
                name: addition.name.clone(),
                units_per_day: 0,
                days_per_month: business_days,
                total_units: 0,
                is_percentage: true,
                percentage_rate: addition.percentage_rate,
                status,
                status_reason,
            });
            continue;
        }

        let units_per_day = addition.units.unwrap_or(0);
        let days_per_month = selection.custom_days_per_month.unwrap_or(business_days);
        let contributes =
            matches!(status, BreakdownStatus::Active | BreakdownStatus::Limited);
        let total_units = if contributes {
            units_per_day * i64::from(days_per_month)
        } else {
            0
        };

        if contributes {
            total_units_per_month += total_units;
            percentage_base += total_units;
            if days_per_month == business_days {
                total_units_per_day += units_per_day;
            }
        }

        breakdown.push(AdditionBreakdown {
            code: addition.code.clone(),
            name: addition.name.clone(),
            units_per_day,
            days_per_month,
            total_units,
            is_percentage: false,
            percentage_rate: None,
            status,
            status_reason,
        });
    }

    // At most one percentage addition is active: each lives inside its own
    // exclusivity group, so the resolver already guarantees it.
    if let Some(line) = breakdown
        .iter_mut()
        .find(|b| b.is_percentage && b.status == BreakdownStatus::Active)
    {
        let rate = line.percentage_rate.unwrap_or(Decimal::ZERO);
        let contribution = (Decimal::from(percentage_base) * rate / Decimal::from(100))
            .floor()
            .to_i64()
            .unwrap_or_default();
        line.total_units = contribution;
        total_units_per_month += contribution;
    }

    let estimated_monthly_amount = (Decimal::from(total_units_per_month) * unit_price)
        .floor()
        .to_i64()
        .unwrap_or_default();

    let mut warnings: Vec<Warning> = exclusivity.conflicts;
    warnings.extend(limit.warnings);
    warnings.extend(requirement_warnings);

    CalculationResult {
        total_units_per_day,
        total_units_per_month,
        estimated_monthly_amount,
        breakdown,
        warnings,
        suggestions,
    }
}

/// Projects revenue with the addition parameters effective in the target
/// month.
///
/// Snapshots the catalog at the first day of the month, then runs
/// [`calculate_revenue`] over the snapshot.
#[allow(clippy::too_many_arguments)]
pub fn calculate_revenue_with_versions(
    selections: &[AdditionSelection],
    catalog: &RuleCatalog,
    staff: &[Staff],
    children: &[Child],
    base_reward_units: i64,
    business_days: u32,
    unit_price: Decimal,
    target: YearMonth,
) -> CalculationResult {
    let snapshot = catalog.snapshot_at(target.first_day());
    calculate_revenue(
        selections,
        &snapshot,
        staff,
        children,
        base_reward_units,
        business_days,
        unit_price,
    )
}
