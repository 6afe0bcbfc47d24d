//! Calculation result models for revenue projection.
//!
//! This module contains the [`CalculationResult`] type and its associated
//! structures: the per-addition breakdown, diagnostic warnings, and
//! advisory suggestions.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Severity of a diagnostic warning.
///
/// Presentation layers use this to decide what blocks submission
/// (`Error`) versus what is merely informative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// A hard gate failed; the selection should not be submitted as-is.
    Error,
    /// A soft, population-based gate failed; worth reviewing.
    Warning,
    /// Informational only (e.g. a cap was applied).
    Info,
}

/// The kind of diagnostic warning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningKind {
    /// An eligibility predicate was not satisfied.
    RequirementNotMet,
    /// A selection was demoted by mutual-exclusivity resolution.
    ExclusiveConflict,
    /// A requested occurrence count exceeded the legal cap and was
    /// clamped.
    OverLimit,
}

/// A diagnostic produced during calculation.
///
/// Warnings never abort a calculation; they accompany a still-usable
/// result so callers can explain why a number is what it is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Warning {
    /// The kind of warning.
    #[serde(rename = "type")]
    pub kind: WarningKind,
    /// Code of the addition the warning refers to.
    pub addition_code: String,
    /// Name of the addition the warning refers to.
    pub addition_name: String,
    /// Human-readable description.
    pub message: String,
    /// How serious the warning is.
    pub severity: Severity,
}

/// Priority of an advisory suggestion, highest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuggestionPriority {
    /// Likely eligible and high value.
    High,
    /// Worth considering.
    Medium,
    /// Minor opportunity.
    Low,
}

/// An addition the facility plausibly qualifies for but has not enabled.
///
/// Suggestions are advisory only; they never mutate the selection set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suggestion {
    /// Code of the suggested addition.
    pub addition_code: String,
    /// Name of the suggested addition.
    pub addition_name: String,
    /// Estimated monthly unit value if enabled.
    pub potential_units: i64,
    /// Why the addition looks attainable.
    pub reason: String,
    /// The textual requirement to satisfy.
    pub requirements: String,
    /// Suggestion priority.
    pub priority: SuggestionPriority,
}

/// Why a breakdown line did or did not contribute to the totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BreakdownStatus {
    /// Counted in the totals.
    Active,
    /// Demoted by mutual-exclusivity resolution.
    Excluded,
    /// Counted, but at a clamped occurrence count.
    Limited,
    /// Not counted (disabled, or a hard requirement failed).
    Invalid,
}

/// One line of the calculation breakdown.
///
/// Every selection appears exactly once, active or not, so the caller can
/// render why each line did or did not contribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdditionBreakdown {
    /// Addition code.
    pub code: String,
    /// Addition name.
    pub name: String,
    /// Unit value per day (0 for percentage-based additions).
    pub units_per_day: i64,
    /// Occurrences per month the line was computed with.
    pub days_per_month: u32,
    /// Total units contributed to the monthly total.
    pub total_units: i64,
    /// Whether the line is percentage-based.
    pub is_percentage: bool,
    /// Percentage rate, when percentage-based.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub percentage_rate: Option<Decimal>,
    /// Contribution status.
    pub status: BreakdownStatus,
    /// Human-readable reason for a non-active status.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_reason: Option<String>,
}

/// The complete result of a revenue projection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalculationResult {
    /// Illustrative units per service day (base reward plus every-day
    /// additions).
    pub total_units_per_day: i64,
    /// Total units for the month, percentage additions included.
    pub total_units_per_month: i64,
    /// Estimated monthly revenue in yen at the given unit price.
    pub estimated_monthly_amount: i64,
    /// One line per selection, active or not.
    pub breakdown: Vec<AdditionBreakdown>,
    /// Diagnostics from exclusivity, cap and eligibility checks.
    pub warnings: Vec<Warning>,
    /// Advisory suggestions derived from the staffing composition.
    pub suggestions: Vec<Suggestion>,
}
