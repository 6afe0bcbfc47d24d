//! Addition catalog models.
//!
//! This module defines the [`Addition`] master record, its time-sliced
//! [`AdditionVersion`] overrides, the [`LawRevision`] change events that
//! group them, and the per-facility enablement record
//! [`FacilityAdditionSetting`].

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::ServiceType;

/// How an addition gets enabled for a calculation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdditionKind {
    /// Enabled once through a facility-level application/approval workflow;
    /// never toggled manually per calculation.
    FacilityPreset,
    /// Toggled by the operator per calculation run.
    Monthly,
    /// Derived automatically from daily usage records.
    Daily,
}

/// A machine-checkable eligibility predicate attached to an addition.
///
/// Staffing gates (`ExperiencedStaff`, `QualifiedStaff`) are hard
/// requirements: a failure blocks submission. Population gates
/// (`BehaviorScoreAtLeast`, `ProtectedChild`) only warn, since enrolment
/// can change within the billing month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RequirementRule {
    /// Requires experienced staff and a minimum aggregate full-time
    /// equivalent.
    ExperiencedStaff {
        /// Minimum years of experience at least one staff member must have.
        min_years: u32,
        /// Minimum aggregate FTE across active staff.
        min_fte: Decimal,
    },
    /// Requires at least one active staff member holding one of the listed
    /// qualifications.
    QualifiedStaff {
        /// Accepted qualification codes (including localized names).
        qualifications: Vec<String>,
    },
    /// Requires at least one child with a behavior disorder score at or
    /// above the threshold.
    BehaviorScoreAtLeast {
        /// Minimum qualifying score.
        threshold: i32,
    },
    /// Requires at least one enrolled child flagged as protected/at-risk.
    ProtectedChild,
}

fn default_max_times_per_day() -> u32 {
    1
}

fn default_kind() -> AdditionKind {
    AdditionKind::Monthly
}

/// A catalogued surcharge/benefit line item.
///
/// The numeric and requirement fields here are the base values; an
/// [`AdditionVersion`] effective on the target date overrides them (see
/// `calculation::versioning`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Addition {
    /// Stable unique identifier (e.g. `"specialist_support"`).
    pub code: String,
    /// Full display name.
    pub name: String,
    /// Abbreviated name for dense screens.
    pub short_name: String,
    /// Category grouping code (e.g. `"staffing"`, `"family"`).
    pub category_code: String,
    /// Unit value per occurrence; `None` when percentage-based.
    #[serde(default)]
    pub units: Option<i64>,
    /// Whether the addition is a percentage over the running subtotal
    /// rather than a fixed unit value.
    #[serde(default)]
    pub is_percentage: bool,
    /// Percentage rate (e.g. `14.0`); only set when `is_percentage`.
    #[serde(default)]
    pub percentage_rate: Option<Decimal>,
    /// Legal cap on occurrences per month, if any.
    #[serde(default)]
    pub max_times_per_month: Option<u32>,
    /// Legal cap on occurrences per day.
    #[serde(default = "default_max_times_per_day")]
    pub max_times_per_day: u32,
    /// Whether the addition belongs to a mutual-exclusivity group.
    #[serde(default)]
    pub is_exclusive: bool,
    /// Human-readable requirement text.
    #[serde(default)]
    pub requirements: Option<String>,
    /// Machine-checkable eligibility predicates.
    #[serde(default)]
    pub rules: Vec<RequirementRule>,
    /// Service types the addition applies to; empty means all.
    #[serde(default)]
    pub applicable_services: Vec<ServiceType>,
    /// How the addition gets enabled.
    #[serde(default = "default_kind")]
    pub kind: AdditionKind,
}

/// A time-sliced override of an addition's numeric/requirement fields.
///
/// For a given addition, effective ranges must not overlap: at most one
/// version is effective on any calendar date. That invariant is enforced
/// when the catalog is loaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdditionVersion {
    /// Code of the owning addition.
    pub addition_code: String,
    /// Monotonic version number within the addition.
    pub version_number: u32,
    /// Unit value in force during this version's range.
    #[serde(default)]
    pub units: Option<i64>,
    /// Whether the addition is percentage-based during this range.
    #[serde(default)]
    pub is_percentage: bool,
    /// Percentage rate in force during this range.
    #[serde(default)]
    pub percentage_rate: Option<Decimal>,
    /// Requirement text in force during this range.
    #[serde(default)]
    pub requirements: Option<String>,
    /// Eligibility predicates in force during this range.
    #[serde(default)]
    pub rules: Vec<RequirementRule>,
    /// Monthly occurrence cap in force during this range.
    #[serde(default)]
    pub max_times_per_month: Option<u32>,
    /// Daily occurrence cap; falls back to the base value when omitted.
    #[serde(default)]
    pub max_times_per_day: Option<u32>,
    /// First date (inclusive) on which this version applies.
    pub effective_from: NaiveDate,
    /// Last date (inclusive) on which this version applies; `None` means
    /// open-ended.
    #[serde(default)]
    pub effective_to: Option<NaiveDate>,
    /// The law revision this version belongs to.
    #[serde(default)]
    pub revision_id: Option<String>,
}

/// A named legal change event grouping one or more addition versions.
///
/// Immutable once published; kept for audit and traceability only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LawRevision {
    /// Stable identifier.
    pub id: String,
    /// The date the revision takes effect.
    pub revision_date: NaiveDate,
    /// Display name of the revision.
    pub name: String,
    /// Free-form description.
    #[serde(default)]
    pub description: Option<String>,
    /// Link to the source document.
    #[serde(default)]
    pub source_url: Option<String>,
}

/// Application/approval status of a facility-level addition setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SettingStatus {
    /// Planned but not yet applied for.
    Planned,
    /// Application in preparation.
    Applying,
    /// Application submitted to the authority.
    Submitted,
    /// Approved and in force. Only this status contributes to
    /// calculations.
    Active,
    /// No longer in force.
    Inactive,
}

/// Per-facility enablement record for a facility-preset addition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FacilityAdditionSetting {
    /// The facility this setting belongs to.
    pub facility_id: String,
    /// Code of the addition being enabled.
    pub addition_code: String,
    /// Operator-facing on/off flag.
    pub is_enabled: bool,
    /// Application/approval status.
    pub status: SettingStatus,
    /// First date the setting applies, if bounded.
    #[serde(default)]
    pub effective_from: Option<NaiveDate>,
    /// Last date the setting applies, if bounded.
    #[serde(default)]
    pub effective_to: Option<NaiveDate>,
}

impl FacilityAdditionSetting {
    /// Returns true when the setting actually contributes to calculations.
    pub fn is_in_force(&self) -> bool {
        self.is_enabled && self.status == SettingStatus::Active
    }
}
