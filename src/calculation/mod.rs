//! Calculation logic for the addition engine.
//!
//! This module contains the pure rule functions: temporal version lookup
//! and merging, mutual-exclusivity resolution, monthly cap enforcement,
//! staffing metrics, eligibility checking, suggestion generation,
//! selection assembly from facility settings, and the revenue projection
//! that ties them together. Everything here is synchronous, side-effect
//! free and safe to call concurrently.

mod eligibility;
mod exclusivity;
mod limits;
mod revenue;
mod selections;
mod staffing;
mod suggestions;
pub(crate) mod versioning;

pub use eligibility::check_requirements;
pub use exclusivity::{ExclusivityOutcome, resolve_exclusive_groups};
pub use limits::{LimitOutcome, apply_monthly_limits};
pub use revenue::{calculate_revenue, calculate_revenue_with_versions};
pub use selections::{CategorizedAdditions, categorize_by_kind, merge_with_facility_settings};
pub use staffing::{
    DEFAULT_PART_TIME_HOURS, FULL_TIME_WEEKLY_HOURS, calculate_fte, count_experienced_staff,
    count_qualified_staff,
};
pub use suggestions::{
    ASSUMED_BUSINESS_DAYS, SENIOR_ALLOCATION_TIER1_CODE, SPECIALIST_QUALIFICATIONS,
    SPECIALIST_SUPPORT_CODE, STAFF_ALLOCATION_GROUP, TRANSPORT_CODE, generate_suggestions,
};
pub use versioning::{effective_version, merge_additions_with_versions, validate_versions};
