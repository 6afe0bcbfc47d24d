//! Core data models for the addition engine.
//!
//! This module contains all the domain models used throughout the engine.

mod addition;
mod billing;
mod calculation_result;
mod child;
mod selection;
mod staff;
mod usage;
mod year_month;

pub use addition::{
    Addition, AdditionKind, AdditionVersion, FacilityAdditionSetting, LawRevision,
    RequirementRule, SettingStatus,
};
pub use billing::{AppliedAddition, BillingDetail, BillingRecord, BillingStatus};
pub use calculation_result::{
    AdditionBreakdown, BreakdownStatus, CalculationResult, Severity, Suggestion,
    SuggestionPriority, Warning, WarningKind,
};
pub use child::Child;
pub use selection::AdditionSelection;
pub use staff::{EmploymentType, Staff};
pub use usage::{ServiceStatus, ServiceType, UsageRecord};
pub use year_month::YearMonth;
