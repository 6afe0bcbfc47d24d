//! Daily usage records and service classification.
//!
//! Usage records are created by the day-to-day operations UI and are an
//! immutable input to the monthly billing aggregator.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

/// The two service types a facility bills under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceType {
    /// Pre-school child development support.
    ChildDevelopmentSupport,
    /// After-school day service for school-age children.
    AfterSchoolDayService,
}

/// Attendance outcome for one child/day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceStatus {
    /// The child attended and the service was provided.
    Used,
    /// The child was absent and nothing is billable.
    AbsenceNoAddition,
    /// The child was absent but the absence-response addition applies.
    AbsenceWithAddition,
}

fn default_true() -> bool {
    true
}

/// One child/day attendance fact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsageRecord {
    /// Unique identifier.
    pub id: String,
    /// The facility the service was provided at.
    pub facility_id: String,
    /// The child the service was provided to.
    pub child_id: String,
    /// The service date.
    pub date: NaiveDate,
    /// Attendance outcome.
    pub service_status: ServiceStatus,
    /// Planned service start time from the schedule.
    #[serde(default)]
    pub planned_start_time: Option<NaiveTime>,
    /// Planned service end time from the schedule.
    #[serde(default)]
    pub planned_end_time: Option<NaiveTime>,
    /// Actual service start time, when the child attended.
    #[serde(default)]
    pub actual_start_time: Option<NaiveTime>,
    /// Actual service end time, when the child attended.
    #[serde(default)]
    pub actual_end_time: Option<NaiveTime>,
    /// Whether the facility picked the child up.
    #[serde(default)]
    pub pickup: bool,
    /// Whether the facility dropped the child off.
    #[serde(default)]
    pub dropoff: bool,
    /// Free-form addon names recorded by the operator, matched against
    /// the addition-category service codes during aggregation.
    #[serde(default)]
    pub addon_names: Vec<String>,
    /// Whether the record should be billed at all.
    #[serde(default = "default_true")]
    pub billing_target: bool,
}

impl UsageRecord {
    /// Returns true for either absence outcome.
    pub fn is_absence(&self) -> bool {
        matches!(
            self.service_status,
            ServiceStatus::AbsenceNoAddition | ServiceStatus::AbsenceWithAddition
        )
    }
}
