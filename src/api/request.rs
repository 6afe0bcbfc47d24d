//! Request types for the addition engine API.
//!
//! This module defines the JSON request structures for the `/calculate`
//! and `/billing/*` endpoints.

use chrono::{NaiveDate, NaiveTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::billing::FacilityInfo;
use crate::models::{
    AdditionSelection, Child, EmploymentType, FacilityAdditionSetting, ServiceStatus,
    SettingStatus, Staff, UsageRecord, YearMonth,
};

/// Request body for the `/calculate` endpoint.
///
/// Contains the operator's selections plus the staffing and child
/// context the eligibility checks run against.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalculationRequest {
    /// The operator's addition selections.
    pub selections: Vec<SelectionRequest>,
    /// Facility-level settings for facility-preset additions. When
    /// present, preset additions follow these settings and manual
    /// toggles for them are discarded.
    #[serde(default)]
    pub facility_settings: Vec<FacilitySettingRequest>,
    /// The active staff roster.
    #[serde(default)]
    pub staff: Vec<StaffRequest>,
    /// The enrolled children.
    #[serde(default)]
    pub children: Vec<ChildRequest>,
    /// Base service reward per day, in units.
    pub base_reward_units: i64,
    /// Number of business days in the projected month.
    pub business_days: u32,
    /// Yen per unit; defaults to the configured price when omitted.
    #[serde(default)]
    pub unit_price: Option<Decimal>,
    /// Month whose rule versions should apply; the current base values
    /// apply when omitted.
    #[serde(default)]
    pub target_month: Option<YearMonth>,
}

/// One addition selection in a calculation request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectionRequest {
    /// Code of the selected addition.
    pub code: String,
    /// Whether the addition is switched on.
    pub enabled: bool,
    /// Requested occurrences per month, when not every business day.
    #[serde(default)]
    pub custom_days_per_month: Option<u32>,
}

/// One facility-level addition setting in a calculation request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FacilitySettingRequest {
    /// The facility the setting belongs to.
    #[serde(default)]
    pub facility_id: String,
    /// Code of the addition being enabled.
    pub addition_code: String,
    /// Operator-facing on/off flag.
    pub is_enabled: bool,
    /// Application/approval status.
    pub status: SettingStatus,
}

/// Staff information in a calculation request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StaffRequest {
    /// Unique identifier.
    pub id: String,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Qualification codes held.
    #[serde(default)]
    pub qualifications: Vec<String>,
    /// Years of relevant experience.
    #[serde(default)]
    pub years_of_experience: u32,
    /// Employment arrangement.
    pub employment_type: EmploymentType,
    /// Contracted weekly hours.
    #[serde(default)]
    pub weekly_hours: Option<Decimal>,
    /// Whether the staff member is active.
    #[serde(default = "default_true")]
    pub is_active: bool,
}

/// Child information in a calculation request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChildRequest {
    /// Unique identifier.
    pub id: String,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Recipient certificate number.
    #[serde(default)]
    pub beneficiary_number: Option<String>,
    /// Medical care needs score.
    #[serde(default)]
    pub medical_care_score: i32,
    /// Intensive behavior disorder score.
    #[serde(default)]
    pub behavior_disorder_score: i32,
    /// Care-needs classification code.
    #[serde(default)]
    pub care_needs_category: Option<String>,
    /// Whether the child is flagged as protected/at-risk.
    #[serde(default)]
    pub is_protected_child: bool,
    /// Guardian income category.
    #[serde(default)]
    pub income_category: Option<String>,
}

/// One usage record in a `/billing/usage` upload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsageRecordRequest {
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
    /// Planned service start time.
    #[serde(default)]
    pub planned_start_time: Option<NaiveTime>,
    /// Planned service end time.
    #[serde(default)]
    pub planned_end_time: Option<NaiveTime>,
    /// Actual service start time.
    #[serde(default)]
    pub actual_start_time: Option<NaiveTime>,
    /// Actual service end time.
    #[serde(default)]
    pub actual_end_time: Option<NaiveTime>,
    /// Whether the facility picked the child up.
    #[serde(default)]
    pub pickup: bool,
    /// Whether the facility dropped the child off.
    #[serde(default)]
    pub dropoff: bool,
    /// Free-form addon names recorded by the operator.
    #[serde(default)]
    pub addon_names: Vec<String>,
    /// Whether the record should be billed.
    #[serde(default = "default_true")]
    pub billing_target: bool,
}

/// Request body for `POST /billing/usage`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsageUploadRequest {
    /// Usage records to append to the store.
    pub records: Vec<UsageRecordRequest>,
    /// Child master rows to upsert alongside the records.
    #[serde(default)]
    pub children: Vec<ChildRequest>,
}

/// Request body for `POST /billing/generate` and `POST /billing/confirm`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BillingRunRequest {
    /// The facility to process.
    pub facility_id: String,
    /// The billing period.
    pub year_month: YearMonth,
}

/// Request body for `POST /billing/export`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportRequest {
    /// The facility to export.
    pub facility_id: String,
    /// The billing period.
    pub year_month: YearMonth,
    /// Facility identity rendered into the file header.
    pub facility: FacilityInfo,
}

fn default_true() -> bool {
    true
}

impl From<SelectionRequest> for AdditionSelection {
    fn from(req: SelectionRequest) -> Self {
        AdditionSelection {
            code: req.code,
            enabled: req.enabled,
            custom_days_per_month: req.custom_days_per_month,
        }
    }
}

impl From<FacilitySettingRequest> for FacilityAdditionSetting {
    fn from(req: FacilitySettingRequest) -> Self {
        FacilityAdditionSetting {
            facility_id: req.facility_id,
            addition_code: req.addition_code,
            is_enabled: req.is_enabled,
            status: req.status,
            effective_from: None,
            effective_to: None,
        }
    }
}

impl From<StaffRequest> for Staff {
    fn from(req: StaffRequest) -> Self {
        Staff {
            id: req.id,
            name: req.name,
            qualifications: req.qualifications,
            years_of_experience: req.years_of_experience,
            employment_type: req.employment_type,
            weekly_hours: req.weekly_hours,
            is_active: req.is_active,
        }
    }
}

impl From<ChildRequest> for Child {
    fn from(req: ChildRequest) -> Self {
        Child {
            id: req.id,
            name: req.name,
            beneficiary_number: req.beneficiary_number,
            medical_care_score: req.medical_care_score,
            behavior_disorder_score: req.behavior_disorder_score,
            care_needs_category: req.care_needs_category,
            is_protected_child: req.is_protected_child,
            income_category: req.income_category,
        }
    }
}

impl From<UsageRecordRequest> for UsageRecord {
    fn from(req: UsageRecordRequest) -> Self {
        UsageRecord {
            id: req.id,
            facility_id: req.facility_id,
            child_id: req.child_id,
            date: req.date,
            service_status: req.service_status,
            planned_start_time: req.planned_start_time,
            planned_end_time: req.planned_end_time,
            actual_start_time: req.actual_start_time,
            actual_end_time: req.actual_end_time,
            pickup: req.pickup,
            dropoff: req.dropoff,
            addon_names: req.addon_names,
            billing_target: req.billing_target,
        }
    }
}
