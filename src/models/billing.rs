//! Monthly billing record models.
//!
//! A [`BillingRecord`] is one child/facility/month aggregate; its
//! [`BillingDetail`] rows are one line per service day. Both are created
//! by the monthly aggregator, replaced freely while in draft state, and
//! frozen once confirmed.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{ServiceStatus, ServiceType, YearMonth};

/// Lifecycle state of a monthly billing record.
///
/// Transitions are `Draft -> Confirmed -> Submitted`, one-way. Only draft
/// records may be deleted and regenerated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BillingStatus {
    /// Freshly generated; replaced by the next generation run.
    Draft,
    /// Confirmed by the operator; immutable from here on.
    Confirmed,
    /// Submitted to the national health insurance federation.
    Submitted,
}

/// One addition applied on a billing detail line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppliedAddition {
    /// Service code of the addition.
    pub code: String,
    /// Display name of the addition.
    pub name: String,
    /// Units contributed by the addition on this day.
    pub units: i64,
}

/// One child/facility/month billing aggregate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BillingRecord {
    /// Unique identifier.
    pub id: Uuid,
    /// The billed facility.
    pub facility_id: String,
    /// The billed child.
    pub child_id: String,
    /// The billing period.
    pub year_month: YearMonth,
    /// Service type the child was classified under for this month.
    pub service_type: ServiceType,
    /// Sum of unit counts over the child's detail lines.
    pub total_units: i64,
    /// Yen value of one unit.
    pub unit_price: Decimal,
    /// Total billed amount in yen.
    pub total_amount: i64,
    /// Guardian copay in yen, capped by the income-tier ceiling.
    pub copay_amount: i64,
    /// Insurance-funded remainder in yen.
    pub insurance_amount: i64,
    /// The income-tier ceiling applied, in yen.
    pub upper_limit_amount: i64,
    /// Lifecycle state.
    pub status: BillingStatus,
    /// When the record was created.
    pub created_at: DateTime<Utc>,
    /// When the record was last updated.
    pub updated_at: DateTime<Utc>,
}

/// One service-day line under a billing record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BillingDetail {
    /// Unique identifier.
    pub id: Uuid,
    /// The owning billing record.
    pub billing_record_id: Uuid,
    /// The service date.
    pub service_date: NaiveDate,
    /// The service code billed for the day.
    pub service_code: String,
    /// Units billed for the day, additions included.
    pub unit_count: i64,
    /// Whether the day was an absence.
    pub is_absence: bool,
    /// The absence outcome, when `is_absence`.
    #[serde(default)]
    pub absence_type: Option<ServiceStatus>,
    /// Additions applied on this day.
    #[serde(default)]
    pub additions: Vec<AppliedAddition>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_record() -> BillingRecord {
        BillingRecord {
            id: Uuid::nil(),
            facility_id: "fac_001".to_string(),
            child_id: "child_001".to_string(),
            year_month: "2024-06".parse().unwrap(),
            service_type: ServiceType::AfterSchoolDayService,
            total_units: 13920,
            unit_price: Decimal::from(10),
            total_amount: 139200,
            copay_amount: 4600,
            insurance_amount: 134600,
            upper_limit_amount: 4600,
            status: BillingStatus::Draft,
            created_at: DateTime::parse_from_rfc3339("2024-07-01T09:00:00Z")
                .unwrap()
                .with_timezone(&Utc),
            updated_at: DateTime::parse_from_rfc3339("2024-07-01T09:00:00Z")
                .unwrap()
                .with_timezone(&Utc),
        }
    }

    #[test]
    fn test_billing_status_serialization() {
        assert_eq!(
            serde_json::to_string(&BillingStatus::Draft).unwrap(),
            "\"draft\""
        );
        assert_eq!(
            serde_json::to_string(&BillingStatus::Confirmed).unwrap(),
            "\"confirmed\""
        );
        assert_eq!(
            serde_json::to_string(&BillingStatus::Submitted).unwrap(),
            "\"submitted\""
        );
    }

    #[test]
    fn test_record_amounts_are_consistent() {
        let record = sample_record();
        assert_eq!(
            record.copay_amount + record.insurance_amount,
            record.total_amount
        );
    }

    #[test]
    fn test_record_serialization_round_trip() {
        let record = sample_record();
        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains("\"year_month\":\"2024-06\""));
        assert!(json.contains("\"service_type\":\"after_school_day_service\""));
        let back: BillingRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, record);
    }

    #[test]
    fn test_detail_serialization_with_additions() {
        let detail = BillingDetail {
            id: Uuid::nil(),
            billing_record_id: Uuid::nil(),
            service_date: NaiveDate::from_ymd_opt(2024, 6, 3).unwrap(),
            service_code: "631111".to_string(),
            unit_count: 712,
            is_absence: false,
            absence_type: None,
            additions: vec![AppliedAddition {
                code: "616702".to_string(),
                name: "Transport addition (round trip)".to_string(),
                units: 108,
            }],
        };
        let json = serde_json::to_string(&detail).unwrap();
        assert!(json.contains("\"service_code\":\"631111\""));
        assert!(json.contains("\"616702\""));
        let back: BillingDetail = serde_json::from_str(&json).unwrap();
        assert_eq!(back, detail);
    }
}
