//! Government submission file rendering.
//!
//! Produces the row-oriented CSV consumed by the national health
//! insurance federation upload tooling: one header row, one row per
//! child record, and a trailer row with totals.

use crate::models::{BillingRecord, Child, ServiceType, YearMonth};

/// Record type marker of the header row.
const RECORD_TYPE_HEADER: &str = "1";
/// Record type marker of a detail row.
const RECORD_TYPE_DETAIL: &str = "2";
/// Record type marker of the trailer row.
const RECORD_TYPE_TRAILER: &str = "3";

/// Identity of the submitting facility as it appears in the file.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct FacilityInfo {
    /// The facility's government-issued office number.
    pub code: String,
    /// The facility's registered name.
    pub name: String,
}

/// Renders the submission CSV for one facility and month.
///
/// Layout:
/// - header: record type, office number, office name, `YYYYMM`, detail
///   count;
/// - one detail row per billing record: record type, recipient
///   certificate number, child name, service type, total units, unit
///   price, total amount, copay, insurance amount, ceiling, status;
/// - trailer: record type, detail count, insurance total, copay total,
///   grand total.
///
/// Children supply the certificate numbers; a record whose child is
/// missing from the slice renders empty identity columns rather than
/// failing, since the file is re-rendered freely.
pub fn render_submission_csv(
    facility: &FacilityInfo,
    period: YearMonth,
    records: &[BillingRecord],
    children: &[Child],
) -> String {
    let mut lines: Vec<String> = Vec::with_capacity(records.len() + 2);

    lines.push(
        [
            RECORD_TYPE_HEADER,
            facility.code.as_str(),
            facility.name.as_str(),
            period.compact().as_str(),
            records.len().to_string().as_str(),
        ]
        .join(","),
    );

    let mut insurance_total: i64 = 0;
    let mut copay_total: i64 = 0;

    for record in records {
        let child = children.iter().find(|c| c.id == record.child_id);
        let beneficiary_number = child
            .and_then(|c| c.beneficiary_number.as_deref())
            .unwrap_or("");
        let child_name = child.map(|c| c.name.as_str()).unwrap_or("");

        insurance_total += record.insurance_amount;
        copay_total += record.copay_amount;

        lines.push(
            [
                RECORD_TYPE_DETAIL,
                beneficiary_number,
                child_name,
                service_type_label(record.service_type),
                record.total_units.to_string().as_str(),
                record.unit_price.normalize().to_string().as_str(),
                record.total_amount.to_string().as_str(),
                record.copay_amount.to_string().as_str(),
                record.insurance_amount.to_string().as_str(),
                record.upper_limit_amount.to_string().as_str(),
                status_label(record),
            ]
            .join(","),
        );
    }

    lines.push(
        [
            RECORD_TYPE_TRAILER,
            records.len().to_string().as_str(),
            insurance_total.to_string().as_str(),
            copay_total.to_string().as_str(),
            (insurance_total + copay_total).to_string().as_str(),
        ]
        .join(","),
    );

    lines.join("\n")
}

fn service_type_label(service_type: ServiceType) -> &'static str {
    match service_type {
        ServiceType::ChildDevelopmentSupport => "child_development_support",
        ServiceType::AfterSchoolDayService => "after_school_day_service",
    }
}

fn status_label(record: &BillingRecord) -> &'static str {
    match record.status {
        crate::models::BillingStatus::Draft => "draft",
        crate::models::BillingStatus::Confirmed => "confirmed",
        crate::models::BillingStatus::Submitted => "submitted",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::BillingStatus;
    use rust_decimal::Decimal;
    use uuid::Uuid;

    fn facility() -> FacilityInfo {
        FacilityInfo {
            code: "1310000001".to_string(),
            name: "Sakura Kids".to_string(),
        }
    }

    fn record(child_id: &str, units: i64, copay: i64) -> BillingRecord {
        let total = units * 10;
        BillingRecord {
            id: Uuid::new_v4(),
            facility_id: "fac_001".to_string(),
            child_id: child_id.to_string(),
            year_month: "2024-06".parse().unwrap(),
            service_type: ServiceType::AfterSchoolDayService,
            total_units: units,
            unit_price: Decimal::from(10),
            total_amount: total,
            copay_amount: copay,
            insurance_amount: total - copay,
            upper_limit_amount: 37200,
            status: BillingStatus::Confirmed,
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        }
    }

    fn child(id: &str, number: &str) -> Child {
        Child {
            id: id.to_string(),
            name: format!("Child {id}"),
            beneficiary_number: Some(number.to_string()),
            medical_care_score: 0,
            behavior_disorder_score: 0,
            care_needs_category: None,
            is_protected_child: false,
            income_category: None,
        }
    }

    #[test]
    fn test_header_row_layout() {
        let csv = render_submission_csv(
            &facility(),
            "2024-06".parse().unwrap(),
            &[record("c1", 13920, 4600)],
            &[child("c1", "9900000001")],
        );
        let header = csv.lines().next().unwrap();
        assert_eq!(header, "1,1310000001,Sakura Kids,202406,1");
    }

    #[test]
    fn test_detail_row_layout() {
        let csv = render_submission_csv(
            &facility(),
            "2024-06".parse().unwrap(),
            &[record("c1", 13920, 4600)],
            &[child("c1", "9900000001")],
        );
        let detail = csv.lines().nth(1).unwrap();
        assert_eq!(
            detail,
            "2,9900000001,Child c1,after_school_day_service,13920,10,139200,4600,134600,37200,confirmed"
        );
    }

    #[test]
    fn test_trailer_totals() {
        let csv = render_submission_csv(
            &facility(),
            "2024-06".parse().unwrap(),
            &[record("c1", 10000, 4600), record("c2", 5000, 5000)],
            &[child("c1", "9900000001"), child("c2", "9900000002")],
        );
        let trailer = csv.lines().last().unwrap();
        // insurance: (100000-4600) + (50000-5000) = 140400; copay: 9600.
        assert_eq!(trailer, "3,2,140400,9600,150000");
    }

    #[test]
    fn test_missing_child_renders_empty_identity() {
        let csv = render_submission_csv(
            &facility(),
            "2024-06".parse().unwrap(),
            &[record("ghost", 1000, 1000)],
            &[],
        );
        let detail = csv.lines().nth(1).unwrap();
        assert!(detail.starts_with("2,,,after_school_day_service,"));
    }

    #[test]
    fn test_empty_records_render_header_and_trailer_only() {
        let csv =
            render_submission_csv(&facility(), "2024-06".parse().unwrap(), &[], &[]);
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1], "3,0,0,0,0");
    }
}
