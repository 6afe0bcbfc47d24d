//! Staffing composition metrics.
//!
//! Eligibility checks and suggestions both reason over the same three
//! measures: aggregate full-time equivalent, qualification counts, and
//! experience counts. Inactive staff never count.

use rust_decimal::Decimal;

use crate::models::{EmploymentType, Staff};

/// Weekly hours that count as 1.0 full-time equivalent.
pub const FULL_TIME_WEEKLY_HOURS: i64 = 40;

/// Weekly hours assumed for a part-time staff member with no contracted
/// hours on record.
pub const DEFAULT_PART_TIME_HOURS: i64 = 20;

/// Aggregate full-time equivalent across active staff.
///
/// FTE is the sum of weekly hours divided by 40. A missing `weekly_hours`
/// defaults to 40 for full-time staff and 20 for part-time staff.
///
/// # Example
///
/// ```
/// use addition_engine::calculation::calculate_fte;
/// use addition_engine::models::{EmploymentType, Staff};
/// use rust_decimal::Decimal;
///
/// let staff = vec![
///     Staff {
///         id: "s1".to_string(),
///         name: "Sato".to_string(),
///         qualifications: vec![],
///         years_of_experience: 6,
///         employment_type: EmploymentType::FullTime,
///         weekly_hours: None,
///         is_active: true,
///     },
///     Staff {
///         id: "s2".to_string(),
///         name: "Suzuki".to_string(),
///         qualifications: vec![],
///         years_of_experience: 2,
///         employment_type: EmploymentType::PartTime,
///         weekly_hours: None,
///         is_active: true,
///     },
/// ];
/// assert_eq!(calculate_fte(&staff), Decimal::new(15, 1)); // 1.5
/// ```
pub fn calculate_fte(staff: &[Staff]) -> Decimal {
    let full_time = Decimal::from(FULL_TIME_WEEKLY_HOURS);
    staff
        .iter()
        .filter(|s| s.is_active)
        .map(|s| {
            let hours = s.weekly_hours.unwrap_or_else(|| match s.employment_type {
                EmploymentType::FullTime => full_time,
                EmploymentType::PartTime => Decimal::from(DEFAULT_PART_TIME_HOURS),
            });
            hours / full_time
        })
        .sum()
}

/// Number of active staff holding any of the given qualifications.
pub fn count_qualified_staff(staff: &[Staff], qualifications: &[String]) -> usize {
    staff
        .iter()
        .filter(|s| s.is_active && s.holds_any(qualifications))
        .count()
}

/// Number of active staff with at least `min_years` of experience.
pub fn count_experienced_staff(staff: &[Staff], min_years: u32) -> usize {
    staff
        .iter()
        .filter(|s| s.is_active && s.years_of_experience >= min_years)
        .count()
}
