//! Addition suggestions derived from the staffing composition.
//!
//! The generator proposes additions the facility plausibly qualifies for
//! but has not enabled. Suggestions are advisory only and never override
//! explicit operator choices.

use rust_decimal::Decimal;
use std::collections::HashSet;

use crate::config::RuleCatalog;
use crate::models::{AdditionSelection, Staff, Suggestion, SuggestionPriority};

use super::staffing::{calculate_fte, count_experienced_staff, count_qualified_staff};

/// Business days assumed per month when estimating a suggestion's value.
pub const ASSUMED_BUSINESS_DAYS: u32 = 22;

/// Code of the specialist support addition.
pub const SPECIALIST_SUPPORT_CODE: &str = "specialist_support";

/// Code of the senior staff allocation tier I (full-time) addition.
pub const SENIOR_ALLOCATION_TIER1_CODE: &str = "staff_allocation_1_fulltime";

/// Name of the senior staff allocation exclusivity group.
pub const STAFF_ALLOCATION_GROUP: &str = "staff_allocation";

/// Code of the transport addition.
pub const TRANSPORT_CODE: &str = "transport";

/// Qualification codes that count as a specialist, including their
/// localized names.
pub const SPECIALIST_QUALIFICATIONS: [&str; 8] = [
    "PT",
    "OT",
    "ST",
    "PSYCHOLOGIST",
    "理学療法士",
    "作業療法士",
    "言語聴覚士",
    "公認心理師",
];

/// Proposes not-yet-enabled additions based on the staffing composition.
///
/// Three proposals are considered:
/// - specialist support, when a specialist qualification holder is active;
/// - senior staff allocation tier I, when an experienced and sufficiently
///   staffed team exists and no tier of that group is enabled yet;
/// - transport, whenever not enabled, since almost every facility
///   qualifies.
///
/// Output is sorted by priority, then insertion order. The selection set
/// itself is never mutated.
pub fn generate_suggestions(
    staff: &[Staff],
    selections: &[AdditionSelection],
    catalog: &RuleCatalog,
) -> Vec<Suggestion> {
    let mut suggestions: Vec<Suggestion> = Vec::new();
    let enabled: HashSet<&str> = selections
        .iter()
        .filter(|s| s.enabled)
        .map(|s| s.code.as_str())
        .collect();

    let specialist_qualifications: Vec<String> = SPECIALIST_QUALIFICATIONS
        .iter()
        .map(|q| q.to_string())
        .collect();
    let has_specialist = count_qualified_staff(staff, &specialist_qualifications) > 0;
    let experienced = count_experienced_staff(staff, 5);
    let fte = calculate_fte(staff);

    if has_specialist && !enabled.contains(SPECIALIST_SUPPORT_CODE) {
        if let Some(addition) = catalog.find_addition(SPECIALIST_SUPPORT_CODE) {
            let cap = catalog.effective_monthly_cap(addition).unwrap_or(4);
            suggestions.push(Suggestion {
                addition_code: addition.code.clone(),
                addition_name: addition.name.clone(),
                potential_units: addition.units.unwrap_or(0) * i64::from(cap),
                reason: "a physical/occupational/speech therapist or certified psychologist is on staff"
                    .to_string(),
                requirements: requirement_text(addition),
                priority: SuggestionPriority::High,
            });
        }
    }

    if experienced > 0 && fte >= Decimal::ONE {
        let group_enabled = catalog
            .exclusive_groups()
            .iter()
            .filter(|g| g.name == STAFF_ALLOCATION_GROUP)
            .flat_map(|g| g.codes.iter())
            .any(|code| enabled.contains(code.as_str()));

        if !group_enabled {
            if let Some(addition) = catalog.find_addition(SENIOR_ALLOCATION_TIER1_CODE) {
                suggestions.push(Suggestion {
                    addition_code: addition.code.clone(),
                    addition_name: addition.name.clone(),
                    potential_units: addition.units.unwrap_or(0)
                        * i64::from(ASSUMED_BUSINESS_DAYS),
                    reason: format!(
                        "{experienced} staff with 5+ years of experience, full-time equivalent {}",
                        fte.round_dp(1)
                    ),
                    requirements: requirement_text(addition),
                    priority: SuggestionPriority::High,
                });
            }
        }
    }

    if !enabled.contains(TRANSPORT_CODE) {
        if let Some(addition) = catalog.find_addition(TRANSPORT_CODE) {
            // Round trip on every assumed business day.
            suggestions.push(Suggestion {
                addition_code: addition.code.clone(),
                addition_name: addition.name.clone(),
                potential_units: addition.units.unwrap_or(0)
                    * 2
                    * i64::from(ASSUMED_BUSINESS_DAYS),
                reason: "claimable whenever transport between home or school and the facility is provided"
                    .to_string(),
                requirements: requirement_text(addition),
                priority: SuggestionPriority::Medium,
            });
        }
    }

    suggestions.sort_by_key(|s| s.priority);
    suggestions
}

fn requirement_text(addition: &crate::models::Addition) -> String {
    addition.requirements.clone().unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigLoader;
    use crate::models::EmploymentType;

    fn catalog() -> RuleCatalog {
        ConfigLoader::load("./config/r6")
            .expect("Failed to load config")
            .catalog()
            .clone()
    }

    fn veteran() -> Staff {
        Staff {
            id: "veteran".to_string(),
            name: "Veteran".to_string(),
            qualifications: vec![],
            years_of_experience: 6,
            employment_type: EmploymentType::FullTime,
            weekly_hours: None,
            is_active: true,
        }
    }

    fn therapist() -> Staff {
        Staff {
            id: "therapist".to_string(),
            name: "Therapist".to_string(),
            qualifications: vec!["ST".to_string()],
            years_of_experience: 3,
            employment_type: EmploymentType::FullTime,
            weekly_hours: None,
            is_active: true,
        }
    }

    #[test]
    fn test_specialist_suggested_when_specialist_on_staff() {
        let catalog = catalog();
        let suggestions = generate_suggestions(&[therapist()], &[], &catalog);

        let specialist = suggestions
            .iter()
            .find(|s| s.addition_code == SPECIALIST_SUPPORT_CODE)
            .unwrap();
        assert_eq!(specialist.priority, SuggestionPriority::High);
        // 150 units, capped at 4 times per month.
        assert_eq!(specialist.potential_units, 600);
    }

    #[test]
    fn test_specialist_not_suggested_when_already_enabled() {
        let catalog = catalog();
        let selections = vec![AdditionSelection::enabled(SPECIALIST_SUPPORT_CODE)];
        let suggestions = generate_suggestions(&[therapist()], &selections, &catalog);

        assert!(
            suggestions
                .iter()
                .all(|s| s.addition_code != SPECIALIST_SUPPORT_CODE)
        );
    }

    #[test]
    fn test_specialist_not_suggested_without_specialist() {
        let catalog = catalog();
        let suggestions = generate_suggestions(&[veteran()], &[], &catalog);

        assert!(
            suggestions
                .iter()
                .all(|s| s.addition_code != SPECIALIST_SUPPORT_CODE)
        );
    }

    #[test]
    fn test_senior_allocation_suggested_for_experienced_team() {
        let catalog = catalog();
        let suggestions = generate_suggestions(&[veteran()], &[], &catalog);

        let allocation = suggestions
            .iter()
            .find(|s| s.addition_code == SENIOR_ALLOCATION_TIER1_CODE)
            .unwrap();
        assert_eq!(allocation.potential_units, 187 * 22);
        assert!(allocation.reason.contains("1 staff with 5+ years"));
    }

    #[test]
    fn test_senior_allocation_not_suggested_when_any_tier_enabled() {
        let catalog = catalog();
        // A lower tier of the same group is already enabled.
        let selections = vec![AdditionSelection::enabled("staff_allocation_3")];
        let suggestions = generate_suggestions(&[veteran()], &selections, &catalog);

        assert!(
            suggestions
                .iter()
                .all(|s| s.addition_code != SENIOR_ALLOCATION_TIER1_CODE)
        );
    }

    #[test]
    fn test_transport_suggested_whenever_not_enabled() {
        let catalog = catalog();
        let suggestions = generate_suggestions(&[], &[], &catalog);

        let transport = suggestions
            .iter()
            .find(|s| s.addition_code == TRANSPORT_CODE)
            .unwrap();
        assert_eq!(transport.priority, SuggestionPriority::Medium);
        assert_eq!(transport.potential_units, 54 * 2 * 22);
    }

    #[test]
    fn test_high_priority_sorts_before_medium() {
        let catalog = catalog();
        let suggestions = generate_suggestions(&[therapist(), veteran()], &[], &catalog);

        assert!(suggestions.len() >= 3);
        let priorities: Vec<SuggestionPriority> =
            suggestions.iter().map(|s| s.priority).collect();
        let mut sorted = priorities.clone();
        sorted.sort();
        assert_eq!(priorities, sorted);
        assert_eq!(suggestions[0].priority, SuggestionPriority::High);
    }

    #[test]
    fn test_suggestions_do_not_mutate_selections() {
        let catalog = catalog();
        let selections = vec![AdditionSelection::disabled(TRANSPORT_CODE)];
        let before = selections.clone();
        let _ = generate_suggestions(&[], &selections, &catalog);
        assert_eq!(selections, before);
    }
}
