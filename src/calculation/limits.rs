//! Per-period occurrence cap enforcement.
//!
//! Several additions carry a legal maximum number of occurrences per
//! month (e.g. family support twice per month). This module clamps
//! requested occurrence counts to those caps.

use crate::config::RuleCatalog;
use crate::models::{AdditionSelection, Severity, Warning, WarningKind};

/// The result of applying monthly caps to a selection set.
#[derive(Debug, Clone)]
pub struct LimitOutcome {
    /// The selections, with over-cap occurrence counts clamped.
    pub limited: Vec<AdditionSelection>,
    /// One `over_limit` warning per clamped selection.
    pub warnings: Vec<Warning>,
}

/// Clamps every enabled selection to its effective monthly cap.
///
/// The effective cap is the catalog's override table entry when present,
/// otherwise the addition's own `max_times_per_month`. The requested
/// count is the selection's custom value, or else the number of business
/// days in the billing period. A clamp never increases the requested
/// count; selections without a cap pass through unchanged.
pub fn apply_monthly_limits(
    selections: &[AdditionSelection],
    catalog: &RuleCatalog,
    business_days: u32,
) -> LimitOutcome {
    let mut warnings: Vec<Warning> = Vec::new();

    let limited = selections
        .iter()
        .map(|selection| {
            if !selection.enabled {
                return selection.clone();
            }
            let Some(addition) = catalog.find_addition(&selection.code) else {
                return selection.clone();
            };
            let Some(cap) = catalog.effective_monthly_cap(addition) else {
                return selection.clone();
            };

            let requested = selection.custom_days_per_month.unwrap_or(business_days);
            if requested <= cap {
                return selection.clone();
            }

            warnings.push(Warning {
                kind: WarningKind::OverLimit,
                addition_code: selection.code.clone(),
                addition_name: addition.name.clone(),
                message: format!(
                    "{} is capped at {cap} times per month (requested {requested}, clamped to {cap})",
                    addition.name
                ),
                severity: Severity::Info,
            });

            let mut clamped = selection.clone();
            clamped.custom_days_per_month = Some(cap);
            clamped
        })
        .collect();

    LimitOutcome { limited, warnings }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CatalogMetadata;
    use crate::models::{Addition, AdditionKind};
    use std::collections::HashMap;

    fn addition(code: &str, monthly_cap: Option<u32>) -> Addition {
        Addition {
            code: code.to_string(),
            name: format!("Addition {code}"),
            short_name: code.to_string(),
            category_code: "test".to_string(),
            units: Some(100),
            is_percentage: false,
            percentage_rate: None,
            max_times_per_month: monthly_cap,
            max_times_per_day: 1,
            is_exclusive: false,
            requirements: None,
            rules: vec![],
            applicable_services: vec![],
            kind: AdditionKind::Monthly,
        }
    }

    fn catalog(overrides: HashMap<String, u32>) -> RuleCatalog {
        RuleCatalog::new(
            CatalogMetadata {
                code: "TEST".to_string(),
                name: "Test".to_string(),
                version: "2024".to_string(),
                source_url: String::new(),
            },
            vec![
                addition("capped", Some(4)),
                addition("overridden", Some(6)),
                addition("uncapped", None),
            ],
            vec![],
            overrides,
            vec![],
            vec![],
        )
        .unwrap()
    }

    #[test]
    fn test_clamps_default_business_days_to_cap() {
        let catalog = catalog(HashMap::new());
        let selections = vec![AdditionSelection::enabled("capped")];

        let outcome = apply_monthly_limits(&selections, &catalog, 20);

        assert_eq!(outcome.limited[0].custom_days_per_month, Some(4));
        assert_eq!(outcome.warnings.len(), 1);
        let warning = &outcome.warnings[0];
        assert_eq!(warning.kind, WarningKind::OverLimit);
        assert_eq!(warning.severity, Severity::Info);
        assert!(warning.message.contains("requested 20"));
        assert!(warning.message.contains("clamped to 4"));
    }

    #[test]
    fn test_clamps_custom_request_to_cap() {
        let catalog = catalog(HashMap::new());
        let selections = vec![AdditionSelection {
            code: "capped".to_string(),
            enabled: true,
            custom_days_per_month: Some(10),
        }];

        let outcome = apply_monthly_limits(&selections, &catalog, 20);
        assert_eq!(outcome.limited[0].custom_days_per_month, Some(4));
    }

    #[test]
    fn test_request_within_cap_passes_through() {
        let catalog = catalog(HashMap::new());
        let selections = vec![AdditionSelection {
            code: "capped".to_string(),
            enabled: true,
            custom_days_per_month: Some(3),
        }];

        let outcome = apply_monthly_limits(&selections, &catalog, 20);
        assert_eq!(outcome.limited[0].custom_days_per_month, Some(3));
        assert!(outcome.warnings.is_empty());
    }

    #[test]
    fn test_override_table_takes_priority() {
        let mut overrides = HashMap::new();
        overrides.insert("overridden".to_string(), 2);
        let catalog = catalog(overrides);

        let selections = vec![AdditionSelection {
            code: "overridden".to_string(),
            enabled: true,
            custom_days_per_month: Some(5),
        }];

        // The addition's own cap is 6, but the override of 2 applies.
        let outcome = apply_monthly_limits(&selections, &catalog, 20);
        assert_eq!(outcome.limited[0].custom_days_per_month, Some(2));
    }

    #[test]
    fn test_uncapped_selection_passes_through() {
        let catalog = catalog(HashMap::new());
        let selections = vec![AdditionSelection::enabled("uncapped")];

        let outcome = apply_monthly_limits(&selections, &catalog, 20);
        assert_eq!(outcome.limited[0].custom_days_per_month, None);
        assert!(outcome.warnings.is_empty());
    }

    #[test]
    fn test_disabled_selection_not_clamped() {
        let catalog = catalog(HashMap::new());
        let selections = vec![AdditionSelection::disabled("capped")];

        let outcome = apply_monthly_limits(&selections, &catalog, 20);
        assert_eq!(outcome.limited[0].custom_days_per_month, None);
        assert!(outcome.warnings.is_empty());
    }

    #[test]
    fn test_clamp_never_increases_request() {
        let catalog = catalog(HashMap::new());
        for requested in [1u32, 4, 5, 30] {
            let selections = vec![AdditionSelection {
                code: "capped".to_string(),
                enabled: true,
                custom_days_per_month: Some(requested),
            }];
            let outcome = apply_monthly_limits(&selections, &catalog, 20);
            let effective = outcome.limited[0]
                .custom_days_per_month
                .unwrap_or(requested);
            assert!(effective <= requested);
            assert!(effective <= 4);
        }
    }
}
