//! Eligibility checking against staffing and child attributes.
//!
//! Each addition carries machine-checkable requirement rules. Failures
//! never abort a calculation; they surface as `requirement_not_met`
//! warnings whose severity tells the presentation layer whether the
//! selection may be submitted.

use crate::config::RuleCatalog;
use crate::models::{
    AdditionSelection, Child, RequirementRule, Severity, Staff, Warning, WarningKind,
};

use super::staffing::{calculate_fte, count_experienced_staff, count_qualified_staff};

/// Evaluates every enabled selection's requirement rules.
///
/// Staffing gates (experience/FTE, qualifications) fail with severity
/// `error`; population gates (behavior score, protected child) fail with
/// severity `warning`. Passing rules are silent.
pub fn check_requirements(
    selections: &[AdditionSelection],
    catalog: &RuleCatalog,
    staff: &[Staff],
    children: &[Child],
) -> Vec<Warning> {
    let mut warnings: Vec<Warning> = Vec::new();
    let fte = calculate_fte(staff);

    for selection in selections {
        if !selection.enabled {
            continue;
        }
        let Some(addition) = catalog.find_addition(&selection.code) else {
            continue;
        };

        for rule in &addition.rules {
            match rule {
                RequirementRule::ExperiencedStaff { min_years, min_fte } => {
                    if count_experienced_staff(staff, *min_years) == 0 {
                        warnings.push(warning(
                            addition,
                            format!("no staff with at least {min_years} years of experience"),
                            Severity::Error,
                        ));
                    }
                    if fte < *min_fte {
                        warnings.push(warning(
                            addition,
                            format!(
                                "full-time equivalent {} (at least {} required)",
                                fte.round_dp(1),
                                min_fte
                            ),
                            Severity::Error,
                        ));
                    }
                }
                RequirementRule::QualifiedStaff { qualifications } => {
                    if count_qualified_staff(staff, qualifications) == 0 {
                        warnings.push(warning(
                            addition,
                            "no active staff holding a qualifying specialist qualification"
                                .to_string(),
                            Severity::Error,
                        ));
                    }
                }
                RequirementRule::BehaviorScoreAtLeast { threshold } => {
                    let eligible = children
                        .iter()
                        .any(|c| c.behavior_disorder_score >= *threshold);
                    if !eligible {
                        warnings.push(warning(
                            addition,
                            format!("no child with a behavior disorder score of {threshold} or higher"),
                            Severity::Warning,
                        ));
                    }
                }
                RequirementRule::ProtectedChild => {
                    if !children.iter().any(|c| c.is_protected_child) {
                        warnings.push(warning(
                            addition,
                            "no protected or at-risk child enrolled".to_string(),
                            Severity::Warning,
                        ));
                    }
                }
            }
        }
    }

    warnings
}

fn warning(addition: &crate::models::Addition, message: String, severity: Severity) -> Warning {
    Warning {
        kind: WarningKind::RequirementNotMet,
        addition_code: addition.code.clone(),
        addition_name: addition.name.clone(),
        message,
        severity,
    }
}
