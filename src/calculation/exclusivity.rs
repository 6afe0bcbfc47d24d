//! Mutual-exclusivity resolution.
//!
//! Several addition families (staff allocation tiers, treatment
//! improvement tiers, extended support tiers, ...) allow at most one
//! member to be billed at a time. This module demotes all but the
//! highest-value member of each group.

use crate::config::RuleCatalog;
use crate::models::{AdditionSelection, Severity, Warning, WarningKind};

/// The result of resolving exclusivity groups over a selection set.
#[derive(Debug, Clone)]
pub struct ExclusivityOutcome {
    /// The selections with losing group members forced to disabled.
    pub resolved: Vec<AdditionSelection>,
    /// One `exclusive_conflict` warning per demoted selection.
    pub conflicts: Vec<Warning>,
}

/// Resolves each configured exclusivity group to at most one enabled
/// member.
///
/// Within a group, the enabled selection with the highest unit value is
/// retained; ties break by catalog order (the first group member wins).
/// Every other enabled member is forced to `enabled = false` and reported
/// with an `exclusive_conflict` warning naming both the demoted and the
/// retained addition. Groups with at most one enabled member pass through
/// untouched.
///
/// The operation is idempotent: resolving an already-resolved selection
/// set produces no further changes.
pub fn resolve_exclusive_groups(
    selections: &[AdditionSelection],
    catalog: &RuleCatalog,
) -> ExclusivityOutcome {
    let mut resolved: Vec<AdditionSelection> = selections.to_vec();
    let mut conflicts: Vec<Warning> = Vec::new();

    for group in catalog.exclusive_groups() {
        // Enabled members of this group, in group declaration order.
        let enabled_in_group: Vec<&str> = group
            .codes
            .iter()
            .filter(|code| {
                selections
                    .iter()
                    .any(|s| s.enabled && &s.code == code.as_str())
            })
            .map(|code| code.as_str())
            .collect();

        if enabled_in_group.len() <= 1 {
            continue;
        }

        let mut winner = enabled_in_group[0];
        let mut winner_units = units_of(catalog, winner);
        for &code in &enabled_in_group[1..] {
            let units = units_of(catalog, code);
            if units > winner_units {
                winner = code;
                winner_units = units;
            }
        }

        let winner_name = addition_name(catalog, winner);
        for &code in &enabled_in_group {
            if code == winner {
                continue;
            }
            if let Some(selection) = resolved.iter_mut().find(|s| s.code == code) {
                selection.enabled = false;
            }
            let demoted_name = addition_name(catalog, code);
            conflicts.push(Warning {
                kind: WarningKind::ExclusiveConflict,
                addition_code: code.to_string(),
                addition_name: demoted_name.clone(),
                message: format!("{demoted_name} cannot be claimed together with {winner_name}"),
                severity: Severity::Warning,
            });
        }
    }

    ExclusivityOutcome {
        resolved,
        conflicts,
    }
}

fn units_of(catalog: &RuleCatalog, code: &str) -> i64 {
    catalog
        .find_addition(code)
        .and_then(|a| a.units)
        .unwrap_or(0)
}

fn addition_name(catalog: &RuleCatalog, code: &str) -> String {
    catalog
        .find_addition(code)
        .map(|a| a.name.clone())
        .unwrap_or_else(|| code.to_string())
}
