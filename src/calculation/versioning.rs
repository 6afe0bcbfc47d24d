//! Temporal versioning of addition parameters.
//!
//! Law revisions change an addition's unit values, rates and requirements
//! on a given effective date without losing history. This module selects
//! the version effective on a target date and merges it over the base
//! catalog values.

use chrono::NaiveDate;

use crate::error::{EngineError, EngineResult};
use crate::models::{Addition, AdditionVersion};

/// Selects the version of an addition effective on the target date.
///
/// The effective version is the one with the greatest `effective_from`
/// at or before the target date whose `effective_to` is open or at/after
/// the target date. Returns `None` when no version covers the date, in
/// which case the addition's base fields apply.
///
/// Lookups never fail: overlapping ranges are rejected when the catalog
/// is written (see [`validate_versions`]), and a lookup over unvalidated
/// data simply returns the first match by `effective_from` descending.
///
/// # Example
///
/// ```
/// use addition_engine::calculation::effective_version;
/// use addition_engine::models::AdditionVersion;
/// use chrono::NaiveDate;
///
/// let versions = vec![AdditionVersion {
///     addition_code: "specialist_support".to_string(),
///     version_number: 2,
///     units: Some(123),
///     is_percentage: false,
///     percentage_rate: None,
///     requirements: None,
///     rules: vec![],
///     max_times_per_month: Some(4),
///     max_times_per_day: None,
///     effective_from: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
///     effective_to: None,
///     revision_id: None,
/// }];
///
/// let hit = effective_version(
///     &versions,
///     "specialist_support",
///     NaiveDate::from_ymd_opt(2024, 7, 1).unwrap(),
/// );
/// assert_eq!(hit.unwrap().units, Some(123));
///
/// let miss = effective_version(
///     &versions,
///     "specialist_support",
///     NaiveDate::from_ymd_opt(2024, 5, 31).unwrap(),
/// );
/// assert!(miss.is_none());
/// ```
pub fn effective_version<'a>(
    versions: &'a [AdditionVersion],
    addition_code: &str,
    target: NaiveDate,
) -> Option<&'a AdditionVersion> {
    let mut candidates: Vec<&AdditionVersion> = versions
        .iter()
        .filter(|v| {
            v.addition_code == addition_code
                && v.effective_from <= target
                && v.effective_to.is_none_or(|to| to >= target)
        })
        .collect();
    candidates.sort_by(|a, b| b.effective_from.cmp(&a.effective_from));
    candidates.into_iter().next()
}

/// Returns a catalog snapshot where every addition carries the field
/// values of its version effective on the target date.
///
/// All versioned fields overwrite the base values directly, except
/// `max_times_per_day`, which falls back to the base value when the
/// version omits it.
pub fn merge_additions_with_versions(
    additions: &[Addition],
    versions: &[AdditionVersion],
    target: NaiveDate,
) -> Vec<Addition> {
    additions
        .iter()
        .map(|addition| {
            let Some(version) = effective_version(versions, &addition.code, target) else {
                return addition.clone();
            };

            let mut merged = addition.clone();
            merged.units = version.units;
            merged.is_percentage = version.is_percentage;
            merged.percentage_rate = version.percentage_rate;
            merged.requirements = version.requirements.clone();
            merged.rules = version.rules.clone();
            merged.max_times_per_month = version.max_times_per_month;
            merged.max_times_per_day = version
                .max_times_per_day
                .unwrap_or(addition.max_times_per_day);
            merged
        })
        .collect()
}

/// Rejects version sets that violate the non-overlap invariant.
///
/// For each addition, effective ranges must not overlap: at most one
/// version may be effective on any calendar date. Also rejects versions
/// referencing addition codes absent from the catalog. Called when the
/// catalog is assembled, so reads stay infallible.
pub fn validate_versions(
    additions: &[Addition],
    versions: &[AdditionVersion],
) -> EngineResult<()> {
    for version in versions {
        if !additions.iter().any(|a| a.code == version.addition_code) {
            return Err(EngineError::AdditionNotFound {
                code: version.addition_code.clone(),
            });
        }
    }

    let mut codes: Vec<&str> = versions.iter().map(|v| v.addition_code.as_str()).collect();
    codes.sort_unstable();
    codes.dedup();

    for code in codes {
        let mut ranges: Vec<&AdditionVersion> = versions
            .iter()
            .filter(|v| v.addition_code == code)
            .collect();
        ranges.sort_by_key(|v| v.effective_from);

        for pair in ranges.windows(2) {
            let earlier = pair[0];
            let later = pair[1];
            let overlaps = match earlier.effective_to {
                // An open-ended earlier range overlaps anything after it.
                None => true,
                Some(to) => to >= later.effective_from,
            };
            if overlaps {
                return Err(EngineError::VersionOverlap {
                    addition_code: code.to_string(),
                    first: earlier.effective_from,
                    second: later.effective_from,
                });
            }
        }
    }

    Ok(())
}
