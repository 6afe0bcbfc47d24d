//! Selection assembly from facility settings and manual choices.
//!
//! Facility-preset additions are enabled once through a facility-level
//! application workflow and must never be toggled per calculation run;
//! monthly and daily additions follow the operator's manual selection.

use crate::models::{
    Addition, AdditionKind, AdditionSelection, FacilityAdditionSetting,
};

/// Additions partitioned by how they get enabled.
#[derive(Debug, Clone)]
pub struct CategorizedAdditions<'a> {
    /// Enabled via the facility-level application workflow.
    pub facility_preset: Vec<&'a Addition>,
    /// Toggled by the operator per calculation run.
    pub monthly: Vec<&'a Addition>,
    /// Derived automatically from daily usage records.
    pub daily: Vec<&'a Addition>,
}

/// Partitions a catalog snapshot by addition kind.
pub fn categorize_by_kind(additions: &[Addition]) -> CategorizedAdditions<'_> {
    let mut categorized = CategorizedAdditions {
        facility_preset: Vec::new(),
        monthly: Vec::new(),
        daily: Vec::new(),
    };
    for addition in additions {
        match addition.kind {
            AdditionKind::FacilityPreset => categorized.facility_preset.push(addition),
            AdditionKind::Monthly => categorized.monthly.push(addition),
            AdditionKind::Daily => categorized.daily.push(addition),
        }
    }
    categorized
}

/// Builds the effective selection set for a calculation run.
///
/// Facility-preset additions derive their enablement exclusively from
/// the facility's settings: only an enabled setting with `active` status
/// contributes, and any manual selection for such an addition is
/// discarded. Monthly and daily additions take the operator's manual
/// selection as-is. Output follows catalog order.
pub fn merge_with_facility_settings(
    manual_selections: &[AdditionSelection],
    additions: &[Addition],
    facility_settings: &[FacilityAdditionSetting],
) -> Vec<AdditionSelection> {
    let mut result: Vec<AdditionSelection> = Vec::new();

    for addition in additions {
        match addition.kind {
            AdditionKind::FacilityPreset => {
                let setting = facility_settings
                    .iter()
                    .find(|s| s.addition_code == addition.code);
                if let Some(setting) = setting {
                    if setting.is_enabled {
                        result.push(AdditionSelection {
                            code: addition.code.clone(),
                            enabled: setting.is_in_force(),
                            custom_days_per_month: None,
                        });
                    }
                }
            }
            AdditionKind::Monthly | AdditionKind::Daily => {
                if let Some(manual) = manual_selections.iter().find(|s| s.code == addition.code) {
                    result.push(manual.clone());
                }
            }
        }
    }

    result
}
