//! Ephemeral addition selection input.

use serde::{Deserialize, Serialize};

/// The operator's choice for one addition in a calculation run.
///
/// `custom_days_per_month` overrides the default assumption that a
/// selected addition applies on every business day; the period-limit
/// enforcer clamps it to the addition's legal cap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdditionSelection {
    /// Code of the selected addition.
    pub code: String,
    /// Whether the addition is switched on.
    pub enabled: bool,
    /// Requested occurrences per month, when different from the number of
    /// business days.
    #[serde(default)]
    pub custom_days_per_month: Option<u32>,
}

impl AdditionSelection {
    /// Convenience constructor for an enabled selection with no override.
    pub fn enabled(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            enabled: true,
            custom_days_per_month: None,
        }
    }

    /// Convenience constructor for a disabled selection.
    pub fn disabled(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            enabled: false,
            custom_days_per_month: None,
        }
    }
}
