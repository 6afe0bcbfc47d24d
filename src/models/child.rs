//! Child model as consumed by the rules engine and billing aggregator.

use serde::{Deserialize, Serialize};

/// An enrolled child, reduced to the fields the engine evaluates.
///
/// `income_category` is a key into the configured income-tier ceiling
/// table; an unrecognized or missing category falls back to the
/// least-favorable tier during copay calculation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Child {
    /// Unique identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Recipient certificate number used in the submission file.
    #[serde(default)]
    pub beneficiary_number: Option<String>,
    /// Medical care needs score.
    #[serde(default)]
    pub medical_care_score: i32,
    /// Intensive behavior disorder score.
    #[serde(default)]
    pub behavior_disorder_score: i32,
    /// Care-needs classification code.
    #[serde(default)]
    pub care_needs_category: Option<String>,
    /// Whether the child is flagged as protected/at-risk.
    #[serde(default)]
    pub is_protected_child: bool,
    /// Guardian income category driving the monthly copay ceiling.
    #[serde(default)]
    pub income_category: Option<String>,
}
