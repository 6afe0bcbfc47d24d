//! Staff model as consumed by the rules engine.
//!
//! Only the attributes that eligibility checks and suggestions need are
//! modeled here; full HR data lives outside the engine boundary.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Employment arrangement of a staff member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmploymentType {
    /// Full-time employment (standard 40-hour week).
    FullTime,
    /// Part-time employment.
    PartTime,
}

fn default_true() -> bool {
    true
}

/// A staff member, reduced to the fields the engine evaluates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Staff {
    /// Unique identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Qualification codes held (e.g. `"PT"`, `"保育士"`).
    #[serde(default)]
    pub qualifications: Vec<String>,
    /// Years of relevant experience.
    #[serde(default)]
    pub years_of_experience: u32,
    /// Employment arrangement.
    pub employment_type: EmploymentType,
    /// Contracted weekly hours; when absent, defaulted from the
    /// employment type (40 full-time / 20 part-time).
    #[serde(default)]
    pub weekly_hours: Option<Decimal>,
    /// Whether the staff member is currently active. Inactive staff are
    /// ignored by all staffing computations.
    #[serde(default = "default_true")]
    pub is_active: bool,
}

impl Staff {
    /// Returns true if the staff member holds any of the given
    /// qualifications.
    pub fn holds_any(&self, qualifications: &[String]) -> bool {
        self.qualifications
            .iter()
            .any(|q| qualifications.contains(q))
    }
}
