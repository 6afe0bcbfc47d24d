//! Configuration types for the rule catalog and billing parameters.
//!
//! This module contains the strongly-typed configuration structures that
//! are deserialized from YAML configuration files, and the immutable
//! [`RuleCatalog`] snapshot the calculation functions receive.

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::Deserialize;

use crate::calculation::validate_versions;
use crate::error::{EngineError, EngineResult};
use crate::models::{Addition, AdditionVersion, LawRevision, ServiceType};

/// Metadata about the loaded addition schedule.
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogMetadata {
    /// Schedule code (e.g. `"R6-HDS"`).
    pub code: String,
    /// Human-readable name of the schedule.
    pub name: String,
    /// The version or effective date of the schedule.
    pub version: String,
    /// URL to the official source documentation.
    pub source_url: String,
}

/// A named set of mutually-exclusive addition codes.
///
/// Declaration order doubles as the tie-break order when two group
/// members carry the same unit value.
#[derive(Debug, Clone, Deserialize)]
pub struct ExclusiveGroup {
    /// Group name (e.g. `"staff_allocation"`).
    pub name: String,
    /// Member addition codes, in catalog order.
    pub codes: Vec<String>,
}

/// Additions configuration file structure (`additions.yaml`).
#[derive(Debug, Clone, Deserialize)]
pub struct AdditionsFile {
    /// The addition master list.
    pub additions: Vec<Addition>,
    /// Mutual-exclusivity groups.
    #[serde(default)]
    pub exclusive_groups: Vec<ExclusiveGroup>,
    /// Per-code monthly cap overrides; takes priority over an addition's
    /// own `max_times_per_month`.
    #[serde(default)]
    pub monthly_limit_overrides: HashMap<String, u32>,
}

/// Revision file structure (`revisions/*.yaml`).
#[derive(Debug, Clone, Deserialize)]
pub struct RevisionFile {
    /// The law revision the file describes.
    pub revision: LawRevision,
    /// The addition versions introduced by the revision.
    #[serde(default)]
    pub versions: Vec<AdditionVersion>,
}

/// What a service code represents in the billing code table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceCodeCategory {
    /// A base service reward code.
    Base,
    /// A pickup/dropoff transport code.
    Transport,
    /// The absence-response code.
    Absence,
    /// A per-day addition code matched against free-form addon names.
    Addition,
}

/// One entry of the government service-code table.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceCode {
    /// The statutory service code.
    pub code: String,
    /// Display name.
    pub name: String,
    /// What the code represents.
    pub category: ServiceCodeCategory,
    /// Unit value of the code.
    pub base_units: i64,
}

/// Transport service codes by leg count.
#[derive(Debug, Clone, Deserialize)]
pub struct TransportCodes {
    /// Code billed when exactly one of pickup/dropoff happened.
    pub one_way: String,
    /// Code billed when both pickup and dropoff happened.
    pub round_trip: String,
}

/// Billing parameters loaded from `billing.yaml`.
#[derive(Debug, Clone, Deserialize)]
pub struct BillingConfig {
    unit_price: Decimal,
    fallback_tier: String,
    income_tiers: HashMap<String, i64>,
    base_codes: HashMap<ServiceType, String>,
    transport_codes: TransportCodes,
    absence_code: String,
    service_codes: Vec<ServiceCode>,
}

impl BillingConfig {
    /// Yen value of one unit.
    pub fn unit_price(&self) -> Decimal {
        self.unit_price
    }

    /// Returns true if the income category exists in the tier table.
    pub fn is_known_tier(&self, category: &str) -> bool {
        self.income_tiers.contains_key(category)
    }

    /// Monthly copay ceiling for an income category.
    ///
    /// Unknown or missing categories fall back to the configured
    /// least-favorable tier rather than silently charging zero.
    pub fn ceiling_for(&self, category: Option<&str>) -> i64 {
        category
            .and_then(|c| self.income_tiers.get(c))
            .copied()
            .unwrap_or_else(|| self.fallback_ceiling())
    }

    /// Ceiling of the configured fallback tier.
    pub fn fallback_ceiling(&self) -> i64 {
        // fallback_tier membership is validated at load time
        self.income_tiers
            .get(&self.fallback_tier)
            .copied()
            .unwrap_or(0)
    }

    /// Looks up a service code entry.
    pub fn service_code(&self, code: &str) -> Option<&ServiceCode> {
        self.service_codes.iter().find(|sc| sc.code == code)
    }

    /// The base reward code for a service type.
    pub fn base_code_for(&self, service_type: ServiceType) -> EngineResult<&ServiceCode> {
        let code = self
            .base_codes
            .get(&service_type)
            .ok_or_else(|| EngineError::CalculationError {
                message: format!("no base service code configured for {service_type:?}"),
            })?;
        self.require_code(code)
    }

    /// The one-way transport code.
    pub fn one_way_code(&self) -> EngineResult<&ServiceCode> {
        self.require_code(&self.transport_codes.one_way)
    }

    /// The round-trip transport code.
    pub fn round_trip_code(&self) -> EngineResult<&ServiceCode> {
        self.require_code(&self.transport_codes.round_trip)
    }

    /// The absence-response code.
    pub fn absence_code(&self) -> EngineResult<&ServiceCode> {
        self.require_code(&self.absence_code)
    }

    /// Matches a free-form addon name against the addition-category
    /// service codes (substring match on the code name).
    pub fn match_addon(&self, addon_name: &str) -> Option<&ServiceCode> {
        self.service_codes
            .iter()
            .find(|sc| sc.category == ServiceCodeCategory::Addition && sc.name.contains(addon_name))
    }

    fn require_code(&self, code: &str) -> EngineResult<&ServiceCode> {
        self.service_code(code)
            .ok_or_else(|| EngineError::CalculationError {
                message: format!("service code '{code}' missing from the service code table"),
            })
    }

    /// Checks internal consistency: the fallback tier and every
    /// configured well-known code must exist.
    pub fn validate(&self) -> EngineResult<()> {
        if !self.income_tiers.contains_key(&self.fallback_tier) {
            return Err(EngineError::CatalogParseError {
                path: "billing.yaml".to_string(),
                message: format!("fallback tier '{}' not in income_tiers", self.fallback_tier),
            });
        }
        for service_type in [
            ServiceType::ChildDevelopmentSupport,
            ServiceType::AfterSchoolDayService,
        ] {
            self.base_code_for(service_type)
                .map_err(|e| EngineError::CatalogParseError {
                    path: "billing.yaml".to_string(),
                    message: e.to_string(),
                })?;
        }
        for code in [
            &self.transport_codes.one_way,
            &self.transport_codes.round_trip,
            &self.absence_code,
        ] {
            self.require_code(code)
                .map_err(|e| EngineError::CatalogParseError {
                    path: "billing.yaml".to_string(),
                    message: e.to_string(),
                })?;
        }
        Ok(())
    }
}

/// The complete rule catalog loaded from a configuration directory.
///
/// Calculation functions receive this as an explicitly-passed immutable
/// snapshot; there is no ambient global catalog state.
#[derive(Debug, Clone)]
pub struct RuleCatalog {
    metadata: CatalogMetadata,
    additions: Vec<Addition>,
    exclusive_groups: Vec<ExclusiveGroup>,
    monthly_limit_overrides: HashMap<String, u32>,
    versions: Vec<AdditionVersion>,
    revisions: Vec<LawRevision>,
}

impl RuleCatalog {
    /// Assembles a catalog from its component parts, rejecting
    /// data-integrity violations.
    ///
    /// # Errors
    ///
    /// - A version or exclusivity group references an unknown addition
    ///   code.
    /// - Two versions of the same addition have overlapping effective
    ///   ranges.
    pub fn new(
        metadata: CatalogMetadata,
        additions: Vec<Addition>,
        exclusive_groups: Vec<ExclusiveGroup>,
        monthly_limit_overrides: HashMap<String, u32>,
        versions: Vec<AdditionVersion>,
        revisions: Vec<LawRevision>,
    ) -> EngineResult<Self> {
        for group in &exclusive_groups {
            for code in &group.codes {
                if !additions.iter().any(|a| &a.code == code) {
                    return Err(EngineError::AdditionNotFound { code: code.clone() });
                }
            }
        }
        validate_versions(&additions, &versions)?;

        Ok(Self {
            metadata,
            additions,
            exclusive_groups,
            monthly_limit_overrides,
            versions,
            revisions,
        })
    }

    /// Returns the catalog metadata.
    pub fn metadata(&self) -> &CatalogMetadata {
        &self.metadata
    }

    /// Returns the addition master list in catalog order.
    pub fn additions(&self) -> &[Addition] {
        &self.additions
    }

    /// Finds an addition by code.
    pub fn find_addition(&self, code: &str) -> Option<&Addition> {
        self.additions.iter().find(|a| a.code == code)
    }

    /// Returns the mutual-exclusivity groups.
    pub fn exclusive_groups(&self) -> &[ExclusiveGroup] {
        &self.exclusive_groups
    }

    /// Returns the monthly cap override for a code, if any.
    pub fn monthly_limit_override(&self, code: &str) -> Option<u32> {
        self.monthly_limit_overrides.get(code).copied()
    }

    /// The effective monthly cap for an addition: the override table
    /// takes priority over the addition's own value.
    pub fn effective_monthly_cap(&self, addition: &Addition) -> Option<u32> {
        self.monthly_limit_override(&addition.code)
            .or(addition.max_times_per_month)
    }

    /// Returns all addition versions.
    pub fn versions(&self) -> &[AdditionVersion] {
        &self.versions
    }

    /// Returns all law revisions.
    pub fn revisions(&self) -> &[LawRevision] {
        &self.revisions
    }

    /// Returns a catalog whose additions carry the field values effective
    /// on the target date (see `calculation::versioning`).
    pub fn snapshot_at(&self, date: chrono::NaiveDate) -> RuleCatalog {
        let merged = crate::calculation::merge_additions_with_versions(
            &self.additions,
            &self.versions,
            date,
        );
        RuleCatalog {
            metadata: self.metadata.clone(),
            additions: merged,
            exclusive_groups: self.exclusive_groups.clone(),
            monthly_limit_overrides: self.monthly_limit_overrides.clone(),
            versions: self.versions.clone(),
            revisions: self.revisions.clone(),
        }
    }
}
