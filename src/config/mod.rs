//! Configuration loading and catalog snapshots.
//!
//! The rule catalog (additions, exclusivity groups, cap overrides, law
//! revisions) and the billing parameters (unit price, income tiers,
//! service codes) are loaded from YAML files and handed to the engine as
//! immutable snapshots.

mod loader;
mod types;

pub use loader::ConfigLoader;
pub use types::{
    AdditionsFile, BillingConfig, CatalogMetadata, ExclusiveGroup, RevisionFile, RuleCatalog,
    ServiceCode, ServiceCodeCategory, TransportCodes,
};
