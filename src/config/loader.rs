//! Configuration loading functionality.
//!
//! This module provides the [`ConfigLoader`] type for loading the rule
//! catalog and billing parameters from YAML files.

use std::fs;
use std::path::Path;

use crate::error::{EngineError, EngineResult};

use super::types::{AdditionsFile, BillingConfig, CatalogMetadata, RevisionFile, RuleCatalog};

/// Loads and provides access to the rule catalog and billing parameters.
///
/// # Directory Structure
///
/// The configuration directory should have the following structure:
/// ```text
/// config/r6/
/// ├── catalog.yaml         # Schedule metadata
/// ├── additions.yaml       # Addition master, exclusivity groups, cap overrides
/// ├── billing.yaml         # Unit price, income tiers, service codes
/// └── revisions/
///     └── 2024-06-01.yaml  # Law revision + addition versions
/// ```
///
/// # Example
///
/// ```no_run
/// use addition_engine::config::ConfigLoader;
///
/// let loader = ConfigLoader::load("./config/r6").unwrap();
/// let addition = loader.catalog().find_addition("specialist_support").unwrap();
/// println!("{}: {:?} units", addition.name, addition.units);
/// ```
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    catalog: RuleCatalog,
    billing: BillingConfig,
}

impl ConfigLoader {
    /// Loads configuration from the specified directory.
    ///
    /// # Errors
    ///
    /// Returns an error if a required file is missing, a file contains
    /// invalid YAML, or the catalog fails its data-integrity checks
    /// (unknown codes, overlapping versions, inconsistent billing codes).
    pub fn load<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let path = path.as_ref();

        let metadata = Self::load_yaml::<CatalogMetadata>(&path.join("catalog.yaml"))?;
        let additions_file = Self::load_yaml::<AdditionsFile>(&path.join("additions.yaml"))?;
        let billing = Self::load_yaml::<BillingConfig>(&path.join("billing.yaml"))?;
        billing.validate()?;

        let (versions, revisions) = Self::load_revisions(&path.join("revisions"))?;

        let catalog = RuleCatalog::new(
            metadata,
            additions_file.additions,
            additions_file.exclusive_groups,
            additions_file.monthly_limit_overrides,
            versions,
            revisions,
        )?;

        Ok(Self { catalog, billing })
    }

    /// Loads and parses a YAML file.
    fn load_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> EngineResult<T> {
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| EngineError::CatalogNotFound {
            path: path_str.clone(),
        })?;

        serde_yaml::from_str(&content).map_err(|e| EngineError::CatalogParseError {
            path: path_str,
            message: e.to_string(),
        })
    }

    /// Loads all revision files from the revisions directory.
    ///
    /// A missing directory is not an error: the catalog simply carries no
    /// versions and base values apply everywhere.
    fn load_revisions(
        revisions_dir: &Path,
    ) -> EngineResult<(
        Vec<crate::models::AdditionVersion>,
        Vec<crate::models::LawRevision>,
    )> {
        let mut versions = Vec::new();
        let mut revisions = Vec::new();

        if !revisions_dir.exists() {
            return Ok((versions, revisions));
        }

        let dir_str = revisions_dir.display().to_string();
        let entries = fs::read_dir(revisions_dir).map_err(|_| EngineError::CatalogNotFound {
            path: dir_str.clone(),
        })?;

        // Sort by file name so load order is deterministic.
        let mut paths: Vec<_> = entries
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| p.extension().is_some_and(|ext| ext == "yaml"))
            .collect();
        paths.sort();

        for path in paths {
            let file = Self::load_yaml::<RevisionFile>(&path)?;
            let revision_id = file.revision.id.clone();
            revisions.push(file.revision);
            for mut version in file.versions {
                version.revision_id.get_or_insert_with(|| revision_id.clone());
                versions.push(version);
            }
        }

        Ok((versions, revisions))
    }

    /// Returns the rule catalog.
    pub fn catalog(&self) -> &RuleCatalog {
        &self.catalog
    }

    /// Returns the billing parameters.
    pub fn billing(&self) -> &BillingConfig {
        &self.billing
    }
}
