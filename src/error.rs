//! Error types for the addition engine.
//!
//! This module provides strongly-typed errors using the `thiserror` crate
//! for all error conditions that can occur during rule evaluation and
//! monthly billing aggregation.

use chrono::NaiveDate;
use thiserror::Error;

/// The main error type for the addition engine.
///
/// All operations in the engine return this error type, making it easy
/// to handle errors consistently throughout the application.
///
/// # Example
///
/// ```
/// use addition_engine::error::EngineError;
///
/// let error = EngineError::CatalogNotFound {
///     path: "/missing/file.yaml".to_string(),
/// };
/// assert_eq!(error.to_string(), "Catalog file not found: /missing/file.yaml");
/// ```
#[derive(Debug, Error)]
pub enum EngineError {
    /// A catalog configuration file was not found at the specified path.
    #[error("Catalog file not found: {path}")]
    CatalogNotFound {
        /// The path that was not found.
        path: String,
    },

    /// A catalog configuration file could not be parsed.
    #[error("Failed to parse catalog file '{path}': {message}")]
    CatalogParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },

    /// An addition code was not found in the catalog.
    #[error("Addition not found: {code}")]
    AdditionNotFound {
        /// The addition code that was not found.
        code: String,
    },

    /// Two versions of the same addition have overlapping effective ranges.
    ///
    /// This is a data-integrity violation and is rejected when the catalog
    /// is loaded; version lookups themselves never fail.
    #[error(
        "Overlapping versions for addition '{addition_code}': range starting {first} overlaps range starting {second}"
    )]
    VersionOverlap {
        /// The addition whose versions overlap.
        addition_code: String,
        /// Effective-from date of the earlier version.
        first: NaiveDate,
        /// Effective-from date of the later version.
        second: NaiveDate,
    },

    /// A billing period string could not be parsed.
    #[error("Invalid billing period '{value}': expected YYYY-MM")]
    InvalidPeriod {
        /// The value that failed to parse.
        value: String,
    },

    /// No billable usage records exist for the requested facility and month.
    ///
    /// Billing generation fails as a whole on this condition; nothing is
    /// written.
    #[error("No billable usage records for facility '{facility_id}' in {period}")]
    NoUsageRecords {
        /// The facility whose billing was requested.
        facility_id: String,
        /// The requested period in YYYY-MM form.
        period: String,
    },

    /// The billing store reported a failure.
    #[error("Storage error: {message}")]
    Storage {
        /// A description of the storage failure.
        message: String,
    },

    /// A general calculation error occurred.
    #[error("Calculation error: {message}")]
    CalculationError {
        /// A description of the calculation error.
        message: String,
    },
}

/// A type alias for Results that return EngineError.
pub type EngineResult<T> = Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_not_found_displays_path() {
        let error = EngineError::CatalogNotFound {
            path: "/missing/file.yaml".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Catalog file not found: /missing/file.yaml"
        );
    }

    #[test]
    fn test_addition_not_found_displays_code() {
        let error = EngineError::AdditionNotFound {
            code: "unknown".to_string(),
        };
        assert_eq!(error.to_string(), "Addition not found: unknown");
    }

    #[test]
    fn test_catalog_parse_error_displays_path_and_message() {
        let error = EngineError::CatalogParseError {
            path: "/config/bad.yaml".to_string(),
            message: "invalid YAML syntax".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Failed to parse catalog file '/config/bad.yaml': invalid YAML syntax"
        );
    }

    #[test]
    fn test_version_overlap_displays_addition_and_ranges() {
        let error = EngineError::VersionOverlap {
            addition_code: "specialist_support".to_string(),
            first: NaiveDate::from_ymd_opt(2024, 4, 1).unwrap(),
            second: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
        };
        assert_eq!(
            error.to_string(),
            "Overlapping versions for addition 'specialist_support': range starting 2024-04-01 overlaps range starting 2024-06-01"
        );
    }

    #[test]
    fn test_invalid_period_displays_value() {
        let error = EngineError::InvalidPeriod {
            value: "2024/06".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Invalid billing period '2024/06': expected YYYY-MM"
        );
    }

    #[test]
    fn test_no_usage_records_displays_facility_and_period() {
        let error = EngineError::NoUsageRecords {
            facility_id: "fac_001".to_string(),
            period: "2024-06".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "No billable usage records for facility 'fac_001' in 2024-06"
        );
    }

    #[test]
    fn test_errors_implement_std_error() {
        fn assert_error<T: std::error::Error>() {}
        assert_error::<EngineError>();
    }

    #[test]
    fn test_error_propagation_with_question_mark() {
        fn returns_catalog_not_found() -> EngineResult<()> {
            Err(EngineError::CatalogNotFound {
                path: "/test".to_string(),
            })
        }

        fn propagates_error() -> EngineResult<()> {
            returns_catalog_not_found()?;
            Ok(())
        }

        assert!(propagates_error().is_err());
    }
}
