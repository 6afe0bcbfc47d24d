//! Monthly billing aggregation, storage contract and export.
//!
//! Unlike the pure calculation functions, the aggregator performs a
//! non-atomic delete-then-insert against shared storage per
//! (facility, month) key; callers must serialize `generate` calls per
//! key. Within a process the `&mut` store borrow enforces that.

mod aggregator;
mod export;
mod store;

pub use aggregator::{
    BillingAggregator, ChildBillingError, GenerationOutcome, calculate_copay, infer_service_type,
};
pub use export::{FacilityInfo, render_submission_csv};
pub use store::{BillingStore, InMemoryBillingStore};
