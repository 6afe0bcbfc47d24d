//! Storage contract for monthly billing aggregation.
//!
//! The engine only specifies the reads and writes it needs; persistence
//! mechanics live behind the [`BillingStore`] trait. Write methods take
//! `&mut self`, so a single store instance can never run two generation
//! passes concurrently; callers wanting cross-process safety must
//! serialize per (facility, month) themselves.

use uuid::Uuid;

use crate::error::{EngineError, EngineResult};
use crate::models::{
    BillingDetail, BillingRecord, BillingStatus, Child, UsageRecord, YearMonth,
};

/// The reads and writes the monthly billing aggregator requires.
pub trait BillingStore {
    /// Billing-target usage records for a facility and month.
    fn usage_records(
        &self,
        facility_id: &str,
        period: YearMonth,
    ) -> EngineResult<Vec<UsageRecord>>;

    /// Child master rows for the given ids. Unknown ids are simply
    /// absent from the result.
    fn children(&self, ids: &[String]) -> EngineResult<Vec<Child>>;

    /// All billing records for a facility and month, any status.
    fn billing_records(
        &self,
        facility_id: &str,
        period: YearMonth,
    ) -> EngineResult<Vec<BillingRecord>>;

    /// Detail lines of one billing record, ordered by service date.
    fn billing_details(&self, billing_record_id: Uuid) -> EngineResult<Vec<BillingDetail>>;

    /// Deletes draft records (and their details) for a facility and
    /// month. Confirmed and submitted records must never be touched.
    /// Returns the number of records deleted.
    fn delete_draft_records(
        &mut self,
        facility_id: &str,
        period: YearMonth,
    ) -> EngineResult<usize>;

    /// Inserts one billing record together with its detail lines.
    fn insert_billing(
        &mut self,
        record: BillingRecord,
        details: Vec<BillingDetail>,
    ) -> EngineResult<()>;

    /// Transitions all draft records for a facility and month to
    /// confirmed. Returns the number of records transitioned; zero is
    /// not an error.
    fn confirm_drafts(&mut self, facility_id: &str, period: YearMonth) -> EngineResult<usize>;
}

/// An in-memory [`BillingStore`] used by tests and the bundled HTTP
/// state.
#[derive(Debug, Default)]
pub struct InMemoryBillingStore {
    usage: Vec<UsageRecord>,
    children: Vec<Child>,
    records: Vec<BillingRecord>,
    details: Vec<BillingDetail>,
}

impl InMemoryBillingStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a usage record.
    pub fn add_usage_record(&mut self, record: UsageRecord) {
        self.usage.push(record);
    }

    /// Inserts or replaces a child master row.
    pub fn upsert_child(&mut self, child: Child) {
        if let Some(existing) = self.children.iter_mut().find(|c| c.id == child.id) {
            *existing = child;
        } else {
            self.children.push(child);
        }
    }

    /// Number of usage records held, mainly for test assertions.
    pub fn usage_len(&self) -> usize {
        self.usage.len()
    }
}

impl BillingStore for InMemoryBillingStore {
    fn usage_records(
        &self,
        facility_id: &str,
        period: YearMonth,
    ) -> EngineResult<Vec<UsageRecord>> {
        Ok(self
            .usage
            .iter()
            .filter(|u| {
                u.facility_id == facility_id && period.contains(u.date) && u.billing_target
            })
            .cloned()
            .collect())
    }

    fn children(&self, ids: &[String]) -> EngineResult<Vec<Child>> {
        Ok(self
            .children
            .iter()
            .filter(|c| ids.contains(&c.id))
            .cloned()
            .collect())
    }

    fn billing_records(
        &self,
        facility_id: &str,
        period: YearMonth,
    ) -> EngineResult<Vec<BillingRecord>> {
        Ok(self
            .records
            .iter()
            .filter(|r| r.facility_id == facility_id && r.year_month == period)
            .cloned()
            .collect())
    }

    fn billing_details(&self, billing_record_id: Uuid) -> EngineResult<Vec<BillingDetail>> {
        let mut details: Vec<BillingDetail> = self
            .details
            .iter()
            .filter(|d| d.billing_record_id == billing_record_id)
            .cloned()
            .collect();
        details.sort_by_key(|d| d.service_date);
        Ok(details)
    }

    fn delete_draft_records(
        &mut self,
        facility_id: &str,
        period: YearMonth,
    ) -> EngineResult<usize> {
        let doomed: Vec<Uuid> = self
            .records
            .iter()
            .filter(|r| {
                r.facility_id == facility_id
                    && r.year_month == period
                    && r.status == BillingStatus::Draft
            })
            .map(|r| r.id)
            .collect();

        self.records.retain(|r| !doomed.contains(&r.id));
        self.details
            .retain(|d| !doomed.contains(&d.billing_record_id));
        Ok(doomed.len())
    }

    fn insert_billing(
        &mut self,
        record: BillingRecord,
        details: Vec<BillingDetail>,
    ) -> EngineResult<()> {
        if self.records.iter().any(|r| r.id == record.id) {
            return Err(EngineError::Storage {
                message: format!("billing record {} already exists", record.id),
            });
        }
        self.records.push(record);
        self.details.extend(details);
        Ok(())
    }

    fn confirm_drafts(&mut self, facility_id: &str, period: YearMonth) -> EngineResult<usize> {
        let now = chrono::Utc::now();
        let mut confirmed = 0;
        for record in self.records.iter_mut().filter(|r| {
            r.facility_id == facility_id
                && r.year_month == period
                && r.status == BillingStatus::Draft
        }) {
            record.status = BillingStatus::Confirmed;
            record.updated_at = now;
            confirmed += 1;
        }
        Ok(confirmed)
    }
}
