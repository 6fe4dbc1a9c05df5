//! Rate ledger: admission control backed by the campaign log store
//!
//! The ledger owns the in-memory view of the day/week counters and is the only
//! writer to the log store within a process. Every admission check re-reads the
//! persisted counters first so sends made by another instance are honoured.

use std::sync::Arc;

use shared::{process_debug, process_info, process_warn, OutreachRecord, OutreachStatus, ProcessId};
use tokio::sync::Mutex;

use crate::core::{week_start, RateLimits, RateStats, RateWindowCounters};
use crate::error::{OutreachError, OutreachResult};
use crate::traits::{CampaignLogStore, Clock};

pub struct RateLedger {
    limits: RateLimits,
    store: Arc<dyn CampaignLogStore>,
    clock: Arc<dyn Clock>,
    /// Held across store writes to keep a single writer per process
    counters: Mutex<RateWindowCounters>,
}

impl RateLedger {
    /// Load history from `store` and build the ledger
    ///
    /// Persisted counters are checked against a replay of the records; the
    /// replay wins when they disagree.
    pub async fn open(
        store: Arc<dyn CampaignLogStore>,
        clock: Arc<dyn Clock>,
        limits: RateLimits,
    ) -> OutreachResult<Self> {
        let mut snapshot = store.load().await?;
        if snapshot.reconcile() {
            process_warn!(
                ProcessId::current(),
                "⚠️ Persisted rate counters disagree with {} logged records; rebuilt from records",
                snapshot.records.len()
            );
        }

        process_debug!(
            ProcessId::current(),
            "📒 Rate ledger loaded: {} records, limits {}/day {}/week",
            snapshot.records.len(),
            limits.daily_limit,
            limits.weekly_limit
        );

        Ok(Self {
            limits,
            store,
            clock,
            counters: Mutex::new(snapshot.counters),
        })
    }

    pub fn limits(&self) -> RateLimits {
        self.limits
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    /// Whether one more send fits in today's and this week's budget
    pub async fn can_send(&self) -> OutreachResult<bool> {
        let mut counters = self.counters.lock().await;
        let mut fresh = self.store.counters().await?;
        fresh.keep_reset_marker(&counters);
        *counters = fresh;

        let today = self.clock.today();
        if counters.roll_day(today) {
            process_debug!(ProcessId::current(), "🌅 New rate window day: {}", today);
        }

        let admitted = counters.admits(today, &self.limits);
        if !admitted {
            process_info!(
                ProcessId::current(),
                "⛔ Rate limit reached: {}/{} today, {}/{} this week",
                counters.daily_count(today),
                self.limits.daily_limit,
                counters.weekly_count(week_start(today)),
                self.limits.weekly_limit
            );
        }
        Ok(admitted)
    }

    /// Persist a successful send and count it
    pub async fn record_sent(&self, record: OutreachRecord) -> OutreachResult<()> {
        if !record.is_sent() {
            return Err(OutreachError::storage(
                "record_sent",
                format!("record for {} has status {}", record.contact(), record.status),
            ));
        }
        self.record(record).await
    }

    /// Persist any attempted send; only `Sent` records move the counters
    pub async fn record(&self, record: OutreachRecord) -> OutreachResult<()> {
        let mut counters = self.counters.lock().await;
        let status = record.status;
        let contact = record.contact().to_string();

        let mut fresh = self.store.append(record).await?;
        fresh.keep_reset_marker(&counters);
        *counters = fresh;

        process_debug!(
            ProcessId::current(),
            "📝 Logged {} outreach to {} ({} sent today)",
            status,
            contact,
            counters.daily_count(self.clock.today())
        );
        Ok(())
    }

    /// Build a record stamped with the ledger clock and persist it
    pub async fn record_attempt(
        &self,
        company: &str,
        person_id: Option<&str>,
        name: &str,
        status: OutreachStatus,
    ) -> OutreachResult<()> {
        let mut record = OutreachRecord::new(company, self.clock.now(), status).with_name(name);
        if let Some(id) = person_id {
            record = record.with_person_id(id);
        }
        self.record(record).await
    }

    /// Snapshot for reporting, read fresh from the store
    pub async fn stats(&self) -> OutreachResult<RateStats> {
        let snapshot = self.store.load().await?;
        let mut counters = snapshot.counters;
        let today = self.clock.today();
        counters.roll_day(today);
        Ok(RateStats::compute(&counters, snapshot.records.len(), today, &self.limits))
    }

    pub async fn daily_count(&self) -> u32 {
        self.counters.lock().await.daily_count(self.clock.today())
    }

    pub async fn weekly_count(&self) -> u32 {
        self.counters.lock().await.weekly_count(week_start(self.clock.today()))
    }
}
