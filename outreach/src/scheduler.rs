//! Recurring campaigns
//!
//! Each registered schedule gets its own tokio task that sleeps until the next
//! 09:00 firing and then starts the bound multi-company campaign. A per-schedule
//! lock keeps a slow run from being re-entered by its own next tick.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, FixedOffset, Local, NaiveDateTime, Offset, TimeZone, Utc};
use shared::{process_debug, process_error, process_info, process_warn, CampaignTarget, ProcessId};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::core::Recurrence;
use crate::error::{OutreachError, OutreachResult};
use crate::orchestrator::CampaignOrchestrator;
use crate::traits::Clock;

/// Wall-clock offset in force at a given instant
pub type OffsetRule = Arc<dyn Fn(DateTime<Utc>) -> FixedOffset + Send + Sync>;

fn system_offset(at: DateTime<Utc>) -> FixedOffset {
    Local.offset_from_utc_datetime(&at.naive_utc()).fix()
}

pub struct Scheduler {
    orchestrator: Arc<CampaignOrchestrator>,
    clock: Arc<dyn Clock>,
    /// Turns the clock's UTC instant into wall-clock firing times; the system
    /// time zone by default, so daylight-saving changes are followed
    offset_at: OffsetRule,
}

impl Scheduler {
    pub fn new(orchestrator: Arc<CampaignOrchestrator>, clock: Arc<dyn Clock>) -> Self {
        Self {
            orchestrator,
            clock,
            offset_at: Arc::new(system_offset),
        }
    }

    /// Fire on a fixed offset instead of the system time zone
    pub fn with_utc_offset(self, utc_offset: FixedOffset) -> Self {
        self.with_offset_rule(Arc::new(move |_: DateTime<Utc>| utc_offset))
    }

    pub fn with_offset_rule(mut self, offset_at: OffsetRule) -> Self {
        self.offset_at = offset_at;
        self
    }

    /// Start firing `targets` on `recurrence`; returns as soon as the task is spawned
    pub fn register(&self, recurrence: Recurrence, targets: Vec<CampaignTarget>) -> OutreachResult<ScheduleHandle> {
        if targets.is_empty() {
            return Err(OutreachError::schedule("a schedule needs at least one company"));
        }

        let id = Uuid::new_v4();
        let runs = Arc::new(AtomicU64::new(0));
        let skipped = Arc::new(AtomicU64::new(0));
        let ticker = Ticker {
            id,
            recurrence,
            targets: Arc::new(targets),
            orchestrator: Arc::clone(&self.orchestrator),
            clock: Arc::clone(&self.clock),
            offset_at: Arc::clone(&self.offset_at),
            running: Arc::new(Mutex::new(())),
            runs: Arc::clone(&runs),
            skipped: Arc::clone(&skipped),
        };

        process_info!(
            ProcessId::current(),
            "📅 Schedule {} registered: {} for {} companies",
            id,
            recurrence.describe(),
            ticker.targets.len()
        );

        Ok(ScheduleHandle {
            id,
            recurrence,
            runs,
            skipped,
            task: tokio::spawn(ticker.run()),
        })
    }
}

/// State owned by one schedule's background task
struct Ticker {
    id: Uuid,
    recurrence: Recurrence,
    targets: Arc<Vec<CampaignTarget>>,
    orchestrator: Arc<CampaignOrchestrator>,
    clock: Arc<dyn Clock>,
    offset_at: OffsetRule,
    running: Arc<Mutex<()>>,
    runs: Arc<AtomicU64>,
    skipped: Arc<AtomicU64>,
}

impl Ticker {
    fn local_now(&self) -> NaiveDateTime {
        let now = self.clock.now();
        now.with_timezone(&(self.offset_at)(now)).naive_local()
    }

    /// UTC instant of a wall-clock time, using the offset in force at that time
    fn instant_of(&self, local: NaiveDateTime) -> DateTime<Utc> {
        let now = self.clock.now();
        let guess = Utc.from_utc_datetime(&(local - (self.offset_at)(now)));
        Utc.from_utc_datetime(&(local - (self.offset_at)(guess)))
    }

    async fn run(self) {
        let mut cursor = self.local_now();
        loop {
            let now = self.local_now().max(cursor);
            let Some(next) = self.recurrence.next_fire_after(now) else {
                process_error!(ProcessId::current(), "❌ Schedule {} found no future firing; stopping", self.id);
                return;
            };
            let wait = (self.instant_of(next) - self.clock.now()).to_std().unwrap_or(Duration::ZERO);
            process_debug!(ProcessId::current(), "⏰ Schedule {} next fires at {} (in {:?})", self.id, next, wait);
            tokio::time::sleep(wait).await;
            cursor = next;
            self.fire(next);
        }
    }

    fn fire(&self, at: NaiveDateTime) {
        let guard = match Arc::clone(&self.running).try_lock_owned() {
            Ok(guard) => guard,
            Err(_) => {
                self.skipped.fetch_add(1, Ordering::SeqCst);
                process_warn!(
                    ProcessId::current(),
                    "⏭️ Schedule {} tick at {} skipped: previous run still in progress",
                    self.id,
                    at
                );
                return;
            }
        };

        self.runs.fetch_add(1, Ordering::SeqCst);
        let id = self.id;
        let orchestrator = Arc::clone(&self.orchestrator);
        let targets = Arc::clone(&self.targets);
        tokio::spawn(async move {
            let _guard = guard;
            process_info!(ProcessId::current(), "🔔 Schedule {} firing ({})", id, at);
            match orchestrator.run_campaign(&targets).await {
                Ok(summary) => {
                    process_info!(
                        ProcessId::current(),
                        "📊 Schedule {} run done: {} connections, {} errors",
                        id,
                        summary.total_connections,
                        summary.errors.len()
                    );
                }
                Err(e) => {
                    process_error!(ProcessId::current(), "❌ Schedule {} run failed: {}", id, e);
                }
            }
        });
    }
}

/// Handle to a registered schedule
#[derive(Debug)]
pub struct ScheduleHandle {
    id: Uuid,
    recurrence: Recurrence,
    runs: Arc<AtomicU64>,
    skipped: Arc<AtomicU64>,
    task: JoinHandle<()>,
}

impl ScheduleHandle {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn recurrence(&self) -> Recurrence {
        self.recurrence
    }

    /// Campaign runs started so far
    pub fn runs(&self) -> u64 {
        self.runs.load(Ordering::SeqCst)
    }

    /// Ticks dropped because the previous run was still going
    pub fn skipped_ticks(&self) -> u64 {
        self.skipped.load(Ordering::SeqCst)
    }

    /// Stop future firings; a run already in progress finishes on its own
    pub fn cancel(&self) {
        self.task.abort();
        process_info!(ProcessId::current(), "🛑 Schedule {} cancelled", self.id);
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Wait for the schedule task to end, which only happens after `cancel`
    pub async fn join(self) {
        if let Err(e) = self.task.await {
            if !e.is_cancelled() {
                process_error!(ProcessId::current(), "❌ Schedule {} task panicked: {}", self.id, e);
            }
        }
    }
}
