//! Trait definitions with mockall annotations for testing
//!
//! Every external collaborator of the campaign engine sits behind one of these
//! traits. Production implementations live in `services`; tests use the
//! generated mocks or the in-memory services.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use shared::{Candidate, OutreachRecord};

use crate::core::{RateWindowCounters, SearchFilters};
use crate::error::OutreachResult;

/// Everything the log store holds
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogSnapshot {
    pub counters: RateWindowCounters,
    pub records: Vec<OutreachRecord>,
}

impl LogSnapshot {
    /// Replace counters that disagree with a replay of the records
    ///
    /// Returns true when the counters had to be rebuilt.
    pub fn reconcile(&mut self) -> bool {
        let replayed = RateWindowCounters::replay(&self.records);
        if replayed.same_counts(&self.counters) {
            return false;
        }
        self.counters = RateWindowCounters {
            last_reset_date: self.counters.last_reset_date,
            ..replayed
        };
        true
    }
}

/// A person as shown on a page of browser search results
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileCard {
    /// Stable identifier used to avoid contacting the same card twice in one run
    pub card_id: String,
    pub name: String,
    pub title: String,
    /// Driver handle of the "connect" control; `None` when the card has no such control
    pub connect_handle: Option<String>,
}

impl ProfileCard {
    pub fn can_connect(&self) -> bool {
        self.connect_handle.is_some()
    }
}

/// Source of the current time
#[mockall::automock]
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    /// Calendar day (UTC) used for rate windows
    fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }
}

/// Durable, append-only campaign history
///
/// Implementations must apply a record to the counters and persist both in a
/// single write so that a crash can never leave a record logged but not counted.
#[mockall::automock]
#[async_trait]
pub trait CampaignLogStore: Send + Sync {
    /// Read the whole history; an absent store yields an empty snapshot
    async fn load(&self) -> OutreachResult<LogSnapshot>;

    /// Current counters as persisted, including writes by other instances
    async fn counters(&self) -> OutreachResult<RateWindowCounters>;

    /// Append one record and persist the updated counters with it
    ///
    /// # Returns
    /// The counters after the record was applied
    async fn append(&self, record: OutreachRecord) -> OutreachResult<RateWindowCounters>;
}

/// Programmatic lookup of people working at a company
#[mockall::automock]
#[async_trait]
pub trait ContactDirectory: Send + Sync {
    /// Search for up to `limit` candidates at `company`
    ///
    /// Fails with `DirectoryError` on transport or authentication failure.
    async fn search(&self, company: &str, limit: u32, filters: &SearchFilters) -> OutreachResult<Vec<Candidate>>;
}

/// Programmatic connection requests
#[mockall::automock]
#[async_trait]
pub trait OutreachChannel: Send + Sync {
    /// Ask `candidate_id` to connect
    ///
    /// # Returns
    /// `Ok(false)` when the request was rejected or throttled,
    /// `Err(ChannelError)` on transport failure.
    async fn connect(&self, candidate_id: &str, message: &str) -> OutreachResult<bool>;
}

/// Interactive browser session used by the browser strategy
#[mockall::automock]
#[async_trait]
pub trait BrowserSession: Send + Sync {
    /// Navigate to the login surface
    async fn open_login(&self) -> OutreachResult<()>;

    /// Whether the operator has finished logging in
    async fn is_logged_in(&self) -> OutreachResult<bool>;

    /// Navigate to the people search results for `company`
    async fn open_company_search(&self, company: &str) -> OutreachResult<()>;

    /// Cards visible on the current results page
    async fn candidate_cards(&self) -> OutreachResult<Vec<ProfileCard>>;

    /// Press "connect" on a card, adding `note` when a note composer appears
    ///
    /// # Returns
    /// Whether the invitation was actually sent
    async fn connect(&self, card: &ProfileCard, note: Option<String>) -> OutreachResult<bool>;

    /// Move to the next results page; `Ok(false)` when there is none
    async fn next_page(&self) -> OutreachResult<bool>;
}
