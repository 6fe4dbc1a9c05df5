//! Test helpers and builder patterns for campaign tests
//!
//! This module provides convenient helper functions and builder patterns
//! to reduce test boilerplate and improve maintainability.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use outreach::core::{DelayPolicy, RateLimits, Targeting};
use outreach::services::{ManualClock, MemoryLogStore};
use outreach::traits::{
    BrowserSession, Clock, ContactDirectory, MockBrowserSession, MockContactDirectory, MockOutreachChannel,
    OutreachChannel, ProfileCard,
};
use outreach::{BrowserStrategy, CampaignOrchestrator, DirectoryApiStrategy, OutreachError, OutreachResult, RateLedger};
use shared::{Candidate, DelayRange, OutreachRecord, OutreachStatus, TargetingProfile};

use super::fixtures::TestFixtures;

/// Clock that follows tokio's (possibly paused) timer from a fixed start
pub struct TokioClock {
    start: DateTime<Utc>,
    origin: tokio::time::Instant,
}

impl TokioClock {
    pub fn starting_at(start: DateTime<Utc>) -> Arc<Self> {
        Arc::new(Self {
            start,
            origin: tokio::time::Instant::now(),
        })
    }
}

impl Clock for TokioClock {
    fn now(&self) -> DateTime<Utc> {
        self.start + chrono::Duration::from_std(self.origin.elapsed()).unwrap()
    }
}

/// Scripted browser: fixed result pages, optional per-card failures
pub struct FakeBrowser {
    pages: Vec<Vec<ProfileCard>>,
    page: Mutex<usize>,
    /// `None` never reports a login
    login_after_polls: Option<u32>,
    polls: Mutex<u32>,
    failing: HashSet<String>,
    rejecting: HashSet<String>,
    connected: Mutex<Vec<(String, Option<String>)>>,
}

impl FakeBrowser {
    pub fn new(pages: Vec<Vec<ProfileCard>>) -> Self {
        Self {
            pages,
            page: Mutex::new(0),
            login_after_polls: Some(0),
            polls: Mutex::new(0),
            failing: HashSet::new(),
            rejecting: HashSet::new(),
            connected: Mutex::new(Vec::new()),
        }
    }

    pub fn logged_in_after(mut self, polls: u32) -> Self {
        self.login_after_polls = Some(polls);
        self
    }

    pub fn never_logs_in(mut self) -> Self {
        self.login_after_polls = None;
        self
    }

    pub fn failing_on(mut self, card_id: &str) -> Self {
        self.failing.insert(card_id.to_string());
        self
    }

    pub fn rejecting(mut self, card_id: &str) -> Self {
        self.rejecting.insert(card_id.to_string());
        self
    }

    pub fn connected_ids(&self) -> Vec<String> {
        self.connected.lock().unwrap().iter().map(|(id, _)| id.clone()).collect()
    }

    pub fn notes(&self) -> Vec<Option<String>> {
        self.connected.lock().unwrap().iter().map(|(_, note)| note.clone()).collect()
    }

    pub fn login_polls(&self) -> u32 {
        *self.polls.lock().unwrap()
    }
}

#[async_trait]
impl BrowserSession for FakeBrowser {
    async fn open_login(&self) -> OutreachResult<()> {
        Ok(())
    }

    async fn is_logged_in(&self) -> OutreachResult<bool> {
        let mut polls = self.polls.lock().unwrap();
        *polls += 1;
        Ok(self.login_after_polls.is_some_and(|after| *polls > after))
    }

    async fn open_company_search(&self, _company: &str) -> OutreachResult<()> {
        *self.page.lock().unwrap() = 0;
        Ok(())
    }

    async fn candidate_cards(&self) -> OutreachResult<Vec<ProfileCard>> {
        let page = *self.page.lock().unwrap();
        Ok(self.pages.get(page).cloned().unwrap_or_default())
    }

    async fn connect(&self, card: &ProfileCard, note: Option<String>) -> OutreachResult<bool> {
        if self.failing.contains(&card.card_id) {
            return Err(OutreachError::navigation("connect", "dialog did not open"));
        }
        if self.rejecting.contains(&card.card_id) {
            return Ok(false);
        }
        self.connected.lock().unwrap().push((card.card_id.clone(), note));
        Ok(true)
    }

    async fn next_page(&self) -> OutreachResult<bool> {
        let mut page = self.page.lock().unwrap();
        if *page + 1 < self.pages.len() {
            *page += 1;
            Ok(true)
        } else {
            Ok(false)
        }
    }
}

/// Assembled campaign plus the store it writes to
pub struct TestCampaign {
    pub orchestrator: Arc<CampaignOrchestrator>,
    pub store: Arc<MemoryLogStore>,
    pub clock: Arc<dyn Clock>,
}

/// Builder pattern for creating test campaigns with sensible defaults
pub struct CampaignBuilder {
    clock: Arc<dyn Clock>,
    limits: RateLimits,
    store: Arc<MemoryLogStore>,
    profile: TargetingProfile,
    directory: Option<DirectoryApiStrategy>,
    browser: Option<BrowserStrategy>,
    cooldown: DelayPolicy,
}

impl CampaignBuilder {
    /// No delays, default limits, a manual clock on a Wednesday
    pub fn new() -> Self {
        Self {
            clock: Arc::new(ManualClock::new(TestFixtures::wednesday())),
            limits: RateLimits::default(),
            store: Arc::new(MemoryLogStore::new()),
            profile: TestHelpers::instant_profile(),
            directory: None,
            browser: None,
            cooldown: DelayPolicy::None,
        }
    }

    pub fn with_limits(mut self, daily: u32, weekly: u32) -> Self {
        self.limits = RateLimits::new(daily, weekly);
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_profile(mut self, profile: TargetingProfile) -> Self {
        self.profile = profile;
        self
    }

    pub fn with_cooldown(mut self, cooldown: DelayPolicy) -> Self {
        self.cooldown = cooldown;
        self
    }

    pub fn with_directory(
        mut self,
        directory: impl ContactDirectory + 'static,
        channel: impl OutreachChannel + 'static,
    ) -> Self {
        self.directory = Some(DirectoryApiStrategy::new(Arc::new(directory), Arc::new(channel)));
        self
    }

    pub fn with_directory_strategy(mut self, strategy: DirectoryApiStrategy) -> Self {
        self.directory = Some(strategy);
        self
    }

    pub fn with_browser(mut self, session: Arc<dyn BrowserSession>) -> Self {
        self.browser = Some(BrowserStrategy::new(session));
        self
    }

    pub async fn build(self) -> TestCampaign {
        let ledger = RateLedger::open(self.store.clone(), self.clock.clone(), self.limits)
            .await
            .unwrap();
        let mut orchestrator =
            CampaignOrchestrator::new(Arc::new(ledger), Targeting::new(self.profile)).with_cooldown(self.cooldown);
        if let Some(browser) = self.browser {
            orchestrator = orchestrator.with_strategy(browser);
        }
        if let Some(directory) = self.directory {
            orchestrator = orchestrator.with_strategy(directory);
        }
        TestCampaign {
            orchestrator: Arc::new(orchestrator),
            store: self.store,
            clock: self.clock,
        }
    }
}

/// Common helper functions for test operations
pub struct TestHelpers;

impl TestHelpers {
    /// Default targeting with no pause between attempts
    pub fn instant_profile() -> TargetingProfile {
        TargetingProfile {
            connection_delay_range: DelayRange::new(0, 0),
            ..TargetingProfile::default()
        }
    }

    /// Directory returning `candidates` (up to the requested limit)
    pub fn directory_with(candidates: Vec<Candidate>) -> MockContactDirectory {
        let mut directory = MockContactDirectory::new();
        directory
            .expect_search()
            .returning(move |_, limit, _| Ok(candidates.iter().take(limit as usize).cloned().collect()));
        directory
    }

    pub fn failing_directory() -> MockContactDirectory {
        let mut directory = MockContactDirectory::new();
        directory
            .expect_search()
            .returning(|_, _, _| Err(OutreachError::directory("connection refused")));
        directory
    }

    /// Channel that accepts every invitation
    pub fn accepting_channel() -> MockOutreachChannel {
        let mut channel = MockOutreachChannel::new();
        channel.expect_connect().returning(|_, _| Ok(true));
        channel
    }

    /// Channel that rejects every invitation
    pub fn rejecting_channel() -> MockOutreachChannel {
        let mut channel = MockOutreachChannel::new();
        channel.expect_connect().returning(|_, _| Ok(false));
        channel
    }

    /// Browser that logs in but cannot open the company's results page
    pub fn broken_browser() -> MockBrowserSession {
        let mut browser = MockBrowserSession::new();
        browser.expect_open_login().returning(|| Ok(()));
        browser.expect_is_logged_in().returning(|| Ok(true));
        browser
            .expect_open_company_search()
            .returning(|_| Err(OutreachError::navigation("company search", "results page did not load")));
        browser.expect_candidate_cards().never();
        browser
    }

    pub async fn records(store: &MemoryLogStore) -> Vec<OutreachRecord> {
        store.records().await
    }

    pub async fn statuses(store: &MemoryLogStore) -> Vec<OutreachStatus> {
        store.records().await.into_iter().map(|r| r.status).collect()
    }

    pub async fn sent_count(store: &MemoryLogStore) -> usize {
        store.records().await.iter().filter(|r| r.is_sent()).count()
    }

    /// Companies that appear in the log, in first-seen order
    pub async fn companies_logged(store: &MemoryLogStore) -> Vec<String> {
        let mut companies: Vec<String> = Vec::new();
        for record in store.records().await {
            if !companies.contains(&record.company) {
                companies.push(record.company);
            }
        }
        companies
    }

    /// Paused-time elapsed check allowing for timer millisecond rounding
    pub fn assert_elapsed(elapsed: Duration, expected: Duration) {
        assert!(
            elapsed >= expected && elapsed < expected + Duration::from_millis(50),
            "expected about {expected:?}, got {elapsed:?}"
        );
    }

    pub fn minutes(minutes: u64) -> Duration {
        Duration::from_secs(minutes * 60)
    }
}
