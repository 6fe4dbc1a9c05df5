//! Strategy tests
//!
//! Each strategy runs against a real ledger over an in-memory store, with the
//! browser scripted by `FakeBrowser` and the API side by mockall mocks.

use std::sync::Arc;
use std::time::Duration;

use outreach::core::{DelayPolicy, RateLimits, Targeting};
use outreach::services::{ManualClock, MemoryLogStore};
use outreach::strategies::CampaignContext;
use outreach::traits::{MockContactDirectory, MockOutreachChannel};
use outreach::{BrowserStrategy, DirectoryApiStrategy, OutreachError, RateLedger, StopReason};
use shared::{OutreachStatus, StrategyKind, TemplateId};

mod common;
use common::{FakeBrowser, TestFixtures, TestHelpers};

struct Harness {
    ledger: RateLedger,
    targeting: Targeting,
    store: Arc<MemoryLogStore>,
}

impl Harness {
    async fn new(daily: u32) -> Self {
        let store = Arc::new(MemoryLogStore::new());
        let clock = Arc::new(ManualClock::new(TestFixtures::wednesday()));
        let ledger = RateLedger::open(store.clone(), clock, RateLimits::new(daily, 500))
            .await
            .unwrap();
        Self {
            ledger,
            targeting: Targeting::new(TestHelpers::instant_profile()),
            store,
        }
    }

    fn ctx(&self) -> CampaignContext<'_> {
        CampaignContext {
            ledger: &self.ledger,
            targeting: &self.targeting,
        }
    }
}

#[tokio::test]
async fn test_api_reports_limit_reached_as_stop_reason() {
    let harness = Harness::new(2).await;
    let strategy = DirectoryApiStrategy::new(
        Arc::new(TestHelpers::directory_with(TestFixtures::candidates(3))),
        Arc::new(TestHelpers::accepting_channel()),
    );

    let acquisition = strategy
        .acquire(&TestFixtures::api_target(TestFixtures::ACME, 3), harness.ctx())
        .await
        .unwrap();

    assert_eq!(acquisition.sent, 2);
    assert_eq!(acquisition.attempted, 2);
    assert_eq!(acquisition.stop, StopReason::LimitReached);
}

#[tokio::test]
async fn test_api_contacts_best_scored_candidates_first() {
    let harness = Harness::new(100).await;
    let candidates = vec![
        TestFixtures::candidate("low", "Engineer", 50),
        TestFixtures::candidate("high", "VP Engineering", 900),
        TestFixtures::candidate("mid", "Engineer", 600),
    ];
    let mut channel = MockOutreachChannel::new();
    let contacted = Arc::new(std::sync::Mutex::new(Vec::new()));
    let log = contacted.clone();
    channel.expect_connect().returning(move |id, _| {
        log.lock().unwrap().push(id.to_string());
        Ok(true)
    });
    let strategy = DirectoryApiStrategy::new(Arc::new(TestHelpers::directory_with(candidates)), Arc::new(channel));

    let target = TestFixtures::api_target(TestFixtures::ACME, 3).with_titles(vec!["VP".into(), "Engineer".into()]);
    strategy.acquire(&target, harness.ctx()).await.unwrap();

    assert_eq!(*contacted.lock().unwrap(), vec!["high", "mid", "low"]);
}

#[tokio::test]
async fn test_api_advanced_filters_drop_excluded_titles() {
    let harness = Harness::new(100).await;
    let candidates = vec![
        TestFixtures::candidate("keep", "Head of Sales", 300),
        TestFixtures::candidate("drop", "Sales Intern", 300),
    ];
    let strategy = DirectoryApiStrategy::new(
        Arc::new(TestHelpers::directory_with(candidates)),
        Arc::new(TestHelpers::accepting_channel()),
    );
    let target = TestFixtures::api_target(TestFixtures::ACME, 5).with_excluded_titles(vec!["intern".into()]);

    let acquisition = strategy.acquire(&target, harness.ctx()).await.unwrap();

    assert_eq!(acquisition.sent, 1);
    let records = harness.store.records().await;
    assert_eq!(records[0].person_id.as_deref(), Some("keep"));

    // Without the filter layer both are contacted
    let harness = Harness::new(100).await;
    let candidates = vec![
        TestFixtures::candidate("keep", "Head of Sales", 300),
        TestFixtures::candidate("drop", "Sales Intern", 300),
    ];
    let strategy = DirectoryApiStrategy::new(
        Arc::new(TestHelpers::directory_with(candidates)),
        Arc::new(TestHelpers::accepting_channel()),
    )
    .with_advanced_filters(false);
    assert_eq!(strategy.acquire(&target, harness.ctx()).await.unwrap().sent, 2);
}

#[tokio::test]
async fn test_api_sends_personalised_notes() {
    let harness = Harness::new(100).await;
    let mut channel = MockOutreachChannel::new();
    channel
        .expect_connect()
        .withf(|id, message| id == "p0" && message.starts_with("Hi Firstp0") && message.contains("Acme"))
        .times(1)
        .returning(|_, _| Ok(true));
    let strategy = DirectoryApiStrategy::new(
        Arc::new(TestHelpers::directory_with(TestFixtures::candidates(1))),
        Arc::new(channel),
    );
    let target = TestFixtures::api_target(TestFixtures::ACME, 1).with_template(TemplateId::Leadership);

    assert_eq!(strategy.acquire(&target, harness.ctx()).await.unwrap().sent, 1);
}

#[tokio::test(start_paused = true)]
async fn test_api_without_personalisation_uses_fixed_delay_and_blank_message() {
    let harness = Harness::new(100).await;
    let mut channel = MockOutreachChannel::new();
    channel
        .expect_connect()
        .withf(|_, message| message.is_empty())
        .times(3)
        .returning(|_, _| Ok(true));
    let strategy = DirectoryApiStrategy::new(
        Arc::new(TestHelpers::directory_with(TestFixtures::candidates(3))),
        Arc::new(channel),
    )
    .with_personalization(false);

    let started = tokio::time::Instant::now();
    strategy
        .acquire(&TestFixtures::api_target(TestFixtures::ACME, 3), harness.ctx())
        .await
        .unwrap();

    // Five seconds between each pair of sends, none after the last
    TestHelpers::assert_elapsed(started.elapsed(), Duration::from_secs(10));
}

#[tokio::test]
async fn test_api_all_failures_is_a_strategy_error() {
    let harness = Harness::new(100).await;
    let strategy = DirectoryApiStrategy::new(
        Arc::new(TestHelpers::directory_with(TestFixtures::candidates(2))),
        Arc::new(TestHelpers::rejecting_channel()),
    );

    let err = strategy
        .acquire(&TestFixtures::api_target(TestFixtures::ACME, 2), harness.ctx())
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        OutreachError::StrategyError {
            strategy: StrategyKind::Api,
            ..
        }
    ));
    assert_eq!(
        TestHelpers::statuses(&harness.store).await,
        vec![OutreachStatus::Failed, OutreachStatus::Failed]
    );
}

#[tokio::test]
async fn test_api_partial_failures_are_skipped() {
    let harness = Harness::new(100).await;
    let mut channel = MockOutreachChannel::new();
    channel
        .expect_connect()
        .returning(|id, _| match id {
            "p1" => Err(OutreachError::channel("connection reset")),
            _ => Ok(true),
        });
    let strategy = DirectoryApiStrategy::new(
        Arc::new(TestHelpers::directory_with(TestFixtures::candidates(3))),
        Arc::new(channel),
    );

    let acquisition = strategy
        .acquire(&TestFixtures::api_target(TestFixtures::ACME, 3), harness.ctx())
        .await
        .unwrap();

    assert_eq!(acquisition.sent, 2);
    assert_eq!(acquisition.attempted, 3);
    assert_eq!(acquisition.stop, StopReason::Exhausted);
}

#[tokio::test]
async fn test_api_directory_error_becomes_strategy_error() {
    let harness = Harness::new(100).await;
    let mut channel = MockOutreachChannel::new();
    channel.expect_connect().never();
    let strategy = DirectoryApiStrategy::new(Arc::new(TestHelpers::failing_directory()), Arc::new(channel));

    let err = strategy
        .acquire(&TestFixtures::api_target(TestFixtures::ACME, 2), harness.ctx())
        .await
        .unwrap_err();
    assert!(err.to_string().contains("connection refused"));
}

#[tokio::test]
async fn test_api_zero_max_does_not_query() {
    let harness = Harness::new(100).await;
    let mut directory = MockContactDirectory::new();
    directory.expect_search().never();
    let strategy = DirectoryApiStrategy::new(Arc::new(directory), Arc::new(MockOutreachChannel::new()));

    let acquisition = strategy
        .acquire(&TestFixtures::api_target(TestFixtures::ACME, 0), harness.ctx())
        .await
        .unwrap();
    assert_eq!(acquisition.sent, 0);
}

#[tokio::test]
async fn test_browser_walks_pages_and_dedupes_cards() {
    let harness = Harness::new(100).await;
    let browser = Arc::new(FakeBrowser::new(vec![
        TestFixtures::cards(&["a", "b"]),
        TestFixtures::cards(&["b", "c"]),
        TestFixtures::cards(&["d"]),
    ]));
    let strategy = BrowserStrategy::new(browser.clone());

    let acquisition = strategy
        .acquire(&TestFixtures::browser_target(TestFixtures::ACME, 10), harness.ctx())
        .await
        .unwrap();

    assert_eq!(acquisition.sent, 4);
    assert_eq!(acquisition.stop, StopReason::Exhausted);
    assert_eq!(browser.connected_ids(), vec!["a", "b", "c", "d"]);
}

#[tokio::test]
async fn test_browser_visits_at_most_five_pages() {
    let harness = Harness::new(100).await;
    let pages: Vec<_> = (0..8).map(|i| TestFixtures::cards(&[&format!("card{i}")])).collect();
    let browser = Arc::new(FakeBrowser::new(pages));
    let strategy = BrowserStrategy::new(browser.clone());

    let acquisition = strategy
        .acquire(&TestFixtures::browser_target(TestFixtures::ACME, 50), harness.ctx())
        .await
        .unwrap();

    assert_eq!(acquisition.sent, 5);
    assert_eq!(browser.connected_ids().len(), 5);
}

#[tokio::test]
async fn test_browser_records_cards_without_connect_as_skipped() {
    let harness = Harness::new(100).await;
    let browser = Arc::new(FakeBrowser::new(vec![vec![
        TestFixtures::card("open", true),
        TestFixtures::card("already-connected", false),
    ]]));
    let strategy = BrowserStrategy::new(browser.clone());

    let acquisition = strategy
        .acquire(&TestFixtures::browser_target(TestFixtures::ACME, 5), harness.ctx())
        .await
        .unwrap();

    assert_eq!(acquisition.sent, 1);
    assert_eq!(
        TestHelpers::statuses(&harness.store).await,
        vec![OutreachStatus::Sent, OutreachStatus::Skipped]
    );
    assert_eq!(harness.ledger.daily_count().await, 1);
}

#[tokio::test]
async fn test_browser_per_card_errors_are_skipped() {
    let harness = Harness::new(100).await;
    let browser = Arc::new(
        FakeBrowser::new(vec![TestFixtures::cards(&["a", "b", "c"])])
            .failing_on("a")
            .rejecting("b"),
    );
    let strategy = BrowserStrategy::new(browser.clone());

    let acquisition = strategy
        .acquire(&TestFixtures::browser_target(TestFixtures::ACME, 5), harness.ctx())
        .await
        .unwrap();

    assert_eq!(acquisition.sent, 1);
    assert_eq!(acquisition.attempted, 3);
    assert_eq!(browser.connected_ids(), vec!["c"]);
    assert_eq!(
        TestHelpers::statuses(&harness.store).await,
        vec![OutreachStatus::Failed, OutreachStatus::Failed, OutreachStatus::Sent]
    );
}

#[tokio::test]
async fn test_browser_stops_at_max_connections() {
    let harness = Harness::new(100).await;
    let browser = Arc::new(FakeBrowser::new(vec![TestFixtures::cards(&["a", "b", "c"])]));
    let strategy = BrowserStrategy::new(browser.clone());

    let acquisition = strategy
        .acquire(&TestFixtures::browser_target(TestFixtures::ACME, 2), harness.ctx())
        .await
        .unwrap();

    assert_eq!(acquisition.sent, 2);
    assert_eq!(acquisition.stop, StopReason::MaxReached);
}

#[tokio::test]
async fn test_browser_sends_notes_unless_disabled() {
    let harness = Harness::new(100).await;
    let browser = Arc::new(FakeBrowser::new(vec![vec![TestFixtures::card("a", true)]]));
    BrowserStrategy::new(browser.clone())
        .acquire(&TestFixtures::browser_target(TestFixtures::ACME, 1), harness.ctx())
        .await
        .unwrap();
    let notes = browser.notes();
    assert!(notes[0].as_deref().is_some_and(|note| note.starts_with("Hi Card")));

    let harness = Harness::new(100).await;
    let browser = Arc::new(FakeBrowser::new(vec![vec![TestFixtures::card("a", true)]]));
    BrowserStrategy::new(browser.clone())
        .with_personalized_notes(false)
        .acquire(&TestFixtures::browser_target(TestFixtures::ACME, 1), harness.ctx())
        .await
        .unwrap();
    assert_eq!(browser.notes(), vec![None]);
}

#[tokio::test(start_paused = true)]
async fn test_browser_waits_for_manual_login() {
    let harness = Harness::new(100).await;
    let browser = Arc::new(FakeBrowser::new(vec![TestFixtures::cards(&["a"])]).logged_in_after(3));
    let strategy = BrowserStrategy::new(browser.clone());

    let started = tokio::time::Instant::now();
    let acquisition = strategy
        .acquire(&TestFixtures::browser_target(TestFixtures::ACME, 1), harness.ctx())
        .await
        .unwrap();

    assert_eq!(acquisition.sent, 1);
    assert_eq!(browser.login_polls(), 4);
    TestHelpers::assert_elapsed(started.elapsed(), Duration::from_secs(15));
}

#[tokio::test(start_paused = true)]
async fn test_browser_login_timeout_is_not_fatal() {
    let harness = Harness::new(100).await;
    let browser = Arc::new(FakeBrowser::new(vec![TestFixtures::cards(&["a"])]).never_logs_in());
    let strategy = BrowserStrategy::new(browser.clone()).with_login_timeout(Duration::from_secs(60));

    let started = tokio::time::Instant::now();
    let acquisition = strategy
        .acquire(&TestFixtures::browser_target(TestFixtures::ACME, 1), harness.ctx())
        .await
        .unwrap();

    TestHelpers::assert_elapsed(started.elapsed(), Duration::from_secs(60));
    assert_eq!(acquisition.sent, 1);
}

#[tokio::test(start_paused = true)]
async fn test_browser_pauses_between_attempts() {
    let harness = Harness::new(100).await;
    let browser = Arc::new(FakeBrowser::new(vec![TestFixtures::cards(&["a", "b", "c"])]));
    let strategy = BrowserStrategy::new(browser).with_attempt_delay(DelayPolicy::Fixed(Duration::from_secs(4)));

    let started = tokio::time::Instant::now();
    strategy
        .acquire(&TestFixtures::browser_target(TestFixtures::ACME, 3), harness.ctx())
        .await
        .unwrap();

    TestHelpers::assert_elapsed(started.elapsed(), Duration::from_secs(8));
}
