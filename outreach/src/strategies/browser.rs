//! Interactive browser strategy
//!
//! Waits for the operator to log in by hand, then walks the company's people
//! search results page by page and clicks "connect" on each fresh card.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use shared::{
    process_debug, process_info, process_warn, CampaignTarget, Candidate, OutreachStatus, ProcessId, StrategyKind,
};

use super::{Acquisition, CampaignContext, StopReason};
use crate::core::DelayPolicy;
use crate::error::{OutreachError, OutreachResult};
use crate::traits::{BrowserSession, ProfileCard};

/// How long to wait for a manual login before carrying on regardless
pub const DEFAULT_LOGIN_TIMEOUT: Duration = Duration::from_secs(5 * 60);
/// Result pages visited per company
pub const DEFAULT_MAX_PAGES: u32 = 5;

const LOGIN_POLL_INTERVAL: Duration = Duration::from_secs(5);

pub struct BrowserStrategy {
    session: Arc<dyn BrowserSession>,
    login_timeout: Duration,
    max_pages: u32,
    personalized_notes: bool,
    /// Replaces the profile's delay range when set
    attempt_delay: Option<DelayPolicy>,
}

impl BrowserStrategy {
    pub fn new(session: Arc<dyn BrowserSession>) -> Self {
        Self {
            session,
            login_timeout: DEFAULT_LOGIN_TIMEOUT,
            max_pages: DEFAULT_MAX_PAGES,
            personalized_notes: true,
            attempt_delay: None,
        }
    }

    pub fn with_login_timeout(mut self, timeout: Duration) -> Self {
        self.login_timeout = timeout;
        self
    }

    pub fn with_max_pages(mut self, max_pages: u32) -> Self {
        self.max_pages = max_pages.max(1);
        self
    }

    pub fn with_personalized_notes(mut self, personalized: bool) -> Self {
        self.personalized_notes = personalized;
        self
    }

    pub fn with_attempt_delay(mut self, delay: DelayPolicy) -> Self {
        self.attempt_delay = Some(delay);
        self
    }

    /// Poll until the operator is logged in or the wait runs out
    async fn wait_for_login(&self) -> bool {
        let poll = async {
            loop {
                match self.session.is_logged_in().await {
                    Ok(true) => return,
                    Ok(false) => {}
                    Err(e) => {
                        process_debug!(ProcessId::current(), "Login check failed: {}", e);
                    }
                }
                tokio::time::sleep(LOGIN_POLL_INTERVAL).await;
            }
        };
        tokio::time::timeout(self.login_timeout, poll).await.is_ok()
    }

    pub async fn acquire(&self, target: &CampaignTarget, ctx: CampaignContext<'_>) -> OutreachResult<Acquisition> {
        let company = target.company_name.as_str();
        let limit = target.max_connections;
        if limit == 0 {
            return Ok(Acquisition::nothing());
        }

        self.session.open_login().await.map_err(page_level)?;
        if self.wait_for_login().await {
            process_info!(ProcessId::current(), "🔐 Browser session logged in");
        } else {
            process_warn!(
                ProcessId::current(),
                "⏳ No login detected after {:?}, continuing anyway",
                self.login_timeout
            );
        }

        self.session.open_company_search(company).await.map_err(page_level)?;

        let delay = self
            .attempt_delay
            .unwrap_or_else(|| ctx.targeting.attempt_delay());
        let mut seen = HashSet::new();
        let mut sent = 0;
        let mut attempted = 0;
        let mut stop = StopReason::Exhausted;

        'pages: for page in 1..=self.max_pages {
            let cards = self.session.candidate_cards().await.map_err(page_level)?;
            process_debug!(ProcessId::current(), "📄 {} page {}: {} cards", company, page, cards.len());

            for card in cards {
                if !seen.insert(card.card_id.clone()) {
                    continue;
                }
                if !card.can_connect() {
                    ctx.ledger
                        .record_attempt(company, Some(&card.card_id), &card.name, OutreachStatus::Skipped)
                        .await?;
                    continue;
                }
                if sent >= limit {
                    stop = StopReason::MaxReached;
                    break 'pages;
                }
                if attempted > 0 {
                    delay.pause().await;
                }
                if !ctx.ledger.can_send().await? {
                    stop = StopReason::LimitReached;
                    break 'pages;
                }

                let note = self
                    .personalized_notes
                    .then(|| ctx.targeting.note_for(target, &as_candidate(&card)));

                attempted += 1;
                let status = match self.session.connect(&card, note).await {
                    Ok(true) => {
                        sent += 1;
                        OutreachStatus::Sent
                    }
                    Ok(false) => OutreachStatus::Failed,
                    Err(e) => {
                        process_warn!(ProcessId::current(), "⚠️ {}: could not connect with {}: {}", company, card.name, e);
                        OutreachStatus::Failed
                    }
                };
                ctx.ledger
                    .record_attempt(company, Some(&card.card_id), &card.name, status)
                    .await?;
            }

            if page == self.max_pages || !self.session.next_page().await.map_err(page_level)? {
                break;
            }
        }

        Ok(Acquisition { sent, attempted, stop })
    }
}

/// Page-level failures end the strategy; storage failures keep their identity
fn page_level(error: OutreachError) -> OutreachError {
    if error.is_storage() {
        return error;
    }
    OutreachError::strategy(StrategyKind::Browser, error.to_string())
}

/// Best-effort candidate view of a card for note rendering
fn as_candidate(card: &ProfileCard) -> Candidate {
    let mut names = card.name.split_whitespace();
    let first_name = names.next().unwrap_or_default().to_string();
    let last_name = names.collect::<Vec<_>>().join(" ");
    Candidate {
        id: card.card_id.clone(),
        first_name,
        last_name,
        title: card.title.clone(),
        ..Candidate::default()
    }
}
