//! Campaign orchestrator
//!
//! Runs one company at a time through the preferred acquisition strategy,
//! falls back from the browser to the directory API once, and folds the
//! per-company outcomes of a multi-company campaign into a summary.

use std::sync::Arc;

use shared::{logging, process_debug, process_error, process_info, process_warn, CampaignTarget, ProcessId, StrategyKind};
use tokio::sync::Mutex;

use crate::core::{CampaignPhase, CampaignSummary, CompanyOutcome, DelayPolicy, RateStats, StrategyFailure, Targeting};
use crate::error::{OutreachError, OutreachResult};
use crate::ledger::RateLedger;
use crate::strategies::{Acquisition, CampaignContext, Strategy};

pub struct CampaignOrchestrator {
    ledger: Arc<RateLedger>,
    targeting: Targeting,
    strategies: Vec<Strategy>,
    /// Pause after a completed company before the next one starts
    cooldown: DelayPolicy,
    phase: Mutex<CampaignPhase>,
    /// Held for a whole run so campaigns sharing this orchestrator take turns
    turn: Mutex<()>,
}

impl CampaignOrchestrator {
    pub fn new(ledger: Arc<RateLedger>, targeting: Targeting) -> Self {
        Self {
            ledger,
            targeting,
            strategies: Vec::new(),
            cooldown: DelayPolicy::company_cooldown(),
            phase: Mutex::new(CampaignPhase::Idle),
            turn: Mutex::new(()),
        }
    }

    /// Register a strategy; a later one of the same kind replaces the earlier
    pub fn with_strategy(mut self, strategy: impl Into<Strategy>) -> Self {
        let strategy = strategy.into();
        self.strategies.retain(|s| s.kind() != strategy.kind());
        self.strategies.push(strategy);
        self
    }

    pub fn with_cooldown(mut self, cooldown: DelayPolicy) -> Self {
        self.cooldown = cooldown;
        self
    }

    pub fn ledger(&self) -> &Arc<RateLedger> {
        &self.ledger
    }

    pub fn targeting(&self) -> &Targeting {
        &self.targeting
    }

    pub async fn phase(&self) -> CampaignPhase {
        self.phase.lock().await.clone()
    }

    pub async fn stats(&self) -> OutreachResult<RateStats> {
        self.ledger.stats().await
    }

    async fn transition(&self, next: CampaignPhase) -> OutreachResult<()> {
        let mut phase = self.phase.lock().await;
        if !phase.can_transition_to(&next) {
            return Err(OutreachError::InvalidTransition {
                from: phase.to_string(),
                to: next.to_string(),
            });
        }
        process_debug!(ProcessId::current(), "🔀 Campaign {} -> {}", *phase, next);
        *phase = next;
        Ok(())
    }

    fn strategy(&self, kind: StrategyKind) -> Option<&Strategy> {
        self.strategies.iter().find(|s| s.kind() == kind)
    }

    async fn attempt(&self, kind: StrategyKind, target: &CampaignTarget) -> OutreachResult<Acquisition> {
        let strategy = self
            .strategy(kind)
            .ok_or_else(|| OutreachError::strategy(kind, "strategy is not configured"))?;
        let ctx = CampaignContext {
            ledger: &self.ledger,
            targeting: &self.targeting,
        };
        strategy.acquire(target, ctx).await
    }

    /// Preferred strategy, then one fallback to the directory API if the browser failed
    async fn acquire_with_fallback(
        &self,
        target: &CampaignTarget,
        attempts: &mut Vec<StrategyFailure>,
    ) -> OutreachResult<(StrategyKind, Acquisition)> {
        let preferred = target.strategy_preference;
        let error = match self.attempt(preferred, target).await {
            Ok(acquisition) => return Ok((preferred, acquisition)),
            Err(e) if e.is_storage() => return Err(e),
            Err(e) => e,
        };
        attempts.push(StrategyFailure {
            strategy: preferred,
            error: error.to_string(),
        });

        if preferred != StrategyKind::Browser {
            return Err(error);
        }

        process_warn!(
            ProcessId::current(),
            "🔁 {}: browser strategy failed ({}), falling back to directory API",
            target.company_name,
            error
        );
        match self.attempt(StrategyKind::Api, target).await {
            Ok(acquisition) => Ok((StrategyKind::Api, acquisition)),
            Err(e) => {
                if !e.is_storage() {
                    attempts.push(StrategyFailure {
                        strategy: StrategyKind::Api,
                        error: e.to_string(),
                    });
                }
                Err(e)
            }
        }
    }

    /// Run one company's pass, waiting for any campaign already in progress
    ///
    /// Strategy and storage failures end up in the returned outcome; the only
    /// error returned is a rejected phase transition.
    pub async fn run_company(&self, target: &CampaignTarget) -> OutreachResult<CompanyOutcome> {
        let _turn = self.turn.lock().await;
        self.process_company(target).await
    }

    async fn process_company(&self, target: &CampaignTarget) -> OutreachResult<CompanyOutcome> {
        let company = target.company_name.clone();
        let mut attempts = Vec::new();

        let admitted = match self.ledger.can_send().await {
            Ok(admitted) => admitted,
            Err(e) => {
                self.transition(CampaignPhase::Running { company: company.clone() }).await?;
                return self.fail(company, e, attempts).await;
            }
        };
        if !admitted {
            let phase = CampaignPhase::Skipped { company: company.clone() };
            self.transition(phase.clone()).await?;
            process_info!(ProcessId::current(), "⏭️ {}: rate limits reached, skipped", company);
            return Ok(CompanyOutcome {
                company,
                phase,
                strategy: None,
                attempts,
            });
        }

        self.transition(CampaignPhase::Running { company: company.clone() }).await?;
        logging::log_progress(
            ProcessId::current(),
            "Campaign",
            &format!("{} (up to {} via {})", company, target.max_connections, target.strategy_preference),
        );

        match self.acquire_with_fallback(target, &mut attempts).await {
            Ok((strategy, acquisition)) => {
                let phase = CampaignPhase::Completed {
                    company: company.clone(),
                    sent: acquisition.sent,
                };
                self.transition(phase.clone()).await?;
                logging::log_success(
                    ProcessId::current(),
                    &format!(
                        "{}: {} connection requests sent via {} ({:?})",
                        company, acquisition.sent, strategy, acquisition.stop
                    ),
                );
                Ok(CompanyOutcome {
                    company,
                    phase,
                    strategy: Some(strategy),
                    attempts,
                })
            }
            Err(e) => self.fail(company, e, attempts).await,
        }
    }

    async fn fail(
        &self,
        company: String,
        error: OutreachError,
        attempts: Vec<StrategyFailure>,
    ) -> OutreachResult<CompanyOutcome> {
        process_error!(ProcessId::current(), "❌ {}: {}", company, error);
        let phase = CampaignPhase::Failed {
            company: company.clone(),
            error: error.to_string(),
        };
        self.transition(phase.clone()).await?;
        Ok(CompanyOutcome {
            company,
            phase,
            strategy: None,
            attempts,
        })
    }

    /// Run companies in order, stopping early once rate limits are reached
    ///
    /// A second campaign on the same orchestrator waits until this one is done.
    pub async fn run_campaign(&self, targets: &[CampaignTarget]) -> OutreachResult<CampaignSummary> {
        let _turn = self.turn.lock().await;
        let mut summary = CampaignSummary::default();
        let mut cool_down_first = false;

        process_info!(ProcessId::current(), "🚀 Campaign over {} companies", targets.len());

        for (index, target) in targets.iter().enumerate() {
            if cool_down_first && self.worth_continuing().await {
                let waited = self.cooldown.pause().await;
                process_debug!(ProcessId::current(), "😴 Cooled down {:?} before {}", waited, target.company_name);
            }

            let outcome = self.process_company(target).await?;
            summary.absorb(&outcome);

            if outcome.is_skipped() {
                summary
                    .companies_skipped
                    .extend(targets[index + 1..].iter().map(|t| t.company_name.clone()));
                summary.stopped_on_limit = true;
                process_info!(
                    ProcessId::current(),
                    "⛔ Stopping campaign: limits reached with {} companies left",
                    targets.len() - index - 1
                );
                break;
            }
            cool_down_first = matches!(outcome.phase, CampaignPhase::Completed { .. });
        }

        self.transition(CampaignPhase::Idle).await.ok();
        process_info!(
            ProcessId::current(),
            "🏁 Campaign finished: {} processed, {} skipped, {} errors, {} connections",
            summary.companies_processed.len(),
            summary.companies_skipped.len(),
            summary.errors.len(),
            summary.total_connections
        );
        Ok(summary)
    }

    /// False only when the ledger positively refuses; a read failure is left to the next company
    async fn worth_continuing(&self) -> bool {
        !matches!(self.ledger.can_send().await, Ok(false))
    }
}
