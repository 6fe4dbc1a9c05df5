//! Campaign state machine and run results

use serde::{Deserialize, Serialize};
use shared::StrategyKind;
use std::fmt;

/// Where a campaign stands for the company currently being worked
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum CampaignPhase {
    Idle,
    Running { company: String },
    Completed { company: String, sent: u32 },
    /// Rate limits were already reached; no strategy was invoked
    Skipped { company: String },
    Failed { company: String, error: String },
}

impl CampaignPhase {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            CampaignPhase::Completed { .. } | CampaignPhase::Skipped { .. } | CampaignPhase::Failed { .. }
        )
    }

    /// Allowed moves: a company starts from Idle or from a finished company
    /// (multi-company runs), is Skipped straight away, or runs to a terminal state
    pub fn can_transition_to(&self, next: &CampaignPhase) -> bool {
        match (self, next) {
            (CampaignPhase::Running { company }, CampaignPhase::Completed { company: next, .. })
            | (CampaignPhase::Running { company }, CampaignPhase::Failed { company: next, .. }) => company == next,
            (CampaignPhase::Running { .. }, _) => false,
            (_, CampaignPhase::Running { .. }) | (_, CampaignPhase::Skipped { .. }) => true,
            (_, CampaignPhase::Idle) => self.is_terminal(),
            _ => false,
        }
    }
}

impl fmt::Display for CampaignPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CampaignPhase::Idle => write!(f, "idle"),
            CampaignPhase::Running { company } => write!(f, "running({company})"),
            CampaignPhase::Completed { company, sent } => write!(f, "completed({company}, sent={sent})"),
            CampaignPhase::Skipped { company } => write!(f, "skipped({company})"),
            CampaignPhase::Failed { company, error } => write!(f, "failed({company}: {error})"),
        }
    }
}

/// Result of one company's pass
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyOutcome {
    pub company: String,
    pub phase: CampaignPhase,
    /// Strategy that completed the pass, if any did
    pub strategy: Option<StrategyKind>,
    /// Every strategy failure seen, in the order they happened
    pub attempts: Vec<StrategyFailure>,
}

impl CompanyOutcome {
    pub fn sent(&self) -> u32 {
        match self.phase {
            CampaignPhase::Completed { sent, .. } => sent,
            _ => 0,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self.phase, CampaignPhase::Failed { .. })
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self.phase, CampaignPhase::Skipped { .. })
    }
}

/// One failed strategy attempt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrategyFailure {
    pub strategy: StrategyKind,
    pub error: String,
}

/// A company that ended in `Failed`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyError {
    pub company: String,
    pub error: String,
}

/// Partial or complete result of a multi-company campaign
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CampaignSummary {
    pub companies_processed: Vec<String>,
    pub companies_skipped: Vec<String>,
    pub total_connections: u32,
    pub errors: Vec<CompanyError>,
    /// True when the run stopped before the end of the list because limits were reached
    pub stopped_on_limit: bool,
}

impl CampaignSummary {
    /// Fold one company's outcome into the totals
    pub fn absorb(&mut self, outcome: &CompanyOutcome) {
        match &outcome.phase {
            CampaignPhase::Completed { company, sent } => {
                self.companies_processed.push(company.clone());
                self.total_connections += sent;
            }
            CampaignPhase::Skipped { company } => self.companies_skipped.push(company.clone()),
            CampaignPhase::Failed { company, error } => self.errors.push(CompanyError {
                company: company.clone(),
                error: error.clone(),
            }),
            CampaignPhase::Idle | CampaignPhase::Running { .. } => {}
        }
    }

    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }
}
