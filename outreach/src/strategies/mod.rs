//! Acquisition strategies
//!
//! A strategy finds people at one company and sends them connection requests.
//! Both variants share the same contract: check the rate ledger before every
//! send, record every attempt, and treat "limit reached" as a normal stop.

pub mod browser;
pub mod directory_api;

pub use browser::BrowserStrategy;
pub use directory_api::DirectoryApiStrategy;

use serde::{Deserialize, Serialize};
use shared::{CampaignTarget, StrategyKind};

use crate::core::Targeting;
use crate::error::OutreachResult;
use crate::ledger::RateLedger;

/// Why a strategy stopped sending
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// Ran out of candidates or result pages
    Exhausted,
    /// Sent `max_connections` requests
    MaxReached,
    /// The rate ledger refused further sends
    LimitReached,
}

/// What one strategy run achieved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Acquisition {
    pub sent: u32,
    pub attempted: u32,
    pub stop: StopReason,
}

impl Acquisition {
    pub fn nothing() -> Self {
        Self {
            sent: 0,
            attempted: 0,
            stop: StopReason::Exhausted,
        }
    }
}

/// Shared collaborators handed to a strategy for one company
#[derive(Clone, Copy)]
pub struct CampaignContext<'a> {
    pub ledger: &'a RateLedger,
    pub targeting: &'a Targeting,
}

/// Interchangeable acquisition methods
pub enum Strategy {
    Browser(BrowserStrategy),
    DirectoryApi(DirectoryApiStrategy),
}

impl Strategy {
    pub fn kind(&self) -> StrategyKind {
        match self {
            Strategy::Browser(_) => StrategyKind::Browser,
            Strategy::DirectoryApi(_) => StrategyKind::Api,
        }
    }

    /// Find and contact people at `target.company_name`
    pub async fn acquire(&self, target: &CampaignTarget, ctx: CampaignContext<'_>) -> OutreachResult<Acquisition> {
        match self {
            Strategy::Browser(strategy) => strategy.acquire(target, ctx).await,
            Strategy::DirectoryApi(strategy) => strategy.acquire(target, ctx).await,
        }
    }
}

impl From<BrowserStrategy> for Strategy {
    fn from(strategy: BrowserStrategy) -> Self {
        Strategy::Browser(strategy)
    }
}

impl From<DirectoryApiStrategy> for Strategy {
    fn from(strategy: DirectoryApiStrategy) -> Self {
        Strategy::DirectoryApi(strategy)
    }
}
