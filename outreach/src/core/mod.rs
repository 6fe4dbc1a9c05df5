//! Core campaign logic
//!
//! Counters, scoring, targeting, templates, recurrences and the phase machine.
//! Nothing here touches the network or the filesystem; the only side effect is
//! the timed wait in `DelayPolicy::pause`.

pub mod ledger;
pub mod pacing;
pub mod schedule;
pub mod scoring;
pub mod state;
pub mod targeting;
pub mod templates;

pub use ledger::{week_start, RateLimits, RateStats, RateWindowCounters};
pub use pacing::DelayPolicy;
pub use schedule::Recurrence;
pub use state::{CampaignPhase, CampaignSummary, CompanyError, CompanyOutcome, StrategyFailure};
pub use targeting::{SearchFilters, Targeting};
