//! Rate-limited outreach campaigns
//!
//! This library runs connection-request campaigns against a list of companies.
//! A persistent rate ledger caps daily and weekly sends, candidates are scored
//! and filtered by a targeting profile, and each company is worked through an
//! interactive browser strategy with a directory-API fallback.

pub mod config;
pub mod core;
pub mod error;
pub mod ledger;
pub mod orchestrator;
pub mod scheduler;
pub mod services;
pub mod strategies;
pub mod traits;

// Re-export commonly used types
pub use config::OutreachConfig;
pub use core::{CampaignPhase, CampaignSummary, CompanyOutcome, DelayPolicy, RateLimits, RateStats, Recurrence, Targeting};
pub use error::{OutreachError, OutreachResult};
pub use ledger::RateLedger;
pub use orchestrator::CampaignOrchestrator;
pub use scheduler::{ScheduleHandle, Scheduler};
pub use strategies::{Acquisition, BrowserStrategy, DirectoryApiStrategy, StopReason, Strategy};
pub use traits::{BrowserSession, CampaignLogStore, Clock, ContactDirectory, OutreachChannel};
