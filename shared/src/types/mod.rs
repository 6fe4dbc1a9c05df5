//! Core types used throughout the outreach system

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

pub mod campaign;
pub mod profile;
pub mod record;

pub use campaign::{CampaignTarget, Candidate, StrategyKind, TemplateId};
pub use profile::{DelayRange, TargetingProfile};
pub use record::{OutreachRecord, OutreachStatus};

/// Global process ID singleton - set once at startup
static PROCESS_ID: OnceLock<ProcessId> = OnceLock::new();

/// Identifies how the running process was started
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProcessId {
    /// One-shot command line invocation (connect, campaign, stats, profile)
    Cli,
    /// Long-running scheduler process
    Daemon,
}

impl ProcessId {
    /// Initialize the global process ID for a one-shot command
    pub fn init_cli() -> &'static ProcessId {
        PROCESS_ID.get_or_init(|| ProcessId::Cli)
    }

    /// Initialize the global process ID for the scheduler daemon
    pub fn init_daemon() -> &'static ProcessId {
        PROCESS_ID.get_or_init(|| ProcessId::Daemon)
    }

    /// Get the global process ID, falling back to `Cli` when nothing was initialized
    pub fn current() -> &'static ProcessId {
        PROCESS_ID.get().unwrap_or(&ProcessId::Cli)
    }
}

impl fmt::Display for ProcessId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProcessId::Cli => write!(f, "cli"),
            ProcessId::Daemon => write!(f, "daemon"),
        }
    }
}

impl Default for ProcessId {
    fn default() -> Self {
        ProcessId::Cli
    }
}
