//! Process-wide targeting configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Inclusive bounds, in milliseconds, for the pause between two outreach attempts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DelayRange {
    pub min_ms: u64,
    pub max_ms: u64,
}

impl DelayRange {
    pub fn new(min_ms: u64, max_ms: u64) -> Self {
        Self { min_ms, max_ms }.sanitized()
    }

    /// Swap bounds that were edited the wrong way round
    pub fn sanitized(self) -> Self {
        if self.min_ms <= self.max_ms {
            self
        } else {
            Self {
                min_ms: self.max_ms,
                max_ms: self.min_ms,
            }
        }
    }

    pub fn min(&self) -> Duration {
        Duration::from_millis(self.min_ms)
    }

    pub fn max(&self) -> Duration {
        Duration::from_millis(self.max_ms)
    }
}

impl Default for DelayRange {
    fn default() -> Self {
        Self {
            min_ms: 3_000,
            max_ms: 8_000,
        }
    }
}

/// Who to look for and how fast to reach out
///
/// Stored as editable JSON. Missing fields take their default values so older
/// profile files keep loading after new fields are introduced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TargetingProfile {
    pub preferred_titles: Vec<String>,
    pub preferred_industries: Vec<String>,
    pub exclude_titles: Vec<String>,
    pub company_sizes: Vec<String>,
    pub connection_delay_range: DelayRange,
    pub daily_target: u32,
    pub weekly_target: u32,
}

impl Default for TargetingProfile {
    fn default() -> Self {
        let strings = |items: &[&str]| items.iter().map(|s| s.to_string()).collect::<Vec<_>>();
        Self {
            preferred_titles: strings(&["CEO", "CTO", "Founder", "VP", "Director", "Head of", "Manager"]),
            preferred_industries: strings(&["Technology", "Software", "Financial Services"]),
            exclude_titles: strings(&["Intern", "Student", "Recruiter"]),
            company_sizes: strings(&["51-200", "201-500", "501-1000", "1001-5000"]),
            connection_delay_range: DelayRange::default(),
            daily_target: 100,
            weekly_target: 500,
        }
    }
}
