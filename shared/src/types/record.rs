//! Durable outreach history entries

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Outcome of one attempted outreach action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutreachStatus {
    Sent,
    Skipped,
    Failed,
}

impl fmt::Display for OutreachStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutreachStatus::Sent => write!(f, "sent"),
            OutreachStatus::Skipped => write!(f, "skipped"),
            OutreachStatus::Failed => write!(f, "failed"),
        }
    }
}

/// One attempted send; written once and never edited
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutreachRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub person_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub company: String,
    pub timestamp: DateTime<Utc>,
    pub status: OutreachStatus,
}

impl OutreachRecord {
    pub fn new(company: impl Into<String>, timestamp: DateTime<Utc>, status: OutreachStatus) -> Self {
        Self {
            person_id: None,
            name: None,
            company: company.into(),
            timestamp,
            status,
        }
    }

    pub fn with_person_id(mut self, person_id: impl Into<String>) -> Self {
        self.person_id = Some(person_id.into());
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        if !name.is_empty() {
            self.name = Some(name);
        }
        self
    }

    /// Calendar day (UTC) the record counts against
    pub fn date(&self) -> NaiveDate {
        self.timestamp.date_naive()
    }

    pub fn is_sent(&self) -> bool {
        self.status == OutreachStatus::Sent
    }

    /// Person id when known, otherwise the display name
    pub fn contact(&self) -> &str {
        self.person_id
            .as_deref()
            .or(self.name.as_deref())
            .unwrap_or("unknown")
    }
}
