//! Campaign inputs and discovered candidates

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Acquisition method used to discover and contact people at a company
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    /// Interactive browser session driven over WebDriver
    Browser,
    /// Programmatic contact directory plus outreach channel
    Api,
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StrategyKind::Browser => write!(f, "browser"),
            StrategyKind::Api => write!(f, "api"),
        }
    }
}

impl FromStr for StrategyKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "browser" | "selenium" | "webdriver" => Ok(StrategyKind::Browser),
            "api" | "directory" => Ok(StrategyKind::Api),
            _ => Err(format!("Unknown strategy: {s}")),
        }
    }
}

/// Invitation note template
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TemplateId {
    #[default]
    Standard,
    Industry,
    Leadership,
    Alumni,
}

impl TemplateId {
    pub const ALL: [TemplateId; 4] = [
        TemplateId::Standard,
        TemplateId::Industry,
        TemplateId::Leadership,
        TemplateId::Alumni,
    ];
}

impl fmt::Display for TemplateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TemplateId::Standard => write!(f, "standard"),
            TemplateId::Industry => write!(f, "industry"),
            TemplateId::Leadership => write!(f, "leadership"),
            TemplateId::Alumni => write!(f, "alumni"),
        }
    }
}

impl FromStr for TemplateId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TemplateId::ALL
            .into_iter()
            .find(|id| id.to_string() == s.to_lowercase())
            .ok_or_else(|| format!("Unknown template: {s}"))
    }
}

/// One company's pass through a campaign
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CampaignTarget {
    pub company_name: String,
    pub max_connections: u32,
    pub strategy_preference: StrategyKind,
    pub target_titles: Vec<String>,
    pub target_industries: Vec<String>,
    pub exclude_titles: Vec<String>,
    pub min_connections: u32,
    pub message_template: TemplateId,
}

impl CampaignTarget {
    /// Target with no title or industry preferences
    pub fn new(company_name: impl Into<String>, max_connections: u32) -> Self {
        Self {
            company_name: company_name.into(),
            max_connections,
            strategy_preference: StrategyKind::Browser,
            target_titles: Vec::new(),
            target_industries: Vec::new(),
            exclude_titles: Vec::new(),
            min_connections: 0,
            message_template: TemplateId::default(),
        }
    }

    pub fn with_strategy(mut self, strategy: StrategyKind) -> Self {
        self.strategy_preference = strategy;
        self
    }

    pub fn with_titles(mut self, titles: Vec<String>) -> Self {
        self.target_titles = titles;
        self
    }

    pub fn with_industries(mut self, industries: Vec<String>) -> Self {
        self.target_industries = industries;
        self
    }

    pub fn with_excluded_titles(mut self, titles: Vec<String>) -> Self {
        self.exclude_titles = titles;
        self
    }

    pub fn with_min_connections(mut self, min_connections: u32) -> Self {
        self.min_connections = min_connections;
        self
    }

    pub fn with_template(mut self, template: TemplateId) -> Self {
        self.message_template = template;
        self
    }
}

/// A discovered person who may be sent a connection request
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Candidate {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub title: String,
    pub industry: String,
    pub connection_count: u32,
    pub is_premium: bool,
    pub is_influencer: bool,
}

impl Candidate {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name).trim().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strategy_kind_parsing() {
        assert_eq!("Browser".parse::<StrategyKind>().unwrap(), StrategyKind::Browser);
        assert_eq!("api".parse::<StrategyKind>().unwrap(), StrategyKind::Api);
        assert!("carrier-pigeon".parse::<StrategyKind>().is_err());
    }

    #[test]
    fn test_template_id_round_trips_through_display() {
        for id in TemplateId::ALL {
            assert_eq!(id.to_string().parse::<TemplateId>().unwrap(), id);
        }
    }

    #[test]
    fn test_candidate_deserializes_with_missing_fields() {
        let candidate: Candidate = serde_json::from_str(r#"{"id":"p1","first_name":"Ada"}"#).unwrap();
        assert_eq!(candidate.id, "p1");
        assert_eq!(candidate.connection_count, 0);
        assert_eq!(candidate.full_name(), "Ada");
    }
}
