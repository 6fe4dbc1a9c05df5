//! Test fixtures and data for campaign tests
//!
//! This module provides consistent test data used across all test suites.

use chrono::{DateTime, TimeZone, Utc};
use outreach::traits::ProfileCard;
use shared::{CampaignTarget, Candidate, StrategyKind};

/// Standard test data and fixtures
pub struct TestFixtures;

impl TestFixtures {
    pub const ACME: &'static str = "Acme";
    pub const GLOBEX: &'static str = "Globex";
    pub const INITECH: &'static str = "Initech";

    /// Wednesday 6 March 2024, 10:00 UTC
    pub fn wednesday() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 6, 10, 0, 0).unwrap()
    }

    /// Monday 4 March 2024, 08:00 UTC
    pub fn monday_morning() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 4, 8, 0, 0).unwrap()
    }

    /// Friday 8 March 2024, 08:00 UTC
    pub fn friday_morning() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 8, 8, 0, 0).unwrap()
    }

    pub fn candidate(id: &str, title: &str, connections: u32) -> Candidate {
        Candidate {
            id: id.to_string(),
            first_name: format!("First{id}"),
            last_name: format!("Last{id}"),
            title: title.to_string(),
            industry: "Technology".to_string(),
            connection_count: connections,
            ..Candidate::default()
        }
    }

    /// Directory results with a mix of seniority and network size
    pub fn candidates(count: usize) -> Vec<Candidate> {
        (0..count)
            .map(|i| Self::candidate(&format!("p{i}"), "Director of Engineering", 150 + i as u32 * 100))
            .collect()
    }

    pub fn card(id: &str, connectable: bool) -> ProfileCard {
        ProfileCard {
            card_id: id.to_string(),
            name: format!("Card {id}"),
            title: "VP Sales".to_string(),
            connect_handle: connectable.then(|| format!("handle-{id}")),
        }
    }

    pub fn cards(ids: &[&str]) -> Vec<ProfileCard> {
        ids.iter().map(|id| Self::card(id, true)).collect()
    }

    pub fn api_target(company: &str, max: u32) -> CampaignTarget {
        CampaignTarget::new(company, max).with_strategy(StrategyKind::Api)
    }

    pub fn browser_target(company: &str, max: u32) -> CampaignTarget {
        CampaignTarget::new(company, max).with_strategy(StrategyKind::Browser)
    }
}
