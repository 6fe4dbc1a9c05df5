//! Targeting layer
//!
//! Turns the process-wide `TargetingProfile` into per-company targets, search
//! filters, candidate selection, invitation notes and pacing. Strategies get
//! all of their "who and how" decisions from here and only own the mechanics
//! of reaching people.

use serde::{Deserialize, Serialize};
use shared::{CampaignTarget, Candidate, StrategyKind, TargetingProfile, TemplateId};

use super::pacing::DelayPolicy;
use super::{scoring, templates};

/// Criteria forwarded to the contact directory with a search
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchFilters {
    pub titles: Vec<String>,
    pub industries: Vec<String>,
    pub exclude_titles: Vec<String>,
    pub min_connections: u32,
}

impl SearchFilters {
    pub fn for_target(target: &CampaignTarget) -> Self {
        Self {
            titles: target.target_titles.clone(),
            industries: target.target_industries.clone(),
            exclude_titles: target.exclude_titles.clone(),
            min_connections: target.min_connections,
        }
    }
}

fn contains_any(haystack: &str, needles: &[String]) -> bool {
    let haystack = haystack.to_lowercase();
    needles
        .iter()
        .filter(|needle| !needle.is_empty())
        .any(|needle| haystack.contains(&needle.to_lowercase()))
}

/// Scoring, filtering, templating and pacing decisions for a campaign
#[derive(Debug, Clone, Default)]
pub struct Targeting {
    profile: TargetingProfile,
}

impl Targeting {
    pub fn new(profile: TargetingProfile) -> Self {
        Self { profile }
    }

    pub fn profile(&self) -> &TargetingProfile {
        &self.profile
    }

    /// Build a company target pre-filled with the profile's preferences
    pub fn target_for(
        &self,
        company: impl Into<String>,
        max_connections: u32,
        strategy: StrategyKind,
        template: TemplateId,
    ) -> CampaignTarget {
        CampaignTarget::new(company, max_connections)
            .with_strategy(strategy)
            .with_titles(self.profile.preferred_titles.clone())
            .with_industries(self.profile.preferred_industries.clone())
            .with_excluded_titles(self.profile.exclude_titles.clone())
            .with_template(template)
    }

    /// Advanced filter: title/industry inclusion, exclusions and minimum network size
    ///
    /// Candidates with no industry on file are not rejected for it.
    pub fn passes(&self, candidate: &Candidate, target: &CampaignTarget) -> bool {
        if contains_any(&candidate.title, &target.exclude_titles) {
            return false;
        }
        if candidate.connection_count < target.min_connections {
            return false;
        }
        if !target.target_titles.is_empty() && !contains_any(&candidate.title, &target.target_titles) {
            return false;
        }
        if !target.target_industries.is_empty()
            && !candidate.industry.trim().is_empty()
            && !contains_any(&candidate.industry, &target.target_industries)
        {
            return false;
        }
        true
    }

    /// Optionally filter, then rank by relevance
    pub fn select(&self, candidates: Vec<Candidate>, target: &CampaignTarget, advanced_filters: bool) -> Vec<Candidate> {
        let candidates = if advanced_filters {
            candidates
                .into_iter()
                .filter(|candidate| self.passes(candidate, target))
                .collect()
        } else {
            candidates
        };
        scoring::rank(candidates, &target.target_titles)
    }

    /// Invitation note for one candidate
    pub fn note_for(&self, target: &CampaignTarget, candidate: &Candidate) -> String {
        templates::render(target.message_template, candidate, &target.company_name)
    }

    /// Pause between two attempts within one company
    pub fn attempt_delay(&self) -> DelayPolicy {
        DelayPolicy::from_range(self.profile.connection_delay_range)
    }
}
