//! Relevance scoring for discovered candidates
//!
//! Scores are only comparable within one ranking call; there is no upper bound.

use shared::Candidate;

/// Points for each target title found in the candidate's title
const TITLE_MATCH_POINTS: i32 = 10;
const PREMIUM_POINTS: i32 = 2;
const INFLUENCER_POINTS: i32 = 3;

/// Points for network size, highest tier first
fn connection_points(connection_count: u32) -> i32 {
    match connection_count {
        c if c > 500 => 5,
        c if c > 200 => 3,
        c if c > 100 => 1,
        _ => 0,
    }
}

/// Relevance of one candidate against the desired titles
pub fn score(candidate: &Candidate, target_titles: &[String]) -> i32 {
    let title = candidate.title.to_lowercase();
    let title_points = target_titles
        .iter()
        .filter(|target| !target.is_empty() && title.contains(&target.to_lowercase()))
        .count() as i32
        * TITLE_MATCH_POINTS;

    let mut total = title_points + connection_points(candidate.connection_count);
    if candidate.is_premium {
        total += PREMIUM_POINTS;
    }
    if candidate.is_influencer {
        total += INFLUENCER_POINTS;
    }
    total
}

/// Order candidates by descending score; ties keep their input order
pub fn rank(candidates: Vec<Candidate>, target_titles: &[String]) -> Vec<Candidate> {
    let mut scored: Vec<(i32, Candidate)> = candidates
        .into_iter()
        .map(|candidate| (score(&candidate, target_titles), candidate))
        .collect();
    // sort_by is stable
    scored.sort_by(|a, b| b.0.cmp(&a.0));
    scored.into_iter().map(|(_, candidate)| candidate).collect()
}
