//! Day and week send counters
//!
//! Pure bookkeeping for the rate ledger. Days are calendar days in UTC and
//! weeks are ISO weeks keyed by their Monday, so a week bucket never needs an
//! explicit reset: once the calendar moves on, the old key simply stops being
//! queried.

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use shared::{OutreachRecord, TargetingProfile};
use std::collections::BTreeMap;

/// Monday of the ISO week containing `date`
pub fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.weekday().num_days_from_monday()))
}

/// Hard caps on sends per day and per week
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimits {
    pub daily_limit: u32,
    pub weekly_limit: u32,
}

impl RateLimits {
    pub fn new(daily_limit: u32, weekly_limit: u32) -> Self {
        Self {
            daily_limit,
            weekly_limit,
        }
    }

    pub fn from_profile(profile: &TargetingProfile) -> Self {
        Self::new(profile.daily_target, profile.weekly_target)
    }
}

impl Default for RateLimits {
    fn default() -> Self {
        Self::new(100, 500)
    }
}

/// Cached per-day and per-week counts of `Sent` records
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RateWindowCounters {
    pub daily_counts: BTreeMap<NaiveDate, u32>,
    pub weekly_counts: BTreeMap<NaiveDate, u32>,
    pub last_reset_date: Option<NaiveDate>,
}

impl RateWindowCounters {
    /// Rebuild counters from the full record history
    pub fn replay(records: &[OutreachRecord]) -> Self {
        let mut counters = Self::default();
        for record in records {
            counters.apply(record);
        }
        counters
    }

    /// Count a record; only `Sent` records move the counters
    pub fn apply(&mut self, record: &OutreachRecord) {
        if !record.is_sent() {
            return;
        }
        let date = record.date();
        *self.daily_counts.entry(date).or_insert(0) += 1;
        *self.weekly_counts.entry(week_start(date)).or_insert(0) += 1;
    }

    /// Start a fresh daily bucket when the calendar day changed
    ///
    /// Returns true when a reset happened. Sends already recorded for `today`
    /// (for example by another instance) are kept.
    pub fn roll_day(&mut self, today: NaiveDate) -> bool {
        if self.last_reset_date == Some(today) {
            return false;
        }
        self.daily_counts.entry(today).or_insert(0);
        self.last_reset_date = Some(today);
        true
    }

    /// Carry the reset marker over from counters held before a refresh
    pub fn keep_reset_marker(&mut self, previous: &Self) {
        self.last_reset_date = self.last_reset_date.max(previous.last_reset_date);
    }

    pub fn daily_count(&self, date: NaiveDate) -> u32 {
        self.daily_counts.get(&date).copied().unwrap_or(0)
    }

    pub fn weekly_count(&self, week_start: NaiveDate) -> u32 {
        self.weekly_counts.get(&week_start).copied().unwrap_or(0)
    }

    /// Admission predicate for `today`
    pub fn admits(&self, today: NaiveDate, limits: &RateLimits) -> bool {
        self.daily_count(today) < limits.daily_limit
            && self.weekly_count(week_start(today)) < limits.weekly_limit
    }

    /// Compare non-zero buckets, ignoring reset bookkeeping
    pub fn same_counts(&self, other: &Self) -> bool {
        fn non_zero(map: &BTreeMap<NaiveDate, u32>) -> Vec<(&NaiveDate, &u32)> {
            map.iter().filter(|(_, count)| **count > 0).collect()
        }
        non_zero(&self.daily_counts) == non_zero(&other.daily_counts)
            && non_zero(&self.weekly_counts) == non_zero(&other.weekly_counts)
    }
}

/// Read-only view printed by the `stats` command
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateStats {
    pub today: NaiveDate,
    pub week_start: NaiveDate,
    pub daily_count: u32,
    pub daily_limit: u32,
    pub daily_remaining: u32,
    pub weekly_count: u32,
    pub weekly_limit: u32,
    pub weekly_remaining: u32,
    pub can_send: bool,
    pub total_records: usize,
    pub counters: RateWindowCounters,
}

impl RateStats {
    pub fn compute(counters: &RateWindowCounters, total_records: usize, today: NaiveDate, limits: &RateLimits) -> Self {
        let week = week_start(today);
        let daily_count = counters.daily_count(today);
        let weekly_count = counters.weekly_count(week);
        Self {
            today,
            week_start: week,
            daily_count,
            daily_limit: limits.daily_limit,
            daily_remaining: limits.daily_limit.saturating_sub(daily_count),
            weekly_count,
            weekly_limit: limits.weekly_limit,
            weekly_remaining: limits.weekly_limit.saturating_sub(weekly_count),
            can_send: counters.admits(today, limits),
            total_records,
            counters: counters.clone(),
        }
    }
}
