//! Recurrence rules for scheduled campaigns
//!
//! All rules fire at 09:00 local time; only the set of days differs.

use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, Weekday};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Wall-clock time at which every recurrence fires
pub const FIRE_HOUR: u32 = 9;

/// Longest gap between two firing days of any rule, plus slack
const MAX_SEARCH_DAYS: usize = 62;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Recurrence {
    /// Every day
    Daily,
    /// Every Monday
    Weekly,
    /// The 1st and the 15th of each month
    Biweekly,
    /// Monday to Friday
    BusinessDays,
}

impl Recurrence {
    pub fn fire_time() -> NaiveTime {
        NaiveTime::from_hms_opt(FIRE_HOUR, 0, 0).unwrap_or(NaiveTime::MIN)
    }

    /// Whether the rule fires at all on `date`
    pub fn fires_on(&self, date: NaiveDate) -> bool {
        match self {
            Recurrence::Daily => true,
            Recurrence::Weekly => date.weekday() == Weekday::Mon,
            Recurrence::Biweekly => date.day() == 1 || date.day() == 15,
            Recurrence::BusinessDays => !matches!(date.weekday(), Weekday::Sat | Weekday::Sun),
        }
    }

    /// First firing strictly after `after`
    pub fn next_fire_after(&self, after: NaiveDateTime) -> Option<NaiveDateTime> {
        let mut date = after.date();
        for _ in 0..MAX_SEARCH_DAYS {
            let fire_at = date.and_time(Self::fire_time());
            if self.fires_on(date) && fire_at > after {
                return Some(fire_at);
            }
            date = date.succ_opt()?;
        }
        None
    }

    /// Human readable description used in logs
    pub fn describe(&self) -> &'static str {
        match self {
            Recurrence::Daily => "09:00 every day",
            Recurrence::Weekly => "09:00 every Monday",
            Recurrence::Biweekly => "09:00 on the 1st and 15th",
            Recurrence::BusinessDays => "09:00 Monday to Friday",
        }
    }
}

impl fmt::Display for Recurrence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Recurrence::Daily => write!(f, "daily"),
            Recurrence::Weekly => write!(f, "weekly"),
            Recurrence::Biweekly => write!(f, "biweekly"),
            Recurrence::BusinessDays => write!(f, "business-days"),
        }
    }
}

impl FromStr for Recurrence {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('_', "-").as_str() {
            "daily" => Ok(Recurrence::Daily),
            "weekly" => Ok(Recurrence::Weekly),
            "biweekly" => Ok(Recurrence::Biweekly),
            "business-days" | "weekdays" => Ok(Recurrence::BusinessDays),
            other => Err(format!(
                "Unknown recurrence '{other}' (expected daily, weekly, biweekly or business-days)"
            )),
        }
    }
}
