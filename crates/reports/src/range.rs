//! Time windows for movement-derived reports.

use chrono::{DateTime, Duration, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

/// Time window a report covers, evaluated against a caller-supplied `now`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DateRange {
    #[default]
    All,
    Today,
    Yesterday,
    #[serde(rename = "week")]
    PastWeek,
    #[serde(rename = "month")]
    PastMonth,
}

impl DateRange {
    /// Whether a timestamp falls inside this range as of `now`.
    ///
    /// Day boundaries are midnight UTC. "Past week" and "past month"
    /// reach back 7 and 30 days from today's midnight and are open-ended
    /// toward now.
    pub fn contains(&self, ts: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        let today = midnight(now);
        match self {
            DateRange::All => true,
            DateRange::Today => ts >= today,
            DateRange::Yesterday => ts >= today - Duration::days(1) && ts < today,
            DateRange::PastWeek => ts >= today - Duration::days(7),
            DateRange::PastMonth => ts >= today - Duration::days(30),
        }
    }

    /// Label recorded in report headers and CSV preambles.
    pub fn as_str(&self) -> &'static str {
        match self {
            DateRange::All => "all",
            DateRange::Today => "today",
            DateRange::Yesterday => "yesterday",
            DateRange::PastWeek => "week",
            DateRange::PastMonth => "month",
        }
    }
}

impl core::fmt::Display for DateRange {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

fn midnight(now: DateTime<Utc>) -> DateTime<Utc> {
    now.date_naive().and_time(NaiveTime::MIN).and_utc()
}
