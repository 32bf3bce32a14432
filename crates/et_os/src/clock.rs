#![forbid(unsafe_code)]

use chrono::{NaiveDate, SecondsFormat, Utc};

pub trait CaseClock: Send + Sync {
    fn today(&self) -> NaiveDate;
    fn now_rfc3339(&self) -> String;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl CaseClock for SystemClock {
    fn today(&self) -> NaiveDate {
        Utc::now().date_naive()
    }

    fn now_rfc3339(&self) -> String {
        Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
    }
}

/// Pinned clock for replaying callbacks deterministically.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock {
    pub today: NaiveDate,
}

impl CaseClock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.today
    }

    fn now_rfc3339(&self) -> String {
        format!("{}T00:00:00.000Z", self.today.format("%Y-%m-%d"))
    }
}
