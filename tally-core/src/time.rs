//! Time policy: the one fixed timezone used to turn instants into calendar dates.
//!
//! Epoch-second timestamps, offset timestamps and "today" all go through a
//! `TimePolicy`, so year/month filtering never depends on the host's local zone.

use anyhow::Result;
use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use chrono_tz::Tz;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TimePolicy {
    #[default]
    Utc,
    /// An IANA zone such as `Europe/Paris`.
    Zone(Tz),
}

impl TimePolicy {
    /// Calendar date of a UTC instant under this policy.
    pub fn date_of(&self, instant: DateTime<Utc>) -> NaiveDate {
        match self {
            TimePolicy::Utc => instant.date_naive(),
            TimePolicy::Zone(tz) => instant.with_timezone(tz).date_naive(),
        }
    }

    pub fn date_of_offset(&self, instant: DateTime<FixedOffset>) -> NaiveDate {
        self.date_of(instant.with_timezone(&Utc))
    }

    /// `None` when the timestamp is outside chrono's representable range.
    pub fn date_of_epoch_seconds(&self, secs: i64) -> Option<NaiveDate> {
        DateTime::from_timestamp(secs, 0).map(|utc| self.date_of(utc))
    }

    pub fn today(&self) -> NaiveDate {
        self.date_of(Utc::now())
    }
}

impl FromStr for TimePolicy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("utc") || s.is_empty() {
            return Ok(TimePolicy::Utc);
        }
        let tz: Tz = s
            .parse()
            .map_err(|_| anyhow::anyhow!("invalid timezone: {s}"))?;
        Ok(TimePolicy::Zone(tz))
    }
}

impl fmt::Display for TimePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimePolicy::Utc => f.write_str("UTC"),
            TimePolicy::Zone(tz) => f.write_str(tz.name()),
        }
    }
}
