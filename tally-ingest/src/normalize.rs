//! Raw row → canonical `Transaction`.
//!
//! Date resolution order:
//!   1. text containing `/`  → day/month/year
//!   2. spreadsheet serial   → 1970-01-01 + (serial - 25569) days
//!   3. any other value      → general parser (RFC 3339, ISO date/time), epoch
//!      seconds and native dates through the time policy
//!   4. missing              → the normalizer's `today`
//!
//! `today` is captured when the normalizer is built, so `normalize` is a pure
//! function of its inputs.

use chrono::{DateTime, Days, NaiveDate, NaiveDateTime};
use regex::Regex;
use tally_core::{Category, LabelPolicy, TimePolicy, Transaction};

use crate::error::{IngestError, RejectReason, RejectedRow};
use crate::types::{RawAmount, RawDate, RawRow};

/// Serial day number of 1970-01-01 in spreadsheet date systems.
pub const SERIAL_UNIX_EPOCH: f64 = 25569.0;

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

#[derive(Debug, Clone)]
pub struct Normalizer {
    time: TimePolicy,
    labels: LabelPolicy,
    today: NaiveDate,
    amount_re: Regex,
}

/// Result of normalizing a whole sheet.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizedBatch {
    pub transactions: Vec<Transaction>,
    pub rejected: Vec<RejectedRow>,
}

impl NormalizedBatch {
    pub fn total_rows(&self) -> usize {
        self.transactions.len() + self.rejected.len()
    }

    /// Every row was rejected (and there was at least one).
    pub fn is_total_failure(&self) -> bool {
        self.transactions.is_empty() && !self.rejected.is_empty()
    }
}

impl Normalizer {
    /// Normalizer whose missing dates default to today under `time`.
    pub fn new(time: TimePolicy, labels: LabelPolicy) -> Result<Self, IngestError> {
        Self::with_today(time, labels, time.today())
    }

    pub fn with_today(
        time: TimePolicy,
        labels: LabelPolicy,
        today: NaiveDate,
    ) -> Result<Self, IngestError> {
        // Leading decimal number; anything after it is ignored.
        let amount_re = Regex::new(r"^\s*([+-]?(?:\d+(?:\.\d*)?|\.\d+)(?:[eE][+-]?\d+)?)")?;
        Ok(Self {
            time,
            labels,
            today,
            amount_re,
        })
    }

    pub fn normalize(&self, row: &RawRow, owner_id: &str) -> Result<Transaction, RejectedRow> {
        let reject = |reason| RejectedRow {
            row: row.row,
            reason,
        };

        let date = self.resolve_date(row.date.as_ref()).map_err(reject)?;
        let amount = self.resolve_amount(row.amount.as_ref()).map_err(reject)?;

        Ok(Transaction::new(
            format!("local-{}", row.row),
            date,
            amount,
            Category::from_raw(row.category.as_deref(), self.labels),
            Category::from_raw(row.sub_category.as_deref(), self.labels),
            owner_id,
        ))
    }

    /// Normalize rows in order; a rejected row never affects the others.
    pub fn normalize_batch(&self, rows: &[RawRow], owner_id: &str) -> NormalizedBatch {
        let mut batch = NormalizedBatch::default();
        for row in rows {
            match self.normalize(row, owner_id) {
                Ok(tx) => batch.transactions.push(tx),
                Err(rejected) => batch.rejected.push(rejected),
            }
        }
        batch
    }

    pub fn resolve_date(&self, raw: Option<&RawDate>) -> Result<NaiveDate, RejectReason> {
        match raw {
            None => Ok(self.today),
            Some(RawDate::IsoLike(s)) if s.contains('/') => {
                parse_day_month_year(s).ok_or_else(|| RejectReason::InvalidDate(s.clone()))
            }
            Some(RawDate::Serial(serial)) => {
                serial_to_date(*serial).ok_or_else(|| RejectReason::InvalidDate(serial.to_string()))
            }
            Some(RawDate::IsoLike(s)) => self
                .parse_general(s)
                .ok_or_else(|| RejectReason::InvalidDate(s.clone())),
            Some(RawDate::EpochSeconds(secs)) => self
                .time
                .date_of_epoch_seconds(*secs)
                .ok_or_else(|| RejectReason::InvalidDate(secs.to_string())),
            Some(RawDate::Native(date)) => Ok(*date),
        }
    }

    /// First `,` becomes `.`, then the leading number is parsed. A missing
    /// amount is zero.
    pub fn resolve_amount(&self, raw: Option<&RawAmount>) -> Result<f64, RejectReason> {
        let text = match raw {
            None => return Ok(0.0),
            Some(RawAmount::Number(n)) if n.is_finite() => return Ok(*n),
            Some(RawAmount::Number(n)) => return Err(RejectReason::InvalidAmount(n.to_string())),
            Some(RawAmount::Text(s)) => s,
        };

        let replaced = text.replacen(',', ".", 1);
        self.amount_re
            .captures(&replaced)
            .and_then(|caps| caps[1].parse::<f64>().ok())
            .filter(|n| n.is_finite())
            .ok_or_else(|| RejectReason::InvalidAmount(text.clone()))
    }

    fn parse_general(&self, s: &str) -> Option<NaiveDate> {
        let s = s.trim();

        if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
            return Some(self.time.date_of_offset(dt));
        }
        for fmt in DATETIME_FORMATS {
            if let Ok(ndt) = NaiveDateTime::parse_from_str(s, fmt) {
                return Some(ndt.date());
            }
        }
        NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
    }
}

/// `dd/mm/yyyy`: exactly three numeric components, day first, four-digit year.
fn parse_day_month_year(s: &str) -> Option<NaiveDate> {
    let parts: Vec<&str> = s.trim().split('/').map(str::trim).collect();
    if parts.len() != 3 || parts[2].len() != 4 {
        return None;
    }
    let d: u32 = parts[0].parse().ok()?;
    let m: u32 = parts[1].parse().ok()?;
    let y: i32 = parts[2].parse().ok()?;
    NaiveDate::from_ymd_opt(y, m, d)
}

fn serial_to_date(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() {
        return None;
    }
    let offset = (serial - SERIAL_UNIX_EPOCH).floor();
    // Well beyond chrono's range either way.
    if offset.abs() > 1e9 {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1970, 1, 1)?;
    let days = offset as i64;
    if days >= 0 {
        epoch.checked_add_days(Days::new(days as u64))
    } else {
        epoch.checked_sub_days(Days::new(days.unsigned_abs()))
    }
}
