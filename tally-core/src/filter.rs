//! Year / month / category filtering and the dashboard period queries.
//!
//! Each dimension is an independent predicate; a transaction passes a
//! `Filter` when it passes all three, so the order in which dimensions are
//! narrowed never changes the result.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::category::LabelPolicy;
use crate::transaction::Transaction;

/// Sentinel accepted on the command line and in configs for "no constraint".
pub const ALL: &str = "All";

/// Either a concrete value or no constraint on the dimension.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Selector<T> {
    All,
    Only(T),
}

impl<T> Default for Selector<T> {
    fn default() -> Self {
        Selector::All
    }
}

impl<T: PartialEq> Selector<T> {
    pub fn admits(&self, value: &T) -> bool {
        match self {
            Selector::All => true,
            Selector::Only(v) => v == value,
        }
    }
}

impl<T> Selector<T> {
    pub fn as_option(&self) -> Option<&T> {
        match self {
            Selector::All => None,
            Selector::Only(v) => Some(v),
        }
    }
}

impl<T: FromStr> FromStr for Selector<T> {
    type Err = T::Err;

    /// The value itself is parsed untouched; see [`Selector::labelled`].
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case(ALL) {
            return Ok(Selector::All);
        }
        s.parse().map(Selector::Only)
    }
}

impl Selector<String> {
    /// Clean a category selector the way stored labels were cleaned, so
    /// `"Loisirs "` only matches itself under `LabelPolicy::Verbatim`.
    pub fn labelled(self, policy: LabelPolicy) -> Self {
        match self {
            Selector::All => Selector::All,
            Selector::Only(label) => Selector::Only(policy.apply(&label).to_string()),
        }
    }
}

impl<T: fmt::Display> fmt::Display for Selector<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selector::All => f.write_str(ALL),
            Selector::Only(v) => write!(f, "{v}"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Filter {
    pub year: Selector<i32>,
    pub month: Selector<u32>,
    pub category: Selector<String>,
}

impl Filter {
    /// A filter that admits everything.
    pub fn all() -> Self {
        Self::default()
    }

    pub fn with_year(mut self, year: i32) -> Self {
        self.year = Selector::Only(year);
        self
    }

    pub fn with_month(mut self, month: u32) -> Self {
        self.month = Selector::Only(month);
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Selector::Only(category.into());
        self
    }

    pub fn matches(&self, tx: &Transaction) -> bool {
        let category_ok = match &self.category {
            Selector::All => true,
            Selector::Only(label) => tx.category.is(label),
        };
        self.year.admits(&tx.year()) && self.month.admits(&tx.month()) && category_ok
    }

    pub fn apply(&self, transactions: &[Transaction]) -> Vec<Transaction> {
        transactions
            .iter()
            .filter(|tx| self.matches(tx))
            .cloned()
            .collect()
    }
}

/// Distinct years present, most recent first.
pub fn available_years(transactions: &[Transaction]) -> Vec<i32> {
    let years: BTreeSet<i32> = transactions.iter().map(Transaction::year).collect();
    years.into_iter().rev().collect()
}

/// Distinct months (1-12) present within `year`, ascending.
pub fn available_months(transactions: &[Transaction], year: i32) -> Vec<u32> {
    let months: BTreeSet<u32> = transactions
        .iter()
        .filter(|tx| tx.year() == year)
        .map(Transaction::month)
        .filter(|m| (1..=12).contains(m))
        .collect();
    months.into_iter().collect()
}

/// Non-fatal notice attached to a period selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PeriodAdvisory {
    /// The requested month had no data; `selected` is the latest month that does.
    FellBack { requested: u32, selected: u32 },
    /// The year has no data at all.
    NoData { year: i32 },
}

impl fmt::Display for PeriodAdvisory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PeriodAdvisory::FellBack { requested, selected } => write!(
                f,
                "no data for month {requested:02}; showing month {selected:02} instead"
            ),
            PeriodAdvisory::NoData { year } => write!(f, "no data for {year}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodSelection {
    pub year: i32,
    /// `None` only when the year has no data.
    pub month: Option<u32>,
    pub advisory: Option<PeriodAdvisory>,
}

/// Pick the dashboard month for `year`: today's month when it has data,
/// otherwise the most recent month that does.
pub fn current_period(transactions: &[Transaction], year: i32, today: NaiveDate) -> PeriodSelection {
    let months = available_months(transactions, year);
    let requested = today.month();

    if months.contains(&requested) {
        return PeriodSelection {
            year,
            month: Some(requested),
            advisory: None,
        };
    }

    match months.last() {
        Some(&latest) => PeriodSelection {
            year,
            month: Some(latest),
            advisory: Some(PeriodAdvisory::FellBack {
                requested,
                selected: latest,
            }),
        },
        None => PeriodSelection {
            year,
            month: None,
            advisory: Some(PeriodAdvisory::NoData { year }),
        },
    }
}
