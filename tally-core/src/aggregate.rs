//! Grouping and summing of transactions along time and category dimensions.
//!
//! Everything here is a pure function over a slice of transactions. Callers
//! apply their own filters (for example income exclusion) beforehand.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use crate::category::CategoryAxis;
use crate::transaction::Transaction;

/// Total for one `YYYY-MM` period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyTotal {
    pub period_key: String,
    pub total: f64,
}

/// Total for one category label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryTotal {
    pub category: String,
    pub total: f64,
}

/// Signed totals per month, in first-appearance order of each period.
///
/// Sort the input with [`chronological`] first if the output must be chronological.
pub fn sum_by_month(transactions: &[Transaction]) -> Vec<MonthlyTotal> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut out: Vec<MonthlyTotal> = Vec::new();

    for tx in transactions {
        let key = tx.period_key();
        match index.get(&key) {
            Some(&i) => out[i].total += tx.amount,
            None => {
                index.insert(key.clone(), out.len());
                out.push(MonthlyTotal {
                    period_key: key,
                    total: tx.amount,
                });
            }
        }
    }

    out
}

/// Absolute totals for every label on the axis, in axis order, zero-filled.
pub fn sum_by_category(transactions: &[Transaction], axis: &CategoryAxis) -> Vec<CategoryTotal> {
    axis.iter()
        .map(|label| CategoryTotal {
            category: label.to_string(),
            total: transactions
                .iter()
                .filter(|tx| tx.category.is(label))
                .map(Transaction::abs_amount)
                .sum(),
        })
        .collect()
}

/// Absolute totals per sub-category label (the drill-down view).
pub fn sum_by_sub_category(transactions: &[Transaction]) -> BTreeMap<String, f64> {
    let mut totals: BTreeMap<String, f64> = BTreeMap::new();
    for tx in transactions {
        *totals
            .entry(tx.sub_category.label().to_string())
            .or_insert(0.0) += tx.abs_amount();
    }
    totals
}

/// Absolute totals for the categories present in the data, first-appearance
/// order, rounded to cents.
pub fn sum_by_observed_category(transactions: &[Transaction]) -> Vec<CategoryTotal> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut out: Vec<CategoryTotal> = Vec::new();

    for tx in transactions {
        let label = tx.category.label();
        match index.get(label) {
            Some(&i) => out[i].total += tx.abs_amount(),
            None => {
                index.insert(label, out.len());
                out.push(CategoryTotal {
                    category: label.to_string(),
                    total: tx.abs_amount(),
                });
            }
        }
    }

    for total in &mut out {
        total.total = round2(total.total);
    }
    out
}

/// Drop every transaction whose category equals `label`.
pub fn exclude_category(transactions: &[Transaction], label: &str) -> Vec<Transaction> {
    transactions
        .iter()
        .filter(|tx| !tx.category.is(label))
        .cloned()
        .collect()
}

/// Stable sort, oldest first.
pub fn chronological(transactions: &[Transaction]) -> Vec<Transaction> {
    let mut sorted = transactions.to_vec();
    sorted.sort_by_key(|tx| tx.date);
    sorted
}

/// Stable sort, newest first (listing order).
pub fn newest_first(transactions: &[Transaction]) -> Vec<Transaction> {
    let mut sorted = transactions.to_vec();
    sorted.sort_by(|a, b| b.date.cmp(&a.date));
    sorted
}

/// Round to two decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
