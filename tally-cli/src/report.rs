//! Plain-text tables for the terminal.

use std::collections::BTreeMap;
use std::fmt::Write;
use tally_core::{CategoryForecast, CategoryTotal, MonthlyTotal, Transaction};
use tally_store::{ImportReport, PurgeReport};

pub fn months(totals: &[MonthlyTotal]) -> String {
    if totals.is_empty() {
        return "(no data)\n".to_string();
    }
    let mut out = String::new();
    for m in totals {
        let _ = writeln!(out, "{}  {:>12.2}", m.period_key, m.total);
    }
    out
}

pub fn categories(totals: &[CategoryTotal]) -> String {
    let width = label_width(totals.iter().map(|t| t.category.as_str()));
    let mut out = String::new();
    for t in totals {
        let _ = writeln!(out, "{:<width$}  {:>12.2}", t.category, t.total);
    }
    out
}

pub fn sub_categories(totals: &BTreeMap<String, f64>) -> String {
    if totals.is_empty() {
        return "(no data)\n".to_string();
    }
    let width = label_width(totals.keys().map(String::as_str));
    let mut out = String::new();
    for (label, total) in totals {
        let _ = writeln!(out, "{label:<width$}  {total:>12.2}");
    }
    out
}

pub fn forecasts(forecasts: &[CategoryForecast]) -> String {
    let width = label_width(forecasts.iter().map(|f| f.category.as_str()));
    let mut out = String::new();
    for f in forecasts {
        let _ = write!(out, "{:<width$}", f.category);
        if f.points.is_empty() {
            out.push_str("  (no history)");
        }
        for p in &f.points {
            let _ = write!(out, "  {} {:>10.2}", p.period_label, p.predicted_amount);
        }
        out.push('\n');
    }
    out
}

/// One line per record, prefixed with its collection so the id can be used
/// with `recategorize` and `delete`.
pub fn listing(records: &[(&str, Transaction)]) -> String {
    if records.is_empty() {
        return "(no records)\n".to_string();
    }
    let mut out = String::new();
    for (collection, tx) in records {
        let _ = writeln!(
            out,
            "{:<8} {:<12} {}  {:>12.2}  {} / {}",
            collection, tx.id, tx.date, tx.amount, tx.category, tx.sub_category
        );
    }
    out
}

pub fn import(report: &ImportReport) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Imported {} record(s), {} rejected, {} failed to save ({:?})",
        report.persisted.committed.len(),
        report.rejected.len(),
        report.persisted.failed.len(),
        report.outcome
    );
    for r in &report.rejected {
        let _ = writeln!(out, "  rejected {r}");
    }
    for f in &report.persisted.failed {
        let _ = writeln!(out, "  not saved {} (#{}): {}", f.row_id, f.index + 1, f.error);
    }
    out
}

pub fn purge(collection: &str, report: &PurgeReport) -> String {
    let mut out = format!(
        "Deleted {} of {} record(s) from {}\n",
        report.deleted, report.attempted, collection
    );
    for f in &report.failures {
        let _ = writeln!(out, "  not deleted {}: {}", f.id, f.error);
    }
    out
}

fn label_width<'a>(labels: impl Iterator<Item = &'a str>) -> usize {
    labels.map(|l| l.chars().count()).max().unwrap_or(0)
}
