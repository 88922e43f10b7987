use chrono::NaiveDate;
use std::path::PathBuf;
use tally_core::{Category, LabelPolicy, TimePolicy};
use tally_ingest::{Normalizer, RejectReason, read_rows};

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn normalizer() -> Normalizer {
    Normalizer::with_today(TimePolicy::Utc, LabelPolicy::Trim, date(2024, 6, 1)).unwrap()
}

#[test]
fn test_semicolon_export_end_to_end() {
    let rows = read_rows(&fixture("transactions.csv")).unwrap();
    assert_eq!(rows.len(), 6);

    let batch = normalizer().normalize_batch(&rows, "user-1");
    assert_eq!(batch.total_rows(), 6);
    assert_eq!(batch.transactions.len(), 4);
    assert_eq!(batch.rejected.len(), 2);
    assert!(matches!(batch.rejected[0].reason, RejectReason::InvalidDate(_)));
    assert!(matches!(batch.rejected[1].reason, RejectReason::InvalidAmount(_)));

    let txs = &batch.transactions;
    assert_eq!(txs[0].date, date(2023, 12, 31));
    assert_eq!(txs[0].amount, -12.5);
    assert_eq!(txs[0].category, Category::known("Courses"));
    assert_eq!(txs[0].sub_category, Category::known("Supermarché"));

    // Serial day number, and a trailing space on the label.
    assert_eq!(txs[1].date, date(2023, 3, 15));
    assert_eq!(txs[1].amount, -42.5);
    assert_eq!(txs[1].category, Category::known("Loisirs"));

    assert_eq!(txs[2].date, date(2024, 1, 15));
    assert_eq!(txs[2].amount, 1500.0);
    assert!(txs[2].category.is("Revenus du travail"));

    // No date falls back to today; no type is Unknown.
    assert_eq!(txs[3].date, date(2024, 6, 1));
    assert_eq!(txs[3].amount, -7.25);
    assert!(txs[3].category.is_unknown());
    assert!(txs.iter().all(|t| t.owner_id == "user-1"));
}

#[test]
fn test_workbook_first_sheet_end_to_end() {
    let rows = read_rows(&fixture("transactions.xlsx")).unwrap();
    assert_eq!(rows.iter().map(|r| r.row).collect::<Vec<_>>(), vec![2, 3, 4, 6]);

    let batch = normalizer().normalize_batch(&rows, "user-1");
    assert_eq!(batch.transactions.len(), 3);
    assert_eq!(batch.rejected.len(), 1);
    assert_eq!(batch.rejected[0].row, 4);

    let txs = &batch.transactions;
    assert_eq!(txs[0].id, "local-2");
    assert_eq!(txs[0].date, date(2023, 3, 15));
    assert_eq!(txs[0].amount, -42.5);
    assert_eq!(txs[0].sub_category, Category::known("Supermarché"));

    assert_eq!(txs[1].date, date(2023, 12, 31));
    assert_eq!(txs[1].amount, 12.5);
    assert!(txs[1].sub_category.is_unknown());

    assert_eq!(txs[2].id, "local-6");
    assert_eq!(txs[2].date, date(2024, 1, 1));
    assert_eq!(txs[2].amount, 1500.0);
}

#[test]
fn test_workbook_ignores_later_sheets() {
    let rows = read_rows(&fixture("transactions_two_sheets.xlsx")).unwrap();
    assert_eq!(rows.len(), 2);

    let batch = normalizer().normalize_batch(&rows, "user-1");
    assert!(batch.rejected.is_empty());
    let txs = &batch.transactions;
    assert_eq!(txs[0].date, date(2024, 1, 15));
    assert_eq!(txs[0].category, Category::known("Courses"));
    assert_eq!(txs[1].date, date(2024, 1, 16));
    assert_eq!(txs[1].amount, -800.0);
    assert!(txs.iter().all(|t| !t.category.is("Archivé") && !t.category.is("Santé")));
}

#[test]
fn test_missing_file_reports_path() {
    let err = read_rows(&fixture("nope.csv")).unwrap_err();
    assert!(err.to_string().contains("nope.csv"));
}
