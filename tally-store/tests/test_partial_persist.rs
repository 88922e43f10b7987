use chrono::NaiveDate;
use tally_core::{Category, Transaction, TransactionPatch};
use tally_store::{
    CollectionRouter, EXPENSES, LedgerStore, MemoryStore, StoreError, persist_batch, purge,
};

/// Fails the n-th create call (1-based) and every delete of the listed ids.
struct FlakyStore {
    inner: MemoryStore,
    creates: usize,
    fail_create: usize,
    fail_delete: Vec<String>,
}

impl FlakyStore {
    fn failing_create(n: usize) -> Self {
        Self {
            inner: MemoryStore::new(),
            creates: 0,
            fail_create: n,
            fail_delete: Vec::new(),
        }
    }
}

impl LedgerStore for FlakyStore {
    fn create(&mut self, collection: &str, tx: &Transaction) -> Result<String, StoreError> {
        self.creates += 1;
        if self.creates == self.fail_create {
            return Err(StoreError::Unavailable("connection reset".into()));
        }
        self.inner.create(collection, tx)
    }

    fn list(&self, collection: &str) -> Result<Vec<Transaction>, StoreError> {
        self.inner.list(collection)
    }

    fn update(
        &mut self,
        collection: &str,
        id: &str,
        patch: &TransactionPatch,
    ) -> Result<(), StoreError> {
        self.inner.update(collection, id, patch)
    }

    fn delete(&mut self, collection: &str, id: &str) -> Result<(), StoreError> {
        if self.fail_delete.iter().any(|f| f == id) {
            return Err(StoreError::Unavailable("timeout".into()));
        }
        self.inner.delete(collection, id)
    }
}

fn tx(row: usize, amount: f64) -> Transaction {
    Transaction::new(
        format!("local-{row}"),
        NaiveDate::from_ymd_opt(2024, 1, row as u32).unwrap(),
        amount,
        Category::known("Courses"),
        Category::Unknown,
        "u1",
    )
}

#[test]
fn test_failed_write_does_not_stop_the_batch() {
    let mut store = FlakyStore::failing_create(2);
    let batch = vec![tx(2, -1.0), tx(3, -2.0), tx(4, -3.0)];

    let report = persist_batch(&mut store, &batch, &CollectionRouter::default());

    assert!(!report.is_complete());
    assert_eq!(report.attempted(), 3);
    assert_eq!(
        report.committed.iter().map(|c| c.index).collect::<Vec<_>>(),
        vec![0, 2]
    );
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].index, 1);
    assert_eq!(report.failed[0].row_id, "local-3");
    assert!(matches!(report.failed[0].error, StoreError::Unavailable(_)));

    // Nothing was rolled back.
    let stored: Vec<f64> = store.list(EXPENSES).unwrap().iter().map(|t| t.amount).collect();
    assert_eq!(stored, vec![-1.0, -3.0]);
}

#[test]
fn test_purge_reports_actual_counts() {
    let mut store = FlakyStore::failing_create(0);
    let mut ids = Vec::new();
    for row in 1..=4 {
        ids.push(store.create(EXPENSES, &tx(row, -1.0)).unwrap());
    }
    store.fail_delete = vec![ids[1].clone()];

    let report = purge(&mut store, EXPENSES).unwrap();
    assert_eq!(report.attempted, 4);
    assert_eq!(report.deleted, 3);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].id, ids[1]);
    assert_eq!(store.list(EXPENSES).unwrap().len(), 1);
}

#[test]
fn test_report_serializes_error_messages() {
    let mut store = FlakyStore::failing_create(1);
    let report = persist_batch(&mut store, &[tx(2, -1.0)], &CollectionRouter::default());
    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["failed"][0]["row_id"], "local-2");
    assert_eq!(json["failed"][0]["error"], "store unavailable: connection reset");
}
