//! File-backed store: one `<collection>.json` document per collection.
//!
//! ```json
//! { "next_id": 3, "records": [ { "id": "1", "date": "2024-01-05", ... } ] }
//! ```
//!
//! Every call reads the document and every write rewrites it whole, through a
//! sibling `<collection>.json.tmp` renamed over the original.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tally_core::{Transaction, TransactionPatch};
use tracing::debug;

use crate::error::StoreError;
use crate::store::{LedgerStore, check_collection};

#[derive(Debug, Default, Serialize, Deserialize)]
struct CollectionDoc {
    #[serde(default)]
    next_id: u64,
    #[serde(default)]
    records: Vec<Transaction>,
}

#[derive(Debug, Clone)]
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    /// Open (creating if needed) a data directory.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|source| StoreError::Io {
            path: dir.clone(),
            source,
        })?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn collection_path(&self, collection: &str) -> PathBuf {
        self.dir.join(format!("{collection}.json"))
    }

    fn read(&self, collection: &str) -> Result<CollectionDoc, StoreError> {
        check_collection(collection)?;
        let path = self.collection_path(collection);
        if !path.exists() {
            return Ok(CollectionDoc::default());
        }
        let text = fs::read_to_string(&path).map_err(|source| StoreError::Io {
            path: path.clone(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| StoreError::Json { path, source })
    }

    fn write(&self, collection: &str, doc: &CollectionDoc) -> Result<(), StoreError> {
        let path = self.collection_path(collection);
        let json = serde_json::to_string_pretty(doc).map_err(|source| StoreError::Json {
            path: path.clone(),
            source,
        })?;
        let temp = path.with_extension("json.tmp");
        fs::write(&temp, json).map_err(|source| StoreError::Io {
            path: temp.clone(),
            source,
        })?;
        fs::rename(&temp, &path).map_err(|source| StoreError::Io {
            path: path.clone(),
            source,
        })?;
        debug!(path = %path.display(), records = doc.records.len(), "wrote collection");
        Ok(())
    }
}

impl LedgerStore for JsonFileStore {
    fn create(&mut self, collection: &str, tx: &Transaction) -> Result<String, StoreError> {
        let mut doc = self.read(collection)?;
        doc.next_id += 1;
        let id = doc.next_id.to_string();
        let mut record = tx.clone();
        record.id = id.clone();
        doc.records.push(record);
        self.write(collection, &doc)?;
        Ok(id)
    }

    fn list(&self, collection: &str) -> Result<Vec<Transaction>, StoreError> {
        Ok(self.read(collection)?.records)
    }

    fn update(
        &mut self,
        collection: &str,
        id: &str,
        patch: &TransactionPatch,
    ) -> Result<(), StoreError> {
        let mut doc = self.read(collection)?;
        let record = doc
            .records
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| StoreError::not_found(collection, id))?;
        record.apply(patch);
        self.write(collection, &doc)
    }

    fn delete(&mut self, collection: &str, id: &str) -> Result<(), StoreError> {
        let mut doc = self.read(collection)?;
        let before = doc.records.len();
        doc.records.retain(|t| t.id != id);
        if doc.records.len() == before {
            return Err(StoreError::not_found(collection, id));
        }
        self.write(collection, &doc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use tally_core::Category;

    fn tx(day: u32, amount: f64, category: &str) -> Transaction {
        Transaction::new(
            "local-1",
            NaiveDate::from_ymd_opt(2024, 2, day).unwrap(),
            amount,
            Category::known(category),
            Category::Unknown,
            "u1",
        )
    }

    #[test]
    fn test_records_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = JsonFileStore::open(dir.path()).unwrap();
        let first = store.create("expenses", &tx(1, -10.0, "Courses")).unwrap();
        let second = store.create("expenses", &tx(2, -5.5, "Loisirs")).unwrap();
        assert_eq!(first, "1");
        assert_eq!(second, "2");

        let reopened = JsonFileStore::open(dir.path()).unwrap();
        let listed = reopened.list("expenses").unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[1].id, "2");
        assert_eq!(listed[1].category, Category::known("Loisirs"));
        assert!(listed[1].sub_category.is_unknown());
    }

    #[test]
    fn test_ids_are_not_reused_after_delete() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = JsonFileStore::open(dir.path()).unwrap();
        store.create("expenses", &tx(1, -1.0, "A")).unwrap();
        let b = store.create("expenses", &tx(2, -2.0, "A")).unwrap();
        store.delete("expenses", &b).unwrap();
        let c = store.create("expenses", &tx(3, -3.0, "A")).unwrap();
        assert_eq!(c, "3");
    }

    #[test]
    fn test_update_and_missing_delete() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = JsonFileStore::open(dir.path()).unwrap();
        let id = store.create("incomes", &tx(1, 1500.0, "Salaire")).unwrap();
        let patch = TransactionPatch::category(Category::known("Revenus du travail"))
            .with_sub_category(Category::known("Salaire"));
        store.update("incomes", &id, &patch).unwrap();

        let listed = store.list("incomes").unwrap();
        assert!(listed[0].category.is("Revenus du travail"));
        assert_eq!(listed[0].sub_category, Category::known("Salaire"));
        assert!(matches!(
            store.delete("incomes", "42"),
            Err(StoreError::NotFound { .. })
        ));
    }

    #[test]
    fn test_interrupted_write_keeps_committed_rows() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = JsonFileStore::open(dir.path()).unwrap();
        store.create("expenses", &tx(1, -10.0, "Courses")).unwrap();
        store.create("expenses", &tx(2, -5.0, "Courses")).unwrap();
        assert!(!dir.path().join("expenses.json.tmp").exists());

        // A crash between writing the temp file and renaming it.
        fs::write(dir.path().join("expenses.json.tmp"), "{\"next_id\": 3, \"rec").unwrap();
        let listed = store.list("expenses").unwrap();
        assert_eq!(listed.len(), 2);

        let third = store.create("expenses", &tx(3, -1.0, "Courses")).unwrap();
        assert_eq!(third, "3");
        assert_eq!(store.list("expenses").unwrap().len(), 3);
        assert!(!dir.path().join("expenses.json.tmp").exists());
    }

    #[test]
    fn test_malformed_file() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("expenses.json"), "not json").unwrap();
        let store = JsonFileStore::open(dir.path()).unwrap();
        assert!(matches!(store.list("expenses"), Err(StoreError::Json { .. })));
    }

    #[test]
    fn test_rejects_path_like_collection() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::open(dir.path()).unwrap();
        assert!(matches!(
            store.list("../outside"),
            Err(StoreError::InvalidCollection(_))
        ));
    }
}
