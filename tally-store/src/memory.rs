use std::collections::BTreeMap;
use tally_core::{Transaction, TransactionPatch};

use crate::error::StoreError;
use crate::store::{LedgerStore, check_collection};

/// Process-local store. Ids are `mem-1`, `mem-2`, ... across all collections.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    collections: BTreeMap<String, Vec<Transaction>>,
    next_id: u64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self, collection: &str) -> usize {
        self.collections.get(collection).map_or(0, Vec::len)
    }

    fn records_mut(
        &mut self,
        collection: &str,
        id: &str,
    ) -> Result<&mut Vec<Transaction>, StoreError> {
        self.collections
            .get_mut(collection)
            .ok_or_else(|| StoreError::not_found(collection, id))
    }
}

impl LedgerStore for MemoryStore {
    fn create(&mut self, collection: &str, tx: &Transaction) -> Result<String, StoreError> {
        check_collection(collection)?;
        self.next_id += 1;
        let id = format!("mem-{}", self.next_id);
        let mut record = tx.clone();
        record.id = id.clone();
        self.collections
            .entry(collection.to_string())
            .or_default()
            .push(record);
        Ok(id)
    }

    fn list(&self, collection: &str) -> Result<Vec<Transaction>, StoreError> {
        check_collection(collection)?;
        Ok(self.collections.get(collection).cloned().unwrap_or_default())
    }

    fn update(
        &mut self,
        collection: &str,
        id: &str,
        patch: &TransactionPatch,
    ) -> Result<(), StoreError> {
        check_collection(collection)?;
        let record = self
            .records_mut(collection, id)?
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| StoreError::not_found(collection, id))?;
        record.apply(patch);
        Ok(())
    }

    fn delete(&mut self, collection: &str, id: &str) -> Result<(), StoreError> {
        check_collection(collection)?;
        let records = self.records_mut(collection, id)?;
        let pos = records
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(|| StoreError::not_found(collection, id))?;
        records.remove(pos);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use tally_core::Category;

    fn tx(amount: f64) -> Transaction {
        Transaction::new(
            "local-2",
            NaiveDate::from_ymd_opt(2024, 1, 5).unwrap(),
            amount,
            Category::known("Courses"),
            Category::Unknown,
            "u1",
        )
    }

    #[test]
    fn test_create_assigns_ids_in_insertion_order() {
        let mut store = MemoryStore::new();
        let a = store.create("expenses", &tx(-1.0)).unwrap();
        let b = store.create("expenses", &tx(-2.0)).unwrap();
        assert_ne!(a, b);

        let listed = store.list("expenses").unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].id, a);
        assert_eq!(listed[1].amount, -2.0);
        assert!(store.list("incomes").unwrap().is_empty());
    }

    #[test]
    fn test_update_in_place() {
        let mut store = MemoryStore::new();
        let id = store.create("expenses", &tx(-1.0)).unwrap();
        let patch = TransactionPatch::category(Category::known("Loisirs"));
        store.update("expenses", &id, &patch).unwrap();

        let listed = store.list("expenses").unwrap();
        assert_eq!(listed[0].category, Category::known("Loisirs"));
        assert_eq!(listed[0].id, id);
    }

    #[test]
    fn test_missing_ids() {
        let mut store = MemoryStore::new();
        let patch = TransactionPatch::default();
        assert!(matches!(
            store.update("expenses", "mem-9", &patch),
            Err(StoreError::NotFound { .. })
        ));
        assert!(matches!(
            store.delete("expenses", "mem-9"),
            Err(StoreError::NotFound { .. })
        ));
        assert!(matches!(
            store.update("budgets", "mem-9", &patch),
            Err(StoreError::NotFound { .. })
        ));
        assert!(store.collections.is_empty());
    }

    #[test]
    fn test_delete() {
        let mut store = MemoryStore::new();
        let a = store.create("expenses", &tx(-1.0)).unwrap();
        store.create("expenses", &tx(-2.0)).unwrap();
        store.delete("expenses", &a).unwrap();
        assert_eq!(store.len("expenses"), 1);
    }
}
