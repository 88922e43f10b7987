//! The ledger store capability.
//!
//! A store holds named collections of transactions. It makes no transactional
//! promises: each call either succeeds or fails on its own.

use tally_core::{Transaction, TransactionPatch};

use crate::error::StoreError;

pub const INCOMES: &str = "incomes";
pub const EXPENSES: &str = "expenses";

pub trait LedgerStore {
    /// Insert a record and return the id the store assigned to it. The
    /// record's own `id` is ignored.
    fn create(&mut self, collection: &str, tx: &Transaction) -> Result<String, StoreError>;

    /// All records of a collection in insertion order, ids filled in. An
    /// unknown collection is empty.
    fn list(&self, collection: &str) -> Result<Vec<Transaction>, StoreError>;

    fn update(
        &mut self,
        collection: &str,
        id: &str,
        patch: &TransactionPatch,
    ) -> Result<(), StoreError>;

    fn delete(&mut self, collection: &str, id: &str) -> Result<(), StoreError>;
}

/// Collection names end up in file names, so keep them to `[A-Za-z0-9_-]`.
pub(crate) fn check_collection(name: &str) -> Result<(), StoreError> {
    let valid = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if valid {
        Ok(())
    } else {
        Err(StoreError::InvalidCollection(name.to_string()))
    }
}
