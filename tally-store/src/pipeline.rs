//! Import and maintenance operations over a [`LedgerStore`].
//!
//! Batch writes go one record at a time, in input order. A failed write is
//! recorded and the batch moves on; nothing already written is rolled back.
//! The reports say exactly which rows made it.

use serde::{Serialize, Serializer};
use tally_core::{Category, DEFAULT_INCOME_LABEL, Transaction, TransactionPatch, newest_first};
use tally_ingest::{Normalizer, RawAmount, RawDate, RawRow, RejectedRow};
use tracing::{debug, info, warn};

use crate::error::StoreError;
use crate::identity::IdentityProvider;
use crate::store::{EXPENSES, INCOMES, LedgerStore};

const MANUAL_ID: &str = "local-manual";

/// Picks the collection a record is written to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionRouter {
    income_label: String,
}

impl CollectionRouter {
    pub fn new(income_label: impl Into<String>) -> Self {
        Self {
            income_label: income_label.into(),
        }
    }

    pub fn income_label(&self) -> &str {
        &self.income_label
    }

    pub fn route(&self, tx: &Transaction) -> &'static str {
        if tx.category.is(&self.income_label) {
            INCOMES
        } else {
            EXPENSES
        }
    }
}

impl Default for CollectionRouter {
    fn default() -> Self {
        Self::new(DEFAULT_INCOME_LABEL)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Committed {
    /// Position in the submitted batch
    pub index: usize,
    pub collection: String,
    /// Store-assigned id
    pub id: String,
}

#[derive(Debug, Serialize)]
pub struct FailedWrite {
    pub index: usize,
    /// The record's local id, which names the source row
    pub row_id: String,
    #[serde(serialize_with = "as_message")]
    pub error: StoreError,
}

#[derive(Debug, Default, Serialize)]
pub struct PersistReport {
    pub committed: Vec<Committed>,
    pub failed: Vec<FailedWrite>,
}

impl PersistReport {
    pub fn attempted(&self) -> usize {
        self.committed.len() + self.failed.len()
    }

    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

fn as_message<S: Serializer>(err: &StoreError, s: S) -> Result<S::Ok, S::Error> {
    s.collect_str(err)
}

/// Write `transactions` in order, one at a time.
pub fn persist_batch<S>(
    store: &mut S,
    transactions: &[Transaction],
    router: &CollectionRouter,
) -> PersistReport
where
    S: LedgerStore + ?Sized,
{
    let mut report = PersistReport::default();
    for (index, tx) in transactions.iter().enumerate() {
        let collection = router.route(tx);
        match store.create(collection, tx) {
            Ok(id) => {
                debug!(index, collection, %id, "record written");
                report.committed.push(Committed {
                    index,
                    collection: collection.to_string(),
                    id,
                });
            }
            Err(error) => {
                warn!(index, row_id = %tx.id, collection, %error, "record write failed");
                report.failed.push(FailedWrite {
                    index,
                    row_id: tx.id.clone(),
                    error,
                });
            }
        }
    }
    report
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ImportOutcome {
    /// Every row was normalized and written.
    Complete,
    /// Some rows were rejected or failed to write; the rest are stored.
    Partial,
    /// Nothing was stored although there were rows.
    Failed,
}

#[derive(Debug, Serialize)]
pub struct ImportReport {
    pub rejected: Vec<RejectedRow>,
    pub persisted: PersistReport,
    pub outcome: ImportOutcome,
}

impl ImportReport {
    fn new(rejected: Vec<RejectedRow>, persisted: PersistReport) -> Self {
        let outcome = if persisted.committed.is_empty()
            && (!rejected.is_empty() || !persisted.failed.is_empty())
        {
            ImportOutcome::Failed
        } else if rejected.is_empty() && persisted.is_complete() {
            ImportOutcome::Complete
        } else {
            ImportOutcome::Partial
        };
        Self {
            rejected,
            persisted,
            outcome,
        }
    }
}

/// A record typed in by hand. Fields hold what the user entered.
#[derive(Debug, Clone, Default)]
pub struct ManualEntry {
    pub date: Option<String>,
    pub amount: Option<String>,
    pub category: Option<String>,
    pub sub_category: Option<String>,
}

impl ManualEntry {
    fn to_raw(&self) -> RawRow {
        RawRow {
            row: 0,
            date: self.date.clone().map(RawDate::IsoLike),
            amount: self.amount.clone().map(RawAmount::Text),
            category: self.category.clone(),
            sub_category: self.sub_category.clone(),
        }
    }
}

/// Normalizes and stores records on behalf of the signed-in user.
#[derive(Debug, Clone)]
pub struct Importer {
    normalizer: Normalizer,
    router: CollectionRouter,
}

impl Importer {
    pub fn new(normalizer: Normalizer, router: CollectionRouter) -> Self {
        Self { normalizer, router }
    }

    /// Import one sheet's rows. Fails only when nobody is signed in; row and
    /// write failures are reported, not raised.
    pub fn import<S>(
        &self,
        store: &mut S,
        identity: &dyn IdentityProvider,
        rows: &[RawRow],
    ) -> Result<ImportReport, StoreError>
    where
        S: LedgerStore + ?Sized,
    {
        let user = identity.current_user().ok_or(StoreError::Unauthenticated)?;
        let batch = self.normalizer.normalize_batch(rows, &user.id);
        for rejected in &batch.rejected {
            warn!(row = rejected.row, reason = %rejected.reason, "row rejected");
        }
        if batch.is_total_failure() {
            warn!(rows = batch.total_rows(), "every row was rejected; nothing to store");
        }

        let persisted = persist_batch(store, &batch.transactions, &self.router);
        let report = ImportReport::new(batch.rejected, persisted);
        info!(
            rows = rows.len(),
            rejected = report.rejected.len(),
            committed = report.persisted.committed.len(),
            failed = report.persisted.failed.len(),
            outcome = ?report.outcome,
            "import finished"
        );
        Ok(report)
    }

    /// Store a single hand-entered record; returns the collection and new id.
    pub fn add_manual<S>(
        &self,
        store: &mut S,
        identity: &dyn IdentityProvider,
        entry: &ManualEntry,
    ) -> Result<Committed, StoreError>
    where
        S: LedgerStore + ?Sized,
    {
        let user = identity.current_user().ok_or(StoreError::Unauthenticated)?;
        let mut tx = self
            .normalizer
            .normalize(&entry.to_raw(), &user.id)
            .map_err(|rejected| rejected.reason)?;
        tx.id = MANUAL_ID.to_string();

        let collection = self.router.route(&tx);
        let id = store.create(collection, &tx)?;
        info!(collection, %id, "manual record added");
        Ok(Committed {
            index: 0,
            collection: collection.to_string(),
            id,
        })
    }
}

/// Change a record's category, and its sub-category when given. The record
/// stays in its collection.
pub fn reassign_category<S>(
    store: &mut S,
    collection: &str,
    id: &str,
    category: Category,
    sub_category: Option<Category>,
) -> Result<(), StoreError>
where
    S: LedgerStore + ?Sized,
{
    let mut patch = TransactionPatch::category(category);
    if let Some(sub) = sub_category {
        patch = patch.with_sub_category(sub);
    }
    store.update(collection, id, &patch)?;
    info!(collection, id, "category reassigned");
    Ok(())
}

pub fn delete<S>(store: &mut S, collection: &str, id: &str) -> Result<(), StoreError>
where
    S: LedgerStore + ?Sized,
{
    store.delete(collection, id)?;
    info!(collection, id, "record deleted");
    Ok(())
}

#[derive(Debug, Serialize)]
pub struct PurgeFailure {
    pub id: String,
    #[serde(serialize_with = "as_message")]
    pub error: StoreError,
}

#[derive(Debug, Default, Serialize)]
pub struct PurgeReport {
    pub attempted: usize,
    pub deleted: usize,
    pub failures: Vec<PurgeFailure>,
}

impl PurgeReport {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Delete every record of a collection. Deletions that fail are listed and
/// the rest go ahead.
pub fn purge<S>(store: &mut S, collection: &str) -> Result<PurgeReport, StoreError>
where
    S: LedgerStore + ?Sized,
{
    let records = store.list(collection)?;
    let mut report = PurgeReport {
        attempted: records.len(),
        ..PurgeReport::default()
    };
    for record in records {
        match store.delete(collection, &record.id) {
            Ok(()) => report.deleted += 1,
            Err(error) => {
                warn!(collection, id = %record.id, %error, "purge delete failed");
                report.failures.push(PurgeFailure {
                    id: record.id,
                    error,
                });
            }
        }
    }
    info!(
        collection,
        attempted = report.attempted,
        deleted = report.deleted,
        "collection purged"
    );
    Ok(report)
}

/// Records of a collection, newest first.
pub fn load<S>(store: &S, collection: &str) -> Result<Vec<Transaction>, StoreError>
where
    S: LedgerStore + ?Sized,
{
    Ok(newest_first(&store.list(collection)?))
}

/// Both collections, newest first.
pub fn load_all<S>(store: &S) -> Result<Vec<Transaction>, StoreError>
where
    S: LedgerStore + ?Sized,
{
    let mut all = store.list(EXPENSES)?;
    all.extend(store.list(INCOMES)?);
    Ok(newest_first(&all))
}
