//! tally-store: ledger stores, identity, and the import/maintenance pipeline

pub mod error;
pub mod identity;
pub mod json_store;
pub mod memory;
pub mod pipeline;
pub mod store;

pub use error::StoreError;
pub use identity::{Identity, IdentityProvider, StaticIdentity};
pub use json_store::JsonFileStore;
pub use memory::MemoryStore;
pub use pipeline::{
    CollectionRouter, Committed, FailedWrite, ImportOutcome, ImportReport, Importer, ManualEntry,
    PersistReport, PurgeFailure, PurgeReport, delete, load, load_all, persist_batch, purge,
    reassign_category,
};
pub use store::{EXPENSES, INCOMES, LedgerStore};
