//! tally-ingest: spreadsheet readers and the record normalizer that turns raw
//! rows into canonical transactions.

pub mod error;
pub mod normalize;
pub mod parsers;
pub mod types;

pub use error::{IngestError, RejectReason, RejectedRow};
pub use normalize::{NormalizedBatch, Normalizer, SERIAL_UNIX_EPOCH};
pub use parsers::read_rows;
pub use types::{Cell, RawAmount, RawDate, RawRow};
