//! Append-only JSON Lines storage for bitpeer.
//!
//! Layout under the data directory:
//! - `raw/{day}/{market}.jsonl`: raw fetch records, one per line
//! - `processed/offers_{day}.jsonl`: normalized offers
//! - `metrics/metrics_{day}.jsonl`: execution, liquidity and combo results
//!
//! Days are UTC dates of the record's own timestamp, so replaying old data
//! lands in the same files as live collection would have.

pub mod error;
pub mod raw_store;
pub mod reader;
pub mod records;
pub mod writer;

pub use error::{PersistenceError, PersistenceResult};
pub use raw_store::RawStore;
pub use reader::read_jsonl;
pub use records::{MetricPayload, MetricRecord, OfferRecord};
pub use writer::{JsonLinesWriter, Timestamped};
