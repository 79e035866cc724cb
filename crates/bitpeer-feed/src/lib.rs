//! Offer normalization for bitpeer.
//!
//! Turns stored exchange responses (`RawFetchRecord`) into validated
//! `Offer` values. Schema drift in the raw payloads is absorbed here so the
//! pricing crates only ever see the strict `Offer` shape.

pub mod error;
pub mod extract;
pub mod normalizer;
pub mod raw;

pub use error::{FeedError, FeedResult};
pub use extract::extract_listings;
pub use normalizer::{ListingContext, NormalizedSnapshot, NormalizerStats, OfferNormalizer};
pub use raw::{RawFetchRecord, RAW_FORMAT_VERSION};
