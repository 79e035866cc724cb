//! Core domain types for bitpeer P2P market analytics.
//!
//! This crate provides the value types shared by every other crate:
//! - `Price`: fiat per unit of traded asset, precision-safe
//! - `Offer`: one advertiser's validated standing listing
//! - `TradeIntent`: a hypothetical execution request with its constraints
//! - `ExecutionResult`: what pricing could actually obtain
//! - `MarketKey`, `OfferSnapshot`: market identity and one timestamped offer set

pub mod decimal;
pub mod error;
pub mod execution;
pub mod intent;
pub mod market;
pub mod offer;

pub use decimal::{approx_zero, Price, FILL_EPSILON};
pub use error::{CoreError, MalformedOffer, Result};
pub use execution::{ExecutionResult, Fill, FilledAmount};
pub use intent::{TargetAmount, TradeDirection, TradeIntent};
pub use market::{MarketKey, OfferSnapshot};
pub use offer::{AdvertiserId, Offer, OfferFields, OfferId, OfferSide, PaymentMethod};
