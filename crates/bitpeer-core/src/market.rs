//! Market identity and timestamped offer snapshots.

use crate::offer::{Offer, OfferSide};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One order-book side of one asset/fiat pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MarketKey {
    pub asset: String,
    pub fiat: String,
    pub side: OfferSide,
}

impl MarketKey {
    pub fn new(asset: impl Into<String>, fiat: impl Into<String>, side: OfferSide) -> Self {
        Self {
            asset: asset.into().to_uppercase(),
            fiat: fiat.into().to_uppercase(),
            side,
        }
    }
}

impl fmt::Display for MarketKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}:{}", self.asset, self.fiat, self.side)
    }
}

/// All valid offers of one market observed at one instant.
///
/// `malformed` counts records the normalizer had to drop for this snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OfferSnapshot {
    pub market: MarketKey,
    pub observed_at: DateTime<Utc>,
    pub offers: Vec<Offer>,
    #[serde(default)]
    pub malformed: usize,
}

impl OfferSnapshot {
    pub fn new(market: MarketKey, observed_at: DateTime<Utc>, offers: Vec<Offer>) -> Self {
        Self {
            market,
            observed_at,
            offers,
            malformed: 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.offers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_market_key_display() {
        let key = MarketKey::new("usdt", "rub", OfferSide::Sell);
        assert_eq!(key.to_string(), "USDT/RUB:sell");
    }
}
