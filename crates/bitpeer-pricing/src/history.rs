//! Best achievable price over time.

use crate::config::LegStrategy;
use crate::engine::evaluate;
use bitpeer_core::{OfferSnapshot, Price, TradeIntent};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Pricing outcome of one intent at one snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricePoint {
    pub observed_at: DateTime<Utc>,
    pub achieved_price: Option<Price>,
    pub fully_executable: bool,
}

/// Evaluate `intent` on each snapshot independently, oldest first.
///
/// Snapshots may arrive in any order; the series is sorted by time.
pub fn best_price_history(
    snapshots: &[OfferSnapshot],
    intent: &TradeIntent,
    strategy: LegStrategy,
) -> Vec<PricePoint> {
    let mut points: Vec<PricePoint> = snapshots
        .iter()
        .map(|snapshot| {
            let result = evaluate(&snapshot.offers, intent, strategy);
            PricePoint {
                observed_at: snapshot.observed_at,
                achieved_price: result.achieved_price,
                fully_executable: result.fully_executable,
            }
        })
        .collect();

    points.sort_by_key(|p| p.observed_at);
    points
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{ask, assert_close, buy_fiat};
    use bitpeer_core::{MarketKey, OfferSide};
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    fn snapshot(ts: i64, price: rust_decimal::Decimal) -> OfferSnapshot {
        OfferSnapshot::new(
            MarketKey::new("USDT", "RUB", OfferSide::Sell),
            Utc.timestamp_opt(ts, 0).unwrap(),
            vec![ask("o1", price, dec!(500), dec!(10000))],
        )
    }

    #[test]
    fn test_series_is_time_ordered() {
        let snapshots = vec![
            snapshot(1_700_000_060, dec!(96)),
            snapshot(1_700_000_000, dec!(95)),
            OfferSnapshot::new(
                MarketKey::new("USDT", "RUB", OfferSide::Sell),
                Utc.timestamp_opt(1_700_000_120, 0).unwrap(),
                vec![],
            ),
        ];
        let intent = buy_fiat(dec!(5000), 3, dec!(500));

        let series = best_price_history(&snapshots, &intent, LegStrategy::Split);

        assert_eq!(series.len(), 3);
        assert_close(series[0].achieved_price.unwrap().inner(), dec!(95));
        assert_close(series[1].achieved_price.unwrap().inner(), dec!(96));
        assert!(series[2].achieved_price.is_none());
        assert!(!series[2].fully_executable);
    }
}
