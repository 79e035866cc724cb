//! Executability filter.
//!
//! Reduces an offer set to what a trader could legally execute against for
//! one intent, in canonical order (best price first).

use bitpeer_core::{Offer, TradeDirection, TradeIntent};
use std::cmp::Ordering;
use tracing::trace;

/// Filter and order `offers` for `intent`.
///
/// Keeps offers that:
/// - sit on the counterparty side of `intent.direction`
/// - accept at least one of the intent's payment methods (any, if none given)
/// - satisfy `merchant_only` and `min_rating` (unrated offers pass)
/// - can cover at least `min_chunk_fiat` (`max_fiat_amount >= min_chunk_fiat`)
///
/// Order: ascending price for `BuyAsset`, descending for `SellAsset`; ties by
/// larger `max_fiat_amount`, then higher rating (unrated last), then
/// `offer_id` ascending.
pub fn filter<'a>(offers: &'a [Offer], intent: &TradeIntent) -> Vec<&'a Offer> {
    let side = intent.direction().counterparty_side();

    let mut kept: Vec<&Offer> = offers
        .iter()
        .filter(|o| o.side() == side)
        .filter(|o| o.accepts_any(intent.accepted_payment_methods()))
        .filter(|o| !intent.merchant_only() || o.is_merchant() == Some(true))
        .filter(|o| match (intent.min_rating(), o.advertiser_rating()) {
            (Some(min), Some(rating)) => rating >= min,
            _ => true,
        })
        .filter(|o| o.max_fiat_amount() >= intent.min_chunk_fiat())
        .collect();

    kept.sort_by(|a, b| canonical_order(intent.direction(), a, b));

    trace!(
        direction = %intent.direction(),
        input = offers.len(),
        kept = kept.len(),
        "Filtered offers"
    );

    kept
}

/// Total order used by every selector: best price first, deterministic ties.
pub fn canonical_order(direction: TradeDirection, a: &Offer, b: &Offer) -> Ordering {
    let by_price = match direction {
        TradeDirection::BuyAsset => a.unit_price().cmp(&b.unit_price()),
        TradeDirection::SellAsset => b.unit_price().cmp(&a.unit_price()),
    };

    by_price
        .then_with(|| b.max_fiat_amount().cmp(&a.max_fiat_amount()))
        // Option orders None first, so reversing puts unrated offers last.
        .then_with(|| b.advertiser_rating().cmp(&a.advertiser_rating()))
        .then_with(|| a.offer_id().cmp(b.offer_id()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{ask, bid, buy_fiat, fields, sell_asset};
    use bitpeer_core::{OfferSide, PaymentMethod};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn ids(offers: &[&Offer]) -> Vec<String> {
        offers.iter().map(|o| o.offer_id().to_string()).collect()
    }

    #[test]
    fn test_keeps_counterparty_side_only() {
        let offers = vec![
            ask("a1", dec!(95), dec!(500), dec!(10000)),
            bid("b1", dec!(94), dec!(500), dec!(10000)),
        ];

        let buy = filter(&offers, &buy_fiat(dec!(1000), 3, dec!(500)));
        assert_eq!(ids(&buy), vec!["a1"]);

        let sell = filter(&offers, &sell_asset(dec!(10), 3, dec!(500)));
        assert_eq!(ids(&sell), vec!["b1"]);
    }

    #[test]
    fn test_order_by_direction() {
        let asks = vec![
            ask("a1", dec!(96), dec!(500), dec!(10000)),
            ask("a2", dec!(95), dec!(500), dec!(10000)),
            ask("a3", dec!(97), dec!(500), dec!(10000)),
        ];
        let kept = filter(&asks, &buy_fiat(dec!(1000), 3, dec!(500)));
        assert_eq!(ids(&kept), vec!["a2", "a1", "a3"]);

        let bids = vec![
            bid("b1", dec!(94), dec!(500), dec!(10000)),
            bid("b2", dec!(93), dec!(500), dec!(10000)),
            bid("b3", dec!(95), dec!(500), dec!(10000)),
        ];
        let kept = filter(&bids, &sell_asset(dec!(10), 3, dec!(500)));
        assert_eq!(ids(&kept), vec!["b3", "b1", "b2"]);
    }

    #[test]
    fn test_tie_breaks() {
        let rated = |id: &str, max: Decimal, rating: Option<Decimal>| {
            let mut f = fields(id, OfferSide::Sell, dec!(95), dec!(500), max);
            f.advertiser_rating = rating;
            Offer::try_from_fields(f).unwrap()
        };
        let offers = vec![
            rated("e", dec!(5000), Some(dec!(0.99))),
            rated("d", dec!(10000), None),
            rated("c", dec!(10000), Some(dec!(0.90))),
            rated("b", dec!(10000), Some(dec!(0.95))),
            rated("a", dec!(10000), Some(dec!(0.95))),
        ];

        let kept = filter(&offers, &buy_fiat(dec!(1000), 3, dec!(500)));
        assert_eq!(ids(&kept), vec!["a", "b", "c", "d", "e"]);
    }

    #[test]
    fn test_payment_methods() {
        let offers = vec![ask("a1", dec!(95), dec!(500), dec!(10000))];

        let intent = buy_fiat(dec!(1000), 3, dec!(500))
            .with_payment_methods(PaymentMethod::parse("tinkoff"));
        assert!(filter(&offers, &intent).is_empty());

        let intent = buy_fiat(dec!(1000), 3, dec!(500))
            .with_payment_methods(["tinkoff", "SBP"].iter().filter_map(|m| PaymentMethod::parse(m)));
        assert_eq!(filter(&offers, &intent).len(), 1);
    }

    #[test]
    fn test_drops_offers_below_min_chunk() {
        let offers = vec![
            ask("small", dec!(90), dec!(100), dec!(499)),
            ask("ok", dec!(95), dec!(100), dec!(500)),
        ];

        let kept = filter(&offers, &buy_fiat(dec!(1000), 3, dec!(500)));
        assert_eq!(ids(&kept), vec!["ok"]);
    }

    #[test]
    fn test_quality_constraints() {
        let mut merchant = fields("m", OfferSide::Sell, dec!(95), dec!(500), dec!(10000));
        merchant.is_merchant = Some(true);
        merchant.advertiser_rating = Some(dec!(0.99));
        let mut low = fields("low", OfferSide::Sell, dec!(94), dec!(500), dec!(10000));
        low.advertiser_rating = Some(dec!(0.50));
        let unrated = fields("unrated", OfferSide::Sell, dec!(96), dec!(500), dec!(10000));

        let offers: Vec<Offer> = [merchant, low, unrated]
            .into_iter()
            .map(|f| Offer::try_from_fields(f).unwrap())
            .collect();

        let intent = buy_fiat(dec!(1000), 3, dec!(500)).with_min_rating(Some(dec!(0.9)));
        assert_eq!(ids(&filter(&offers, &intent)), vec!["m", "unrated"]);

        let intent = buy_fiat(dec!(1000), 3, dec!(500)).with_merchant_only(true);
        assert_eq!(ids(&filter(&offers, &intent)), vec!["m"]);
    }

    #[test]
    fn test_empty_input() {
        assert!(filter(&[], &buy_fiat(dec!(1000), 3, dec!(500))).is_empty());
    }
}
