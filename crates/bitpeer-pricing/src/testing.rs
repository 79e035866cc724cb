//! Offer and intent builders shared by unit tests.

use bitpeer_core::{
    AdvertiserId, Offer, OfferFields, OfferId, OfferSide, PaymentMethod, TargetAmount,
    TradeDirection, TradeIntent,
};
use chrono::{TimeZone, Utc};
use rust_decimal::Decimal;

pub(crate) fn fields(id: &str, side: OfferSide, price: Decimal, min: Decimal, max: Decimal) -> OfferFields {
    OfferFields {
        offer_id: OfferId::new(id),
        advertiser_id: AdvertiserId::new(format!("adv-{id}")),
        side,
        unit_price: price,
        min_fiat_amount: min,
        max_fiat_amount: max,
        payment_methods: ["sbp"].iter().filter_map(|m| PaymentMethod::parse(m)).collect(),
        is_merchant: None,
        advertiser_rating: None,
        completion_rate: None,
        observed_at: Utc.timestamp_opt(1_714_557_600, 0).unwrap(),
    }
}

/// Sell-side offer (fills `BuyAsset` intents).
pub(crate) fn ask(id: &str, price: Decimal, min: Decimal, max: Decimal) -> Offer {
    Offer::try_from_fields(fields(id, OfferSide::Sell, price, min, max)).unwrap()
}

/// Buy-side offer (fills `SellAsset` intents).
pub(crate) fn bid(id: &str, price: Decimal, min: Decimal, max: Decimal) -> Offer {
    Offer::try_from_fields(fields(id, OfferSide::Buy, price, min, max)).unwrap()
}

pub(crate) fn buy_fiat(amount: Decimal, max_splits: u32, min_chunk: Decimal) -> TradeIntent {
    TradeIntent::new(
        TradeDirection::BuyAsset,
        TargetAmount::Fiat(amount),
        max_splits,
        min_chunk,
    )
    .unwrap()
}

pub(crate) fn sell_asset(amount: Decimal, max_splits: u32, min_chunk: Decimal) -> TradeIntent {
    TradeIntent::new(
        TradeDirection::SellAsset,
        TargetAmount::Asset(amount),
        max_splits,
        min_chunk,
    )
    .unwrap()
}

pub(crate) fn assert_close(actual: Decimal, expected: Decimal) {
    assert!(
        (actual - expected).abs() <= bitpeer_core::FILL_EPSILON,
        "{actual} != {expected}"
    );
}
