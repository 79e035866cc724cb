//! End-to-end pricing scenarios over small hand-built order books.

use bitpeer_core::{
    AdvertiserId, ExecutionResult, Offer, OfferFields, OfferId, OfferSide, PaymentMethod,
    TargetAmount, TradeDirection, TradeIntent, FILL_EPSILON,
};
use bitpeer_pricing::{
    allocate, evaluate_combo, filter, select_best, ComboMode, ComboOutcome, InfeasibleReason,
    LegStrategy,
};
use chrono::{TimeZone, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn offer(id: &str, side: OfferSide, price: Decimal, max: Decimal, methods: &[&str]) -> Offer {
    Offer::try_from_fields(OfferFields {
        offer_id: OfferId::new(id),
        advertiser_id: AdvertiserId::new(format!("adv-{id}")),
        side,
        unit_price: price,
        min_fiat_amount: dec!(500),
        max_fiat_amount: max,
        payment_methods: methods.iter().filter_map(|m| PaymentMethod::parse(m)).collect(),
        is_merchant: Some(true),
        advertiser_rating: Some(dec!(0.98)),
        completion_rate: None,
        observed_at: Utc.timestamp_opt(1_714_557_600, 0).unwrap(),
    })
    .unwrap()
}

fn two_asks() -> Vec<Offer> {
    vec![
        offer("o1", OfferSide::Sell, dec!(95), dec!(10000), &["sbp"]),
        offer("o2", OfferSide::Sell, dec!(96), dec!(5000), &["sbp"]),
    ]
}

fn buy_intent(target: Decimal, max_splits: u32) -> TradeIntent {
    TradeIntent::new(
        TradeDirection::BuyAsset,
        TargetAmount::Fiat(target),
        max_splits,
        dec!(500),
    )
    .unwrap()
}

fn assert_close(actual: Decimal, expected: Decimal) {
    assert!(
        (actual - expected).abs() <= FILL_EPSILON,
        "{actual} != {expected}"
    );
}

fn contributions(result: &ExecutionResult) -> Vec<(&str, Decimal)> {
    result
        .offers_used
        .iter()
        .map(|f| (f.offer_id.as_str(), f.fiat_contribution))
        .collect()
}

#[test]
fn scenario_a_split_across_two_offers() {
    let offers = two_asks();
    let intent = buy_intent(dec!(12000), 3);

    let result = allocate(&filter(&offers, &intent), &intent);

    assert!(result.fully_executable);
    assert_eq!(contributions(&result), vec![("o1", dec!(10000)), ("o2", dec!(2000))]);
    assert_eq!(result.filled.fiat, dec!(12000));

    let expected = dec!(12000) / (dec!(10000) / dec!(95) + dec!(2000) / dec!(96));
    assert_close(result.achieved_price.unwrap().inner(), expected);
}

#[test]
fn scenario_b_no_one_unit_sliver() {
    let offers = two_asks();
    let intent = buy_intent(dec!(14999), 3);

    let result = allocate(&filter(&offers, &intent), &intent);

    assert!(result.fully_executable);
    assert_eq!(contributions(&result), vec![("o1", dec!(10000)), ("o2", dec!(4999))]);
    assert_eq!(result.filled.fiat, dec!(14999));
}

#[test]
fn scenario_c_single_split_cap() {
    let offers = two_asks();
    let intent = buy_intent(dec!(12000), 1);

    let result = allocate(&filter(&offers, &intent), &intent);

    assert!(!result.fully_executable);
    assert_eq!(result.filled.fiat, dec!(10000));
    assert_eq!(contributions(&result), vec![("o1", dec!(10000))]);
    assert_close(result.achieved_price.unwrap().inner(), dec!(95));
}

#[test]
fn scenario_d_no_payment_method_match() {
    let offers = two_asks();
    let intent =
        buy_intent(dec!(12000), 3).with_payment_methods(PaymentMethod::parse("tinkoff"));

    let filtered = filter(&offers, &intent);
    assert!(filtered.is_empty());

    let allocated = allocate(&filtered, &intent);
    assert!(!allocated.fully_executable);
    assert!(allocated.offers_used.is_empty());

    // No candidates at all: the selector reports nothing rather than a result.
    assert!(select_best(&filtered, &intent).is_none());
    let via_engine = bitpeer_pricing::evaluate(&offers, &intent, LegStrategy::Single);
    assert!(!via_engine.fully_executable);
    assert!(via_engine.offers_used.is_empty());
}

#[test]
fn scenario_e_combo_with_partial_sell_leg() {
    let buy_offers = two_asks();
    let sell_offers = vec![offer("v1", OfferSide::Buy, dec!(25500), dec!(1000000), &["momo"])];

    let buy = buy_intent(dec!(9500), 3);
    // 100 asset at 25500 needs 2.55M, the only bid takes 1M.
    let sell = TradeIntent::new(
        TradeDirection::SellAsset,
        TargetAmount::Asset(dec!(100)),
        3,
        dec!(500),
    )
    .unwrap();

    let outcome = evaluate_combo(
        &buy,
        &sell,
        &buy_offers,
        &sell_offers,
        LegStrategy::Split,
        ComboMode::Strict,
    )
    .unwrap();

    assert!(outcome.effective_rate().is_none());
    match outcome {
        ComboOutcome::Infeasible(inf) => {
            assert!(inf.buy_leg.fully_executable);
            assert!(!inf.sell_leg.fully_executable);
            assert!(matches!(inf.reason, InfeasibleReason::NotFullyExecutable(_)));
        }
        ComboOutcome::Feasible(_) => panic!("combo must not report a rate with a partial leg"),
    }
}
